//! Route gating.
//!
//! Every screen declares an [`Access`] level. [`RouteGate::check`] is
//! evaluated before a screen is entered and either allows it or names the
//! screen to redirect to. The session is passed in explicitly; the gate
//! holds no session state of its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::role::Role;
use crate::session::Session;
use crate::store::RoleResolver;

/// Screens of the navigation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    Register,
    Home,
    AdminHome,
    CreateEvent,
    ParticipantHome,
    EventDetails,
}

/// Who may enter a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Public,
    /// Only visitors without a session; signed-in users go to their home.
    GuestOnly,
    /// Any signed-in user with a known role.
    Authenticated,
    /// Signed-in users are always redirected to their role's home.
    RoleHome,
    /// Admins only.
    Admin,
    /// Participants only.
    Participant,
}

impl Screen {
    /// Screen shown for `/` and unknown paths.
    pub const DEFAULT: Screen = Screen::Login;

    /// All screens, in routing-table order.
    pub const ALL: [Screen; 7] = [
        Screen::Login,
        Screen::Register,
        Screen::Home,
        Screen::AdminHome,
        Screen::CreateEvent,
        Screen::ParticipantHome,
        Screen::EventDetails,
    ];

    /// Returns the access level required to enter this screen.
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::Login | Self::Register => Access::GuestOnly,
            Self::Home => Access::RoleHome,
            Self::AdminHome | Self::CreateEvent => Access::Admin,
            Self::ParticipantHome => Access::Participant,
            Self::EventDetails => Access::Authenticated,
        }
    }

    /// Returns the URL path of the screen.
    ///
    /// `EventDetails` is parameterized; its path is the prefix under which
    /// event IDs are appended.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::AdminHome => "/admin-home",
            Self::CreateEvent => "/create-event",
            Self::ParticipantHome => "/participant-home",
            Self::EventDetails => "/events",
        }
    }

    /// Returns the home screen for a role.
    #[must_use]
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminHome,
            Role::Participant => Self::ParticipantHome,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Enter the requested screen.
    Allow,
    /// Deny and navigate to the given screen instead.
    Redirect(Screen),
}

/// Pre-navigation predicate composed from the session and role lookup.
#[derive(Clone)]
pub struct RouteGate {
    resolver: Arc<dyn RoleResolver>,
}

impl RouteGate {
    #[must_use]
    pub fn new(resolver: Arc<dyn RoleResolver>) -> Self {
        Self { resolver }
    }

    /// Decides whether `session` may enter `screen`.
    ///
    /// Role lookup failures never allow a protected screen: they redirect to
    /// login. No retry is attempted.
    #[instrument(skip_all, fields(screen = %screen, user_id = ?session.map(Session::user_id)))]
    pub async fn check(&self, screen: Screen, session: Option<&Session>) -> GateDecision {
        self.check_access(screen.access(), session).await
    }

    /// Decides whether `session` satisfies `access`.
    ///
    /// Server actions use this directly with the access level of the screen
    /// they belong to.
    pub async fn check_access(&self, access: Access, session: Option<&Session>) -> GateDecision {
        if access == Access::Public {
            return GateDecision::Allow;
        }

        let Some(session) = session else {
            return if access == Access::GuestOnly {
                GateDecision::Allow
            } else {
                debug!("no session, redirecting to login");
                GateDecision::Redirect(Screen::Login)
            };
        };

        let role = match self.resolver.resolve_role(session.user_id()).await {
            Ok(role) => role,
            Err(e) if access == Access::GuestOnly => {
                debug!(error = %e, "role unknown, letting session through to guest screen");
                return GateDecision::Allow;
            }
            Err(e) => {
                warn!(error = %e, "role lookup failed, redirecting to login");
                return GateDecision::Redirect(Screen::Login);
            }
        };

        let decision = Self::decide(access, role);
        if let GateDecision::Redirect(target) = decision {
            debug!(%role, %target, "role does not match screen");
        }
        decision
    }

    fn decide(access: Access, role: Role) -> GateDecision {
        let home = Screen::home_for(role);
        match (access, role) {
            (Access::Public | Access::Authenticated, _) => GateDecision::Allow,
            (Access::Admin, Role::Admin) | (Access::Participant, Role::Participant) => {
                GateDecision::Allow
            }
            (Access::GuestOnly | Access::RoleHome | Access::Admin | Access::Participant, _) => {
                GateDecision::Redirect(home)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthorizationError;
    use async_trait::async_trait;
    use chrono::Duration;
    use eventgate_core::UserId;
    use rootcause::Report;
    use std::collections::HashMap;

    /// Resolver answering from a fixed table; unknown users fail lookup and
    /// `"owner"` simulates an unrecognized stored role.
    struct FixedResolver(HashMap<String, Result<Role, String>>);

    #[async_trait]
    impl RoleResolver for FixedResolver {
        async fn resolve_role(
            &self,
            user_id: &UserId,
        ) -> Result<Role, Report<AuthorizationError>> {
            match self.0.get(user_id.as_str()) {
                Some(Ok(role)) => Ok(*role),
                Some(Err(raw)) => Err(AuthorizationError::UnrecognizedRole {
                    user_id: user_id.clone(),
                    role: raw.clone(),
                }
                .into()),
                None => Err(AuthorizationError::LookupFailed {
                    reason: "unavailable".to_string(),
                }
                .into()),
            }
        }
    }

    fn gate() -> RouteGate {
        let table = HashMap::from([
            ("admin".to_string(), Ok(Role::Admin)),
            ("participant".to_string(), Ok(Role::Participant)),
            ("weird".to_string(), Err("owner".to_string())),
        ]);
        RouteGate::new(Arc::new(FixedResolver(table)))
    }

    fn session(user: &str) -> Session {
        Session::new(UserId::new(user), format!("{user}@example.com"), Duration::hours(1))
    }

    #[tokio::test]
    async fn admin_allowed_on_admin_screens() {
        let gate = gate();
        let admin = session("admin");
        for screen in [Screen::AdminHome, Screen::CreateEvent, Screen::EventDetails] {
            assert_eq!(gate.check(screen, Some(&admin)).await, GateDecision::Allow);
        }
    }

    #[tokio::test]
    async fn admin_denied_participant_screen() {
        let gate = gate();
        let decision = gate
            .check(Screen::ParticipantHome, Some(&session("admin")))
            .await;
        assert_eq!(decision, GateDecision::Redirect(Screen::AdminHome));
    }

    #[tokio::test]
    async fn participant_denied_admin_screens() {
        let gate = gate();
        let participant = session("participant");
        for screen in [Screen::AdminHome, Screen::CreateEvent] {
            assert_eq!(
                gate.check(screen, Some(&participant)).await,
                GateDecision::Redirect(Screen::ParticipantHome)
            );
        }
        assert_eq!(
            gate.check(Screen::ParticipantHome, Some(&participant)).await,
            GateDecision::Allow
        );
    }

    #[tokio::test]
    async fn no_session_redirects_every_protected_screen_to_login() {
        let gate = gate();
        for screen in Screen::ALL {
            let decision = gate.check(screen, None).await;
            if screen.access() == Access::GuestOnly {
                assert_eq!(decision, GateDecision::Allow, "{screen}");
            } else {
                assert_eq!(decision, GateDecision::Redirect(Screen::Login), "{screen}");
            }
        }
    }

    #[tokio::test]
    async fn lookup_failure_redirects_to_login() {
        let gate = gate();
        let unknown = session("nobody");
        assert_eq!(
            gate.check(Screen::AdminHome, Some(&unknown)).await,
            GateDecision::Redirect(Screen::Login)
        );
        assert_eq!(
            gate.check(Screen::EventDetails, Some(&unknown)).await,
            GateDecision::Redirect(Screen::Login)
        );
    }

    #[tokio::test]
    async fn unrecognized_role_redirects_to_login() {
        let gate = gate();
        assert_eq!(
            gate.check(Screen::ParticipantHome, Some(&session("weird"))).await,
            GateDecision::Redirect(Screen::Login)
        );
    }

    #[tokio::test]
    async fn signed_in_users_skip_guest_screens() {
        let gate = gate();
        assert_eq!(
            gate.check(Screen::Login, Some(&session("admin"))).await,
            GateDecision::Redirect(Screen::AdminHome)
        );
        assert_eq!(
            gate.check(Screen::Register, Some(&session("participant"))).await,
            GateDecision::Redirect(Screen::ParticipantHome)
        );
        // A session whose role cannot be resolved can still reach login.
        assert_eq!(
            gate.check(Screen::Login, Some(&session("nobody"))).await,
            GateDecision::Allow
        );
    }

    #[tokio::test]
    async fn home_redirects_by_role() {
        let gate = gate();
        assert_eq!(
            gate.check(Screen::Home, Some(&session("admin"))).await,
            GateDecision::Redirect(Screen::AdminHome)
        );
        assert_eq!(
            gate.check(Screen::Home, Some(&session("participant"))).await,
            GateDecision::Redirect(Screen::ParticipantHome)
        );
    }

    #[tokio::test]
    async fn access_levels_apply_without_a_screen() {
        let gate = gate();
        assert_eq!(
            gate.check_access(Access::Participant, Some(&session("participant")))
                .await,
            GateDecision::Allow
        );
        assert_eq!(
            gate.check_access(Access::Admin, Some(&session("participant")))
                .await,
            GateDecision::Redirect(Screen::ParticipantHome)
        );
        assert_eq!(
            gate.check_access(Access::Public, None).await,
            GateDecision::Allow
        );
    }
}

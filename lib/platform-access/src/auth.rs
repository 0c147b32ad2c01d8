//! Registration, sign-in and sign-out.
//!
//! [`AuthService`] pairs the identity provider with the profile store:
//! registering creates the provider account and then the `users/{id}`
//! profile carrying the chosen role. When a [`SessionObserver`] is attached,
//! every sign-in and sign-out is published to it.

use eventgate_core::UserId;
use rootcause::Report;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::error::{AuthenticationError, ProfileError};
use crate::observer::SessionObserver;
use crate::role::Role;
use crate::session::Session;
use crate::store::{IdentityProvider, ProfileStore};
use crate::user::UserProfile;

const MIN_PASSWORD_LEN: usize = 6;
const MIN_DISPLAY_NAME_LEN: usize = 2;

/// A signed-in user together with their profile.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    session: Session,
    profile: UserProfile,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(session: Session, profile: UserProfile) -> Self {
        Self { session, profile }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        self.session.user_id()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

/// Input of the registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: Option<String>,
}

impl Registration {
    /// Checks the form before contacting the identity provider.
    pub fn validate(&self) -> Result<(), AuthenticationError> {
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AuthenticationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthenticationError::WeakPassword);
        }
        if let Some(name) = &self.display_name {
            validate_display_name(name).map_err(|reason| AuthenticationError::InvalidInput {
                field: "display_name",
                reason,
            })?;
        }
        Ok(())
    }
}

fn validate_display_name(name: &str) -> Result<(), String> {
    if name.trim().chars().count() < MIN_DISPLAY_NAME_LEN {
        return Err(format!(
            "Name must be at least {MIN_DISPLAY_NAME_LEN} characters"
        ));
    }
    Ok(())
}

/// Account and profile operations.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    observer: Option<Arc<SessionObserver>>,
}

impl AuthService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            identity,
            profiles,
            observer: None,
        }
    }

    /// Publishes sign-ins and sign-outs to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Creates an account and its profile.
    ///
    /// Returns the new session and profile. The session is not published
    /// to the observer: a fresh account signs in explicitly.
    #[instrument(skip_all, fields(email = %registration.email, role = %registration.role))]
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<(Session, UserProfile), Report<AuthenticationError>> {
        registration.validate()?;

        let email = registration.email.trim();
        let session = self.identity.sign_up(email, &registration.password).await?;
        info!(
            provider = self.identity.name(),
            user_id = %session.user_id(),
            "provider account created"
        );

        let mut profile = UserProfile::new(
            session.user_id().clone(),
            email.to_string(),
            registration.role,
        );
        profile.set_display_name(
            registration
                .display_name
                .as_deref()
                .map(str::trim)
                .map(str::to_string),
        );

        self.profiles.create_profile(&profile).await.map_err(|e| {
            error!(
                error = %e,
                provider = self.identity.name(),
                user_id = %profile.id(),
                "orphaned account: provider account exists without a profile"
            );
            AuthenticationError::ProfileUnavailable {
                reason: e.to_string(),
            }
        })?;
        info!(user_id = %profile.id(), "profile created");

        Ok((session, profile))
    }

    /// Signs in and publishes the session.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        let session = self.identity.sign_in(email.trim(), password).await?;
        info!(
            provider = self.identity.name(),
            user_id = %session.user_id(),
            "user signed in"
        );
        if let Some(observer) = &self.observer {
            observer.publish(Some(session.clone())).await;
        }
        Ok(session)
    }

    /// Signs out and clears the published session.
    #[instrument(skip_all, fields(user_id = %session.user_id()))]
    pub async fn sign_out(&self, session: &Session) -> Result<(), Report<AuthenticationError>> {
        let result = self.identity.sign_out(session).await;
        // Local state is cleared even if the provider call failed.
        if let Some(observer) = &self.observer {
            observer.publish(None).await;
        }
        result?;
        info!("user signed out");
        Ok(())
    }

    /// Loads a user's profile.
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Report<ProfileError>> {
        self.profiles
            .find_profile(user_id)
            .await
            .map_err(|e| ProfileError::Store {
                details: e.to_string(),
            })?
            .ok_or_else(|| {
                ProfileError::NotFound {
                    user_id: user_id.clone(),
                }
                .into()
            })
    }

    /// Returns true if the user's profile has the admin role.
    ///
    /// A missing profile counts as not admin.
    pub async fn is_admin(&self, user_id: &UserId) -> Result<bool, Report<ProfileError>> {
        match self.profile(user_id).await {
            Ok(profile) => Ok(profile.is_admin()),
            Err(e) if matches!(e.current_context(), ProfileError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Sets or clears the user's display name.
    #[instrument(skip(self))]
    pub async fn update_display_name(
        &self,
        user_id: &UserId,
        display_name: Option<&str>,
    ) -> Result<(), Report<ProfileError>> {
        let display_name = display_name.map(str::trim).filter(|s| !s.is_empty());
        if let Some(name) = display_name {
            validate_display_name(name)
                .map_err(|reason| ProfileError::InvalidDisplayName { reason })?;
        }

        let updated = self
            .profiles
            .update_display_name(user_id, display_name)
            .await
            .map_err(|e| ProfileError::Store {
                details: e.to_string(),
            })?;
        if !updated {
            return Err(ProfileError::NotFound {
                user_id: user_id.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::{InMemoryIdentityProvider, InMemoryProfileStore};
    use crate::observer::SessionState;
    use async_trait::async_trait;

    struct BrokenProfileStore;

    #[async_trait]
    impl ProfileStore for BrokenProfileStore {
        async fn create_profile(&self, _: &UserProfile) -> Result<(), Report<StoreError>> {
            Err(StoreError::Backend {
                details: "unavailable".to_string(),
            }
            .into())
        }

        async fn find_profile(&self, _: &UserId) -> Result<Option<UserProfile>, Report<StoreError>> {
            Ok(None)
        }

        async fn update_display_name(
            &self,
            _: &UserId,
            _: Option<&str>,
        ) -> Result<bool, Report<StoreError>> {
            Ok(false)
        }
    }

    fn registration(email: &str, role: Role) -> Registration {
        Registration {
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
            display_name: None,
        }
    }

    fn service() -> (AuthService, Arc<SessionObserver>) {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let observer = Arc::new(SessionObserver::new(profiles.clone()));
        let service = AuthService::new(Arc::new(InMemoryIdentityProvider::new()), profiles)
            .with_observer(observer.clone());
        (service, observer)
    }

    #[test]
    fn validation_rejects_bad_input() {
        let mut form = registration("alice@example.com", Role::Participant);
        assert!(form.validate().is_ok());

        form.email = "alice".to_string();
        assert_eq!(form.validate(), Err(AuthenticationError::InvalidEmail));

        form.email = "alice@example.com".to_string();
        form.password = "12345".to_string();
        assert_eq!(form.validate(), Err(AuthenticationError::WeakPassword));

        form.password = "123456".to_string();
        form.display_name = Some("A".to_string());
        assert!(matches!(
            form.validate(),
            Err(AuthenticationError::InvalidInput { field: "display_name", .. })
        ));
    }

    #[tokio::test]
    async fn register_creates_profile_with_role() {
        let (service, observer) = service();
        let mut form = registration("admin@example.com", Role::Admin);
        form.display_name = Some("  Ada  ".to_string());

        let (session, profile) = service.register(form).await.expect("register");
        assert_eq!(profile.id(), session.user_id());
        assert_eq!(profile.role(), Role::Admin);
        assert_eq!(profile.display_name(), Some("Ada"));
        assert!(service.is_admin(profile.id()).await.expect("is_admin"));
        assert_eq!(observer.current(), SessionState::Loading);
    }

    #[tokio::test]
    async fn register_twice_reports_duplicate_email() {
        let (service, _) = service();
        service
            .register(registration("p@example.com", Role::Participant))
            .await
            .expect("register");
        let err = service
            .register(registration("p@example.com", Role::Participant))
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &AuthenticationError::DuplicateEmail);
        assert_eq!(
            err.current_context().user_message(),
            "This email address is already in use"
        );
    }

    #[tokio::test]
    async fn sign_in_and_out_drive_the_observer() {
        let (service, observer) = service();
        service
            .register(registration("p@example.com", Role::Participant))
            .await
            .expect("register");

        let session = service
            .sign_in("p@example.com", "secret1")
            .await
            .expect("sign in");
        assert_eq!(observer.current().role(), Some(Role::Participant));

        service.sign_out(&session).await.expect("sign out");
        assert_eq!(observer.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (service, observer) = service();
        service
            .register(registration("p@example.com", Role::Participant))
            .await
            .expect("register");
        let err = service
            .sign_in("p@example.com", "nope123")
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &AuthenticationError::InvalidCredentials);
        assert_eq!(observer.current(), SessionState::Loading);
    }

    #[tokio::test]
    async fn display_name_updates_are_validated() {
        let (service, _) = service();
        let (_, profile) = service
            .register(registration("p@example.com", Role::Participant))
            .await
            .expect("register");

        service
            .update_display_name(profile.id(), Some("Pat"))
            .await
            .expect("update");
        assert_eq!(
            service.profile(profile.id()).await.expect("profile").display_name(),
            Some("Pat")
        );

        let err = service
            .update_display_name(profile.id(), Some("P"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProfileError::InvalidDisplayName { .. }
        ));

        let err = service
            .update_display_name(&UserId::new("ghost"), Some("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err.current_context(), ProfileError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_profile_is_not_admin() {
        let (service, _) = service();
        assert!(!service.is_admin(&UserId::new("ghost")).await.expect("is_admin"));
    }

    #[tokio::test]
    async fn failed_profile_write_leaves_account_behind() {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let service = AuthService::new(identity.clone(), Arc::new(BrokenProfileStore));

        let err = service
            .register(registration("p@example.com", Role::Participant))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            AuthenticationError::ProfileUnavailable { .. }
        ));
        assert_eq!(
            err.current_context().user_message(),
            "Registration failed, please try again"
        );

        // The provider account survives; signing in still works.
        identity
            .sign_in("p@example.com", "secret1")
            .await
            .expect("provider account");
    }
}

//! Process-scoped session state.
//!
//! [`SessionObserver`] republishes the identity provider's current session
//! together with the user's role as a single `watch` value, so consumers
//! never see a session paired with another user's role.
//!
//! Lifecycle: create one observer at startup (state `Loading`), publish the
//! restored session or `None` once known, publish every sign-in, and publish
//! `None` on sign-out.

use eventgate_core::UserId;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::role::Role;
use crate::session::Session;
use crate::store::RoleResolver;

/// Snapshot of the current session and role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session state has been published yet.
    Loading,
    /// No user is signed in.
    SignedOut,
    /// A user is signed in. `role` is `None` if it could not be resolved.
    SignedIn { session: Session, role: Option<Role> },
}

impl SessionState {
    /// Returns true once a session (or its absence) has been published.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn { session, .. } => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::SignedIn { role, .. } => *role,
            _ => None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.session().map(Session::user_id)
    }
}

/// Holder of the current session and role, observable through `watch`.
pub struct SessionObserver {
    tx: watch::Sender<SessionState>,
    resolver: Arc<dyn RoleResolver>,
    // Serializes publishes so a slow role lookup cannot overwrite a later
    // sign-out.
    publish_lock: Mutex<()>,
}

impl SessionObserver {
    /// Creates an observer in the `Loading` state.
    #[must_use]
    pub fn new(resolver: Arc<dyn RoleResolver>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Loading);
        Self {
            tx,
            resolver,
            publish_lock: Mutex::new(()),
        }
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Publishes a session change.
    ///
    /// For a session, resolves its role first and publishes both in one
    /// update. For `None`, clears session and role together.
    #[instrument(skip_all, fields(user_id = ?session.as_ref().map(Session::user_id)))]
    pub async fn publish(&self, session: Option<Session>) {
        let _guard = self.publish_lock.lock().await;

        let next = match session {
            Some(session) => {
                let role = match self.resolver.resolve_role(session.user_id()).await {
                    Ok(role) => Some(role),
                    Err(e) => {
                        warn!(error = %e, "failed to resolve role for new session");
                        None
                    }
                };
                SessionState::SignedIn { session, role }
            }
            None => SessionState::SignedOut,
        };

        debug!(settled = next.is_settled(), role = ?next.role(), "session state updated");
        self.tx.send_replace(next);
    }

    /// Waits until the first session state is published and returns the
    /// session, if any.
    pub async fn settled(&self) -> Option<Session> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(SessionState::is_settled).await {
            Ok(state) => state.session().cloned(),
            Err(_) => None,
        }
    }

    /// Spawns a task publishing every session change received on `changes`.
    ///
    /// The task ends when the sending side is dropped.
    pub fn follow(self: &Arc<Self>, mut changes: mpsc::Receiver<Option<Session>>) -> JoinHandle<()> {
        let observer = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                observer.publish(change).await;
            }
            debug!("session change channel closed");
        })
    }
}

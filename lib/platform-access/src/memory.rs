//! In-memory identity provider and stores.
//!
//! Used for local development without external services and as test
//! doubles. State lives behind tokio locks and is lost on drop.

use async_trait::async_trait;
use chrono::Duration;
use eventgate_core::UserId;
use rootcause::Report;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{AuthenticationError, AuthorizationError, StoreError};
use crate::role::Role;
use crate::session::{Session, SessionId};
use crate::store::{IdentityProvider, ProfileStore, RoleResolver, SessionStore};
use crate::user::UserProfile;

/// Minimum password length accepted by the in-memory provider.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
    disabled: bool,
}

/// Identity provider holding accounts in memory.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    token_lifetime: Duration,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            token_lifetime: Duration::hours(1),
        }
    }

    /// Disables an account; later sign-ins fail with `AccountDisabled`.
    pub async fn disable(&self, email: &str) -> bool {
        match self.accounts.write().await.get_mut(email) {
            Some(account) => {
                account.disabled = true;
                true
            }
            None => false,
        }
    }

    fn issue(&self, account: &Account, email: &str) -> Session {
        Session::new(account.user_id.clone(), email.to_string(), self.token_lifetime)
            .with_tokens(ulid::Ulid::new().to_string(), None)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(AuthenticationError::InvalidCredentials)?;
        if account.disabled {
            return Err(AuthenticationError::AccountDisabled.into());
        }
        Ok(self.issue(account, email))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        if !email.contains('@') {
            return Err(AuthenticationError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthenticationError::WeakPassword.into());
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(AuthenticationError::DuplicateEmail.into());
        }
        let account = Account {
            user_id: UserId::new(ulid::Ulid::new().to_string()),
            password: password.to_string(),
            disabled: false,
        };
        let session = self.issue(&account, email);
        accounts.insert(email.to_string(), account);
        Ok(session)
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), Report<AuthenticationError>> {
        Ok(())
    }
}

/// Profile store holding profiles in memory.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), Report<StoreError>> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(profile.id()) {
            return Err(StoreError::Conflict {
                key: format!("users/{}", profile.id()),
            }
            .into());
        }
        profiles.insert(profile.id().clone(), profile.clone());
        Ok(())
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, Report<StoreError>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: Option<&str>,
    ) -> Result<bool, Report<StoreError>> {
        match self.profiles.write().await.get_mut(id) {
            Some(profile) => {
                profile.set_display_name(display_name.map(str::to_string));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RoleResolver for InMemoryProfileStore {
    async fn resolve_role(&self, user_id: &UserId) -> Result<Role, Report<AuthorizationError>> {
        self.profiles
            .read()
            .await
            .get(user_id)
            .map(UserProfile::role)
            .ok_or_else(|| {
                AuthorizationError::ProfileNotFound {
                    user_id: user_id.clone(),
                }
                .into()
            })
    }
}

/// Session store holding sessions in memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<(), Report<StoreError>> {
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, Report<StoreError>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), Report<StoreError>> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, Report<StoreError>> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

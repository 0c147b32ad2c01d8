//! Database repositories for user profiles and sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventgate_core::UserId;
use eventgate_platform_access::{
    AuthorizationError, ProfileStore, Role, RoleResolver, Session, SessionId, SessionStore,
    StoreError, UserProfile,
};
use rootcause::Report;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Maps a driver error, turning unique violations into conflicts on `key`.
fn store_error(e: sqlx::Error, key: impl FnOnce() -> String) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict { key: key() },
        _ => StoreError::Backend {
            details: e.to_string(),
        },
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend {
        details: e.to_string(),
    }
}

/// Row type for profile queries.
#[derive(FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    role: String,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<UserProfile, StoreError> {
        let role = Role::from_str(&self.role).map_err(|e| StoreError::Corrupt {
            key: format!("users/{}", self.id),
            reason: e.to_string(),
        })?;
        Ok(UserProfile::with_all_fields(
            UserId::new(self.id),
            self.email,
            role,
            self.display_name,
            self.created_at,
        ))
    }
}

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    email: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    id_token: Option<String>,
    refresh_token: Option<String>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session::with_all_fields(
            SessionId::new(row.id),
            UserId::new(row.user_id),
            row.email,
            row.created_at,
            row.expires_at,
            row.id_token,
            row.refresh_token,
        )
    }
}

/// Repository for user profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), Report<StoreError>> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, role, display_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(profile.id().as_str())
        .bind(profile.email())
        .bind(profile.role().as_str())
        .bind(profile.display_name())
        .bind(profile.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, || format!("users/{}", profile.id())))?;

        Ok(())
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, Report<StoreError>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, role, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(r) => Ok(Some(r.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: Option<&str>,
    ) -> Result<bool, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(display_name)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RoleResolver for ProfileRepository {
    async fn resolve_role(&self, user_id: &UserId) -> Result<Role, Report<AuthorizationError>> {
        let role: Option<String> = sqlx::query_scalar(
            r#"
            SELECT role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthorizationError::LookupFailed {
            reason: e.to_string(),
        })?;

        let role = role.ok_or_else(|| AuthorizationError::ProfileNotFound {
            user_id: user_id.clone(),
        })?;
        Role::from_str(&role).map_err(|_| {
            AuthorizationError::UnrecognizedRole {
                user_id: user_id.clone(),
                role,
            }
            .into()
        })
    }
}

/// Repository for session operations.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create_session(&self, session: &Session) -> Result<(), Report<StoreError>> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, email, created_at, expires_at, id_token, refresh_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.user_id().as_str())
        .bind(session.email())
        .bind(session.created_at())
        .bind(session.expires_at())
        .bind(session.id_token())
        .bind(session.refresh_token())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, || format!("sessions/{}", session.id())))?;

        Ok(())
    }

    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, Report<StoreError>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, email, created_at, expires_at, id_token, refresh_token
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Session::from))
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), Report<StoreError>> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }
}

//! Firebase Authentication identity provider.
//!
//! Talks to the Identity Toolkit REST API (`accounts:signInWithPassword`,
//! `accounts:signUp`). Firebase ID tokens are stateless, so signing out only
//! discards the session locally.

use async_trait::async_trait;
use chrono::Duration;
use eventgate_core::UserId;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::AuthenticationError;
use crate::session::Session;
use crate::store::IdentityProvider;

const PROVIDER_NAME: &str = "firebase";

/// Fallback token lifetime when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Configuration for the Firebase identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// The Web API key of the Firebase project.
    api_key: String,
    /// Base URL of the Identity Toolkit API.
    /// Default: "https://identitytoolkit.googleapis.com/v1"
    #[serde(default = "default_base_url")]
    base_url: String,
}

fn default_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

impl FirebaseConfig {
    /// Creates a configuration for the public Identity Toolkit endpoint.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: default_base_url(),
        }
    }

    /// Overrides the API base URL (for the auth emulator).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL of an `accounts:<method>` endpoint.
    #[must_use]
    pub fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url.trim_end_matches('/'),
            method,
            self.api_key
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let lifetime = self
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Session::new(
            UserId::new(self.local_id),
            self.email,
            Duration::seconds(lifetime),
        )
        .with_tokens(self.id_token, self.refresh_token)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps an Identity Toolkit error message to an authentication error.
///
/// Messages look like `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
#[must_use]
pub fn map_error_code(message: &str) -> AuthenticationError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthenticationError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthenticationError::DuplicateEmail,
        "WEAK_PASSWORD" => AuthenticationError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthenticationError::InvalidEmail,
        "USER_DISABLED" => AuthenticationError::AccountDisabled,
        other => AuthenticationError::ProviderError {
            provider: PROVIDER_NAME.to_string(),
            reason: other.to_string(),
        },
    }
}

fn transport_error(e: &reqwest::Error) -> AuthenticationError {
    AuthenticationError::ProviderError {
        provider: PROVIDER_NAME.to_string(),
        reason: e.to_string(),
    }
}

/// Identity provider backed by Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    config: FirebaseConfig,
}

impl FirebaseIdentityProvider {
    /// Creates a provider with a fresh HTTP client.
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        let response = self
            .http
            .post(self.config.endpoint(method))
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let envelope: ErrorEnvelope = response.json().await.map_err(|e| transport_error(&e))?;
            let err = map_error_code(&envelope.error.message);
            debug!(%status, code = %envelope.error.message, "identity provider rejected request");
            return Err(err.into());
        }

        let body: TokenResponse = response.json().await.map_err(|e| transport_error(&e))?;
        Ok(body.into_session())
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        let session = self
            .password_call("signInWithPassword", email, password)
            .await?;
        debug!(user_id = %session.user_id(), "signed in");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>> {
        let session = self.password_call("signUp", email, password).await?;
        debug!(user_id = %session.user_id(), "account created");
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), Report<AuthenticationError>> {
        if session.is_expired() {
            warn!(user_id = %session.user_id(), "signing out an expired session");
        }
        Ok(())
    }
}

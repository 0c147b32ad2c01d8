//! Error types for the platform-access crate.
//!
//! Errors are wrapped in rootcause reports at the crate boundary:
//! - `AuthenticationError`: identity provider failures (sign-in, sign-up)
//! - `AuthorizationError`: role lookup failures
//! - `ProfileError`: profile reads and updates
//! - `StoreError`: profile and session store failures

use eventgate_core::UserId;
use std::fmt;

/// Errors from authentication operations.
///
/// These errors represent failures reported by the identity provider.
/// Each variant carries a fixed human-readable message suitable for
/// showing to the user, see [`AuthenticationError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// The email address is already registered.
    DuplicateEmail,
    /// The password does not meet the provider's strength rules.
    WeakPassword,
    /// The email address is malformed.
    InvalidEmail,
    /// The account has been disabled by an administrator.
    AccountDisabled,
    /// Registration input failed local validation.
    InvalidInput { field: &'static str, reason: String },
    /// Any other failure reported by the provider.
    ProviderError { provider: String, reason: String },
    /// The account was created but its profile could not be stored.
    ProfileUnavailable { reason: String },
}

impl AuthenticationError {
    /// Returns the fixed message shown to the user for this error.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidCredentials => "Incorrect email or password",
            Self::DuplicateEmail => "This email address is already in use",
            Self::WeakPassword => "Password must be at least 6 characters",
            Self::InvalidEmail => "Invalid email address",
            Self::AccountDisabled => "This account has been disabled",
            Self::InvalidInput { reason, .. } => reason,
            Self::ProviderError { .. } => "Authentication failed, please try again",
            Self::ProfileUnavailable { .. } => "Registration failed, please try again",
        }
    }
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::DuplicateEmail => write!(f, "email address already registered"),
            Self::WeakPassword => write!(f, "password too weak"),
            Self::InvalidEmail => write!(f, "invalid email address"),
            Self::AccountDisabled => write!(f, "account disabled"),
            Self::InvalidInput { field, reason } => {
                write!(f, "invalid {field}: {reason}")
            }
            Self::ProviderError { provider, reason } => {
                write!(f, "identity provider '{provider}' error: {reason}")
            }
            Self::ProfileUnavailable { reason } => {
                write!(f, "profile could not be stored: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The user has no profile document.
    ProfileNotFound { user_id: UserId },
    /// The stored role is not one of the known roles.
    UnrecognizedRole { user_id: UserId, role: String },
    /// Role lookup failed due to a store error.
    LookupFailed { reason: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileNotFound { user_id } => {
                write!(f, "no profile found for user {user_id}")
            }
            Self::UnrecognizedRole { user_id, role } => {
                write!(f, "user {user_id} has unrecognized role '{role}'")
            }
            Self::LookupFailed { reason } => {
                write!(f, "role lookup failed: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from profile operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No profile exists for the user.
    NotFound { user_id: UserId },
    /// The display name failed validation.
    InvalidDisplayName { reason: String },
    /// The profile store failed.
    Store { details: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { user_id } => write!(f, "no profile found for user {user_id}"),
            Self::InvalidDisplayName { reason } => write!(f, "invalid display name: {reason}"),
            Self::Store { details } => write!(f, "profile store error: {details}"),
        }
    }
}

impl std::error::Error for ProfileError {}

/// Errors from the profile and session stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same key already exists.
    Conflict { key: String },
    /// A stored record could not be decoded.
    Corrupt { key: String, reason: String },
    /// The backing store failed.
    Backend { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { key } => write!(f, "record '{key}' already exists"),
            Self::Corrupt { key, reason } => {
                write!(f, "record '{key}' is corrupt: {reason}")
            }
            Self::Backend { details } => write!(f, "store error: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_errors_have_fixed_user_messages() {
        assert_eq!(
            AuthenticationError::InvalidCredentials.user_message(),
            "Incorrect email or password"
        );
        assert_eq!(
            AuthenticationError::DuplicateEmail.user_message(),
            "This email address is already in use"
        );
        assert_eq!(
            AuthenticationError::AccountDisabled.user_message(),
            "This account has been disabled"
        );
    }

    #[test]
    fn provider_error_hides_details_from_user() {
        let err = AuthenticationError::ProviderError {
            provider: "firebase".to_string(),
            reason: "QUOTA_EXCEEDED".to_string(),
        };
        assert!(err.to_string().contains("QUOTA_EXCEEDED"));
        assert!(!err.user_message().contains("QUOTA_EXCEEDED"));
    }

    #[test]
    fn authorization_error_unrecognized_role_display() {
        let err = AuthorizationError::UnrecognizedRole {
            user_id: UserId::new("u1"),
            role: "owner".to_string(),
        };
        assert!(err.to_string().contains("u1"));
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Backend {
            details: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("connection reset"));
    }
}

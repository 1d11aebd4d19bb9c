//! Error types for identity operations
//!
//! This module defines all error types that can occur during login,
//! registration, refresh, impersonation, and the guard/context layers
//! built on top of them.

use thiserror::Error;

/// Identity operation error types.
///
/// Errors are `Clone` so a single in-flight result (e.g. a coalesced
/// refresh) can be handed to every caller that awaited it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Request payload was rejected by validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Email/password pair was not accepted
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration attempted with an email that already has an account
    #[error("Email is already registered")]
    EmailAlreadyRegistered,

    /// Access token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Refresh token was rejected; the session cannot be extended
    #[error("Refresh token is invalid")]
    RefreshTokenInvalid,

    /// Bearer token was rejected by the backend
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated principal lacks permission for the operation
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// Impersonation window ended; the admin session has been restored
    #[error("Impersonation session has expired")]
    ImpersonationExpired,

    /// Transport-level failure reaching the identity backend
    #[error("Network error: {0}")]
    Network(String),

    /// Backend response violated the wire contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client-side configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for identity operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check whether this error means the current credentials are no longer
    /// usable and a fresh login is required.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::RefreshTokenInvalid
                | AuthError::Unauthorized
                | AuthError::ImpersonationExpired
        )
    }

    /// Check whether this error is a transient transport failure rather
    /// than a definitive backend verdict.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }

    /// Check whether this error is safe to display to the end user
    /// verbatim.
    ///
    /// Credential and registration failures are expected and shown inline;
    /// everything else gets a generic message at the surface layer.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::EmailAlreadyRegistered
                | AuthError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_reauth() {
        assert!(AuthError::Unauthorized.requires_reauth());
        assert!(AuthError::RefreshTokenInvalid.requires_reauth());
        assert!(AuthError::ImpersonationExpired.requires_reauth());
        assert!(!AuthError::InvalidCredentials.requires_reauth());
        assert!(!AuthError::Network("timeout".to_string()).requires_reauth());
    }

    #[test]
    fn test_transient_classification() {
        assert!(AuthError::Network("connection refused".to_string()).is_transient());
        assert!(!AuthError::Unauthorized.is_transient());
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(AuthError::InvalidCredentials.is_user_facing());
        assert!(AuthError::EmailAlreadyRegistered.is_user_facing());
        assert!(!AuthError::RefreshTokenInvalid.is_user_facing());
        assert!(!AuthError::InvalidResponse("bad json".to_string()).is_user_facing());
    }
}

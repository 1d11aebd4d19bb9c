//! Session and identity types
//!
//! This module defines the token bundles for the two identity classes
//! (ordinary user, administrator) and the impersonation state an
//! administrator holds while operating as a user.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime applied to admin sessions client-side.
///
/// The `/admin/login` response carries no TTL; the backend issues admin
/// tokens with a documented 24-hour lifetime, and any 401 clears the
/// session regardless of this value.
pub const ADMIN_SESSION_TTL_HOURS: i64 = 24;

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary tenant user
    User,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Convert the role to its string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The identity of an authenticated user.
///
/// Immutable once issued: a refresh replaces the whole value rather than
/// patching individual fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// User ID
    pub id: Uuid,

    /// User email
    pub email: String,

    /// Display name, when the user has set one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Principal role
    pub role: Role,
}

impl Identity {
    /// Create a new user-role identity.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: None,
            role: Role::User,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// The active session for an ordinary user.
///
/// Owned exclusively by the credential store; mutated only by the auth
/// client (login/refresh/logout) and the impersonation broker (start/exit).
///
/// # Invariant
///
/// `expires_at` derives from the backend-declared TTL at the moment of
/// issuance. It is never extended client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for authenticated API calls
    pub access_token: String,

    /// Token redeemable for a new session.
    ///
    /// `None` for impersonated sessions, which are scoped and cannot be
    /// extended.
    pub refresh_token: Option<String>,

    /// Absolute expiry of the access token
    pub expires_at: DateTime<Utc>,

    /// The user this session belongs to
    pub user: Identity,
}

impl Session {
    /// Create a new session.
    ///
    /// # Arguments
    ///
    /// * `access_token` - Bearer token issued by the backend
    /// * `refresh_token` - Refresh token issued alongside it
    /// * `expires_at` - Backend-declared absolute expiry
    /// * `user` - The authenticated user
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        user: Identity,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
            expires_at,
            user,
        }
    }

    /// Create a session without a refresh token (impersonation).
    pub fn without_refresh(
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        user: Identity,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
            user,
        }
    }

    /// Check whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check whether the session expires within `leeway` of `now`.
    ///
    /// Used to refresh slightly ahead of the hard expiry so in-flight
    /// requests don't race the deadline.
    pub fn expires_within(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        now + leeway >= self.expires_at
    }

    /// Remaining lifetime in whole seconds, clamped at zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// The identity of an authenticated administrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminIdentity {
    /// Admin ID
    pub id: Uuid,

    /// Admin email
    pub email: String,

    /// Previous successful login, as reported by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// The active session for an administrator.
///
/// Structurally parallel to [`Session`] but stored under a distinct
/// namespace and never exchanged for a refresh token: admin sessions are
/// short-lived and require a full re-login on expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminSession {
    /// Bearer token for admin API calls
    pub access_token: String,

    /// Absolute expiry ([`ADMIN_SESSION_TTL_HOURS`] after login)
    pub expires_at: DateTime<Utc>,

    /// The administrator this session belongs to
    pub admin: AdminIdentity,
}

impl AdminSession {
    /// Create a new admin session expiring [`ADMIN_SESSION_TTL_HOURS`]
    /// after `now`.
    pub fn new(access_token: impl Into<String>, admin: AdminIdentity, now: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: now + Duration::hours(ADMIN_SESSION_TTL_HOURS),
            admin,
        }
    }

    /// Check whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Record of an in-progress impersonation.
///
/// Created only when the backend issues an impersonation session; destroyed
/// on exit or expiry detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpersonationRecord {
    /// The user being impersonated
    pub target_user_id: Uuid,

    /// Email of the user being impersonated, for audit display
    pub target_user_email: String,

    /// Backend-issued impersonation session ID
    pub impersonation_session_id: Uuid,

    /// When the impersonation session ends
    pub expires_at: DateTime<Utc>,
}

impl ImpersonationRecord {
    /// Check whether the impersonation window has ended at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// The full persisted impersonation state.
///
/// The record and the original admin token are one value: either both exist
/// or neither does, so a crash between writes cannot strand half the pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpersonationState {
    /// The active impersonation record
    pub record: ImpersonationRecord,

    /// The admin's own token, restored verbatim on exit
    pub original_admin_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity() -> Identity {
        Identity::new(Uuid::now_v7(), "user@example.com").with_display_name("Test User")
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session::new("access", "refresh", now + Duration::hours(1), test_identity());

        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(1)));
        assert!(session.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn test_session_expires_within_leeway() {
        let now = Utc::now();
        let session = Session::new("access", "refresh", now + Duration::seconds(30), test_identity());

        assert!(!session.expires_within(now, Duration::seconds(10)));
        assert!(session.expires_within(now, Duration::seconds(30)));
        assert!(session.expires_within(now, Duration::minutes(5)));
    }

    #[test]
    fn test_session_remaining_secs_clamps_at_zero() {
        let now = Utc::now();
        let session = Session::new("access", "refresh", now - Duration::seconds(5), test_identity());

        assert_eq!(session.remaining_secs(now), 0);
    }

    #[test]
    fn test_admin_session_ttl() {
        let now = Utc::now();
        let admin = AdminIdentity {
            id: Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            last_login: None,
        };
        let session = AdminSession::new("admin-token", admin, now);

        assert_eq!(session.expires_at, now + Duration::hours(ADMIN_SESSION_TTL_HOURS));
        assert!(!session.is_expired(now + Duration::hours(23)));
        assert!(session.is_expired(now + Duration::hours(24)));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_identity_roundtrip() {
        let identity = test_identity();
        let json = serde_json::to_string(&identity).unwrap();
        let parsed: Identity = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, identity);
    }

    #[test]
    fn test_impersonation_record_expiry_is_strict() {
        let now = Utc::now();
        let record = ImpersonationRecord {
            target_user_id: Uuid::now_v7(),
            target_user_email: "target@example.com".to_string(),
            impersonation_session_id: Uuid::now_v7(),
            expires_at: now,
        };

        // Expiry triggers strictly after the deadline, matching the
        // `now > expires_at` contract for forced exit.
        assert!(!record.is_expired(now));
        assert!(record.is_expired(now + Duration::seconds(1)));
    }
}

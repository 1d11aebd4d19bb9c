//! Wire payloads for the identity backend endpoints.
//!
//! Shapes mirror the backend's JSON contract exactly; conversion into the
//! domain model (`vantage-identity`) happens at the edges of the clients,
//! never inside these types' serde definitions.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vantage_identity::{AdminIdentity, Identity, Role};

/// `POST /auth/register` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Account email
    pub email: String,
    /// Account password (backend enforces minimum length 8)
    pub password: String,
    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// `POST /auth/login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// `POST /auth/refresh` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token being redeemed
    pub refresh_token: String,
}

/// `POST /auth/password/reset` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    /// Email to send the reset link to
    pub email: String,
}

/// `POST /auth/password/update` request body.
///
/// Completes the emailed reset flow: the access token arrives in the reset
/// link, not from the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordUpdateRequest {
    /// Short-lived token from the reset link
    pub access_token: String,
    /// Replacement password
    pub new_password: String,
}

/// Token bundle returned by login/register/refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Bearer access token
    pub access_token: String,
    /// Refresh token issued alongside it
    pub refresh_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// TTL in seconds
    pub expires_in: i64,
    /// Absolute expiry as a Unix timestamp; 0 when the backend omits it
    pub expires_at: i64,
}

impl SessionPayload {
    /// Absolute expiry of this token bundle.
    ///
    /// Prefers the backend's absolute timestamp; falls back to
    /// `now + expires_in` when the backend sent 0. Either way the expiry
    /// is backend-declared, never invented client-side.
    pub fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.expires_at > 0 {
            Utc.timestamp_opt(self.expires_at, 0)
                .single()
                .unwrap_or(now + chrono::Duration::seconds(self.expires_in))
        } else {
            now + chrono::Duration::seconds(self.expires_in)
        }
    }

    /// Registration responses use an empty bundle to mean "email
    /// confirmation required, no session yet".
    pub fn is_pending_confirmation(&self) -> bool {
        self.access_token.is_empty() || self.expires_in == 0
    }
}

/// User object returned by login/register/me.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    /// User ID
    pub id: Uuid,
    /// User email
    pub email: String,
    /// Display name, if set
    #[serde(default)]
    pub full_name: Option<String>,
    /// Account creation time, as the backend formats it
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserPayload {
    /// Convert into the domain identity.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            display_name: self.full_name.clone(),
            role: Role::User,
        }
    }
}

/// Combined user + session response from login/register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserPayload {
    /// The authenticated user
    pub user: UserPayload,
    /// The issued token bundle
    pub session: SessionPayload,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Human-readable message
    pub message: String,
}

/// `POST /admin/login` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginPayload {
    /// Bearer token for admin API calls
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// Admin ID
    pub admin_id: Uuid,
    /// Admin email
    pub email: String,
    /// Previous successful login
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminLoginPayload {
    /// Convert into the domain admin identity.
    pub fn admin_identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.admin_id,
            email: self.email.clone(),
            last_login: self.last_login,
        }
    }
}

/// `POST /admin/users/{id}/impersonate` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpersonatePayload {
    /// Scoped access token for the user session
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// The impersonated user's ID
    pub user_id: Uuid,
    /// The impersonated user's email
    pub user_email: String,
    /// The admin's own token, echoed back for restoration
    pub admin_token: String,
    /// Backend-issued impersonation session ID
    pub session_id: Uuid,
    /// When the impersonation window ends
    pub expires_at: DateTime<Utc>,
}

/// Error body shape used by the backend (`{"detail": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    /// Backend-provided error description
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_payload_prefers_absolute_expiry() {
        let now = Utc::now();
        let payload = SessionPayload {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: (now + chrono::Duration::seconds(100)).timestamp(),
        };

        // Absolute timestamp wins over the relative TTL.
        let expiry = payload.expiry(now);
        assert!((expiry - now).num_seconds() <= 101);
    }

    #[test]
    fn test_session_payload_falls_back_to_ttl() {
        let now = Utc::now();
        let payload = SessionPayload {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: 0,
        };

        assert_eq!(payload.expiry(now), now + chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_pending_confirmation_detection() {
        let payload = SessionPayload {
            access_token: String::new(),
            refresh_token: String::new(),
            token_type: "bearer".to_string(),
            expires_in: 0,
            expires_at: 0,
        };

        assert!(payload.is_pending_confirmation());
    }

    #[test]
    fn test_user_payload_identity_conversion() {
        let id = Uuid::now_v7();
        let payload = UserPayload {
            id,
            email: "user@example.com".to_string(),
            full_name: Some("Test User".to_string()),
            created_at: None,
        };

        let identity = payload.identity();
        assert_eq!(identity.id, id);
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.display_name.as_deref(), Some("Test User"));
    }

    #[test]
    fn test_impersonate_payload_deserialization() {
        let json = serde_json::json!({
            "access_token": "scoped-token",
            "token_type": "bearer",
            "user_id": "018f4d9e-5b7a-7c3d-9e2f-1a2b3c4d5e6f",
            "user_email": "target@example.com",
            "admin_token": "admin-token",
            "session_id": "018f4d9e-5b7a-7c3d-9e2f-aaaaaaaaaaaa",
            "expires_at": "2026-08-06T12:00:00Z"
        });

        let payload: ImpersonatePayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.admin_token, "admin-token");
        assert_eq!(payload.user_email, "target@example.com");
    }
}

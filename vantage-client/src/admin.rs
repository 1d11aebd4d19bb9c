//! Administrator session manager.
//!
//! Parallel identity manager for the admin namespace. Deliberately simpler
//! than the user client: no refresh-token rotation and no silent
//! extension. Admin sessions are higher-sensitivity and short-lived, so
//! any 401/403 on an authenticated admin call clears the stored
//! credentials immediately and the caller must force a re-login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use vantage_identity::{AdminIdentity, AdminSession, AuthError, AuthResult};
use vantage_store::CredentialStore;

use crate::client::{handle_response, into_network};
use crate::config::AuthServiceConfig;
use crate::wire::{AdminLoginPayload, LoginRequest};

/// Manager for the administrator identity namespace.
pub struct AdminAuthManager {
    /// HTTP client instance.
    http: Client,

    /// Backend connection configuration.
    config: AuthServiceConfig,

    /// Credential store (admin namespace only is touched here).
    store: Arc<dyn CredentialStore>,
}

impl AdminAuthManager {
    /// Create a new admin auth manager.
    pub fn new(config: AuthServiceConfig, store: Arc<dyn CredentialStore>) -> Self {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            config,
            store,
        }
    }

    /// Authenticate an administrator.
    ///
    /// The login response carries no TTL; the session expires
    /// [`ADMIN_SESSION_TTL_HOURS`](vantage_identity::ADMIN_SESSION_TTL_HOURS)
    /// after login, and any later 401 clears it regardless.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AdminSession> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let url = self.config.url("/admin/login");
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(into_network)?;
        let payload: AdminLoginPayload = match handle_response(response).await {
            Err(AuthError::Unauthorized) => return Err(AuthError::InvalidCredentials),
            other => other?,
        };

        let session = AdminSession::new(
            payload.access_token.clone(),
            payload.admin_identity(),
            Utc::now(),
        );
        self.store.set_admin_session(session.clone());
        debug!("admin login successful");
        Ok(session)
    }

    /// Log the administrator out.
    ///
    /// Backend notification is best-effort; the stored admin session
    /// always clears.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.store.admin_session() {
            let url = self.config.url("/admin/logout");
            match self
                .http
                .post(&url)
                .bearer_auth(&session.access_token)
                .send()
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        status = response.status().as_u16(),
                        "admin logout notification rejected"
                    );
                }
                Err(error) => warn!(%error, "admin logout notification failed"),
                Ok(_) => debug!("admin logout acknowledged"),
            }
        }

        self.store.clear_admin_session();
    }

    /// Whether an unexpired admin session is stored at `now`.
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.store
            .admin_session()
            .map(|session| !session.is_expired(now))
            .unwrap_or(false)
    }

    /// The stored admin identity, if any.
    pub fn stored_admin(&self) -> Option<AdminIdentity> {
        self.store.admin_session().map(|session| session.admin)
    }
}

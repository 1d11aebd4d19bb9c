//! Impersonation broker.
//!
//! Issues and retires impersonation sessions: exchanges an admin credential
//! for a scoped user-session token while preserving the admin's own token
//! for later restoration. The rest of the application sees a normal user
//! session and transparently believes it is that user.
//!
//! State machine: `Inactive → Active → (Inactive | Expired → forced exit)`.
//! At most one impersonation exists at a time; starting a new one
//! force-exits the old one first, never silently overwriting it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use vantage_identity::{
    AuthError, AuthResult, CookieAttributes, CookieSink, EdgeCookie, Identity,
    ImpersonationRecord, ImpersonationState, Session,
};
use vantage_store::CredentialStore;

use crate::client::{handle_response, into_network};
use crate::config::AuthServiceConfig;
use crate::wire::ImpersonatePayload;

/// Where the broker currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpersonationStatus {
    /// No impersonation in progress.
    Inactive,
    /// Impersonating, within the session window.
    Active(ImpersonationRecord),
    /// Impersonating, but the window has ended; the next
    /// [`check_expiry`](ImpersonationBroker::check_expiry) forces an exit.
    Expired(ImpersonationRecord),
}

/// Broker for admin-as-user impersonation sessions.
pub struct ImpersonationBroker {
    /// HTTP client instance.
    http: Client,

    /// Backend connection configuration.
    config: AuthServiceConfig,

    /// Credential store; the broker is the only writer of the
    /// impersonation namespace.
    store: Arc<dyn CredentialStore>,

    /// Seam to the host's cookie jar for edge-cookie projection.
    cookies: Arc<dyn CookieSink>,
}

impl ImpersonationBroker {
    /// Create a new impersonation broker.
    pub fn new(
        config: AuthServiceConfig,
        store: Arc<dyn CredentialStore>,
        cookies: Arc<dyn CookieSink>,
    ) -> Self {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            config,
            store,
            cookies,
        }
    }

    /// Current broker state at `now`, derived from the store and clock.
    pub fn status(&self, now: DateTime<Utc>) -> ImpersonationStatus {
        match self.store.impersonation() {
            None => ImpersonationStatus::Inactive,
            Some(state) if state.record.is_expired(now) => {
                ImpersonationStatus::Expired(state.record)
            }
            Some(state) => ImpersonationStatus::Active(state.record),
        }
    }

    /// Start impersonating a user.
    ///
    /// Requires an unexpired admin session. Any active impersonation is
    /// force-exited first. The backend call either commits everything
    /// (the record+original-token pair as one atomic value, plus the
    /// scoped user session with its cookie projection) or, on failure,
    /// nothing.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without an admin session; `Unauthorized`/`Forbidden`
    /// from the backend additionally clear the admin credentials (admin
    /// calls never retry).
    #[instrument(skip(self), fields(target_user_id = %target_user_id))]
    pub async fn start(&self, target_user_id: Uuid) -> AuthResult<ImpersonationRecord> {
        // Never silently overwrite an active impersonation.
        if self.exit() {
            debug!("force-exited previous impersonation");
        }

        let now = Utc::now();
        let admin = self.store.admin_session().ok_or(AuthError::Unauthorized)?;
        if admin.is_expired(now) {
            self.store.clear_admin_session();
            return Err(AuthError::Unauthorized);
        }

        let url = self
            .config
            .url(&format!("/admin/users/{}/impersonate", target_user_id));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&admin.access_token)
            .send()
            .await
            .map_err(into_network)?;
        let payload: ImpersonatePayload = match handle_response(response).await {
            Err(error @ (AuthError::Unauthorized | AuthError::Forbidden)) => {
                warn!("impersonation rejected, clearing admin credentials");
                self.store.clear_admin_session();
                return Err(error);
            }
            other => other?,
        };

        // Nothing was written before this point: a failed call commits no
        // partial state.
        let record = ImpersonationRecord {
            target_user_id: payload.user_id,
            target_user_email: payload.user_email.clone(),
            impersonation_session_id: payload.session_id,
            expires_at: payload.expires_at,
        };
        let state = ImpersonationState {
            record: record.clone(),
            original_admin_token: payload.admin_token.clone(),
        };
        let user = Identity::new(payload.user_id, payload.user_email.clone());
        let session = Session::without_refresh(
            payload.access_token.clone(),
            payload.expires_at,
            user,
        );

        self.store.set_impersonation(state);
        self.store.set(session.clone());
        self.project(&session);

        debug!(
            session_id = %record.impersonation_session_id,
            "impersonation started"
        );
        Ok(record)
    }

    /// End the impersonation and restore the admin.
    ///
    /// Restores the original admin token byte-identical into the admin
    /// session, clears the impersonation state and the impersonated user
    /// session, and clears the cookie. Idempotent: returns `false` (and
    /// does nothing) when no impersonation is in progress.
    pub fn exit(&self) -> bool {
        let Some(state) = self.store.impersonation() else {
            return false;
        };

        if let Some(mut admin) = self.store.admin_session() {
            admin.access_token = state.original_admin_token.clone();
            self.store.set_admin_session(admin);
        }
        self.store.clear_impersonation();
        self.store.clear();
        self.cookies.clear();

        debug!(
            session_id = %state.record.impersonation_session_id,
            "impersonation ended"
        );
        true
    }

    /// Enforce the impersonation window on a protected navigation.
    ///
    /// When the window has ended this behaves exactly like
    /// [`exit`](Self::exit) and additionally signals the application layer
    /// with [`AuthError::ImpersonationExpired`], which surfaces as a
    /// one-time "session ended" notice rather than a hard error.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> AuthResult<()> {
        match self.store.impersonation() {
            Some(state) if state.record.is_expired(now) => {
                warn!("impersonation session expired, forcing exit");
                self.exit();
                Err(AuthError::ImpersonationExpired)
            }
            _ => Ok(()),
        }
    }

    /// Project the impersonated session into the host cookie jar.
    fn project(&self, session: &Session) {
        let attributes =
            CookieAttributes::for_session(session, Utc::now(), self.config.cookie_secure);
        self.cookies.write(&EdgeCookie::project(session), &attributes);
    }
}

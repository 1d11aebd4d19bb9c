//! User auth client.
//!
//! HTTP client for the `/auth/*` endpoints of the identity backend. Every
//! operation that mutates the session writes the credential store and
//! re-projects the edge cookie before returning, so a navigation issued
//! after the call observes consistent guard state.

use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use vantage_identity::{
    AuthError, AuthResult, CookieAttributes, CookieSink, EdgeCookie, Identity, Session,
};
use vantage_store::CredentialStore;

use crate::config::AuthServiceConfig;
use crate::retry::with_refresh_retry;
use crate::wire::{
    AuthUserPayload, ErrorPayload, LoginRequest, MessagePayload, PasswordResetRequest,
    PasswordUpdateRequest, RefreshRequest, RegisterRequest, SessionPayload, UserPayload,
};

/// Minimum password length enforced before the request leaves the client.
const MIN_PASSWORD_LEN: usize = 8;

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account was created and a session issued; it is now active.
    SignedIn(Session),
    /// The account was created but the backend requires email confirmation
    /// first. Nothing was stored.
    ConfirmationRequired(Identity),
}

/// Stateless client for the user-namespace auth endpoints.
///
/// Holds the single-flight refresh lock: concurrent refreshes coalesce
/// onto one backend call, because redeeming the same refresh token twice
/// reads as replay server-side and revokes the session.
pub struct AuthClient {
    /// HTTP client instance.
    http: Client,

    /// Backend connection configuration.
    config: AuthServiceConfig,

    /// The single mutable resource of the subsystem.
    store: Arc<dyn CredentialStore>,

    /// Seam to the host's cookie jar for edge-cookie projection.
    cookies: Arc<dyn CookieSink>,

    /// Serializes refresh calls (see [`AuthClient::refresh`]).
    refresh_lock: Mutex<()>,
}

impl AuthClient {
    /// Create a new auth client.
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
            refresh_lock: Mutex::new(()),
        }
    }

    /// Register a new account.
    ///
    /// On success with a live session the session is stored and projected.
    /// When the backend requires email confirmation it answers with an
    /// empty token bundle; that surfaces as
    /// [`RegisterOutcome::ConfirmationRequired`] and nothing is persisted.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<RegisterOutcome> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email must not be empty".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        debug!("registering new account");
        let url = self.config.url("/auth/register");
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: display_name.map(str::to_string),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(into_network)?;
        let payload: AuthUserPayload = handle_response(response).await?;

        if payload.session.is_pending_confirmation() {
            debug!("registration pending email confirmation");
            return Ok(RegisterOutcome::ConfirmationRequired(payload.user.identity()));
        }

        let session = self.session_from_payload(payload);
        self.commit_session(session.clone());
        Ok(RegisterOutcome::SignedIn(session))
    }

    /// Log in with email and password.
    ///
    /// On success the session is stored and projected into the edge cookie.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        debug!("logging in");
        let url = self.config.url("/auth/login");
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
        let payload: AuthUserPayload = match handle_response(response).await {
            // A rejected login is a credential problem, not a session one.
            Err(AuthError::Unauthorized) => return Err(AuthError::InvalidCredentials),
            other => other?,
        };

        let session = self.session_from_payload(payload);
        self.commit_session(session.clone());
        Ok(session)
    }

    /// Exchange the refresh token for a fresh session.
    ///
    /// **Single-flight.** The first caller acquires the lock and performs
    /// the network call; every caller that waited on the lock observes the
    /// rotated refresh token afterwards and returns the stored result
    /// without a second redemption. N concurrent callers produce exactly
    /// one `POST /auth/refresh`.
    ///
    /// A rejected refresh token clears the user session and the cookie:
    /// there is nothing left to retry with.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> AuthResult<Session> {
        let before = self.store.get().ok_or(AuthError::RefreshTokenInvalid)?;
        let refresh_token = before
            .refresh_token
            .clone()
            .ok_or(AuthError::RefreshTokenInvalid)?;

        let _guard = self.refresh_lock.lock().await;

        match self.store.get() {
            Some(current) => {
                // A holder ahead of us already rotated the token.
                if current.refresh_token.as_deref() != Some(refresh_token.as_str())
                    || current.expires_at > before.expires_at
                {
                    debug!("refresh coalesced with in-flight call");
                    return Ok(current);
                }
            }
            // A holder ahead of us failed terminally and cleared the
            // session; redeeming the same token again would only repeat
            // the rejection.
            None => return Err(AuthError::RefreshTokenInvalid),
        }

        debug!("refreshing session");
        let url = self.config.url("/auth/refresh");
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(into_network)?;

        let payload: SessionPayload = match handle_response(response).await {
            Err(AuthError::Unauthorized) => {
                warn!("refresh token rejected; clearing session");
                self.clear_session_and_cookie();
                return Err(AuthError::RefreshTokenInvalid);
            }
            other => other?,
        };

        let session = Session::new(
            payload.access_token.clone(),
            payload.refresh_token.clone(),
            payload.expiry(Utc::now()),
            before.user,
        );
        self.commit_session(session.clone());
        Ok(session)
    }

    /// Fetch and confirm the current identity from the backend.
    ///
    /// On `Unauthorized` this performs exactly one [`refresh`](Self::refresh)
    /// and retries once; a second rejection is terminal and clears the
    /// session. The confirmed identity replaces the stored one wholesale.
    #[instrument(skip(self))]
    pub async fn fetch_current_identity(&self) -> AuthResult<Identity> {
        let identity = with_refresh_retry(self, || self.identity_request()).await?;

        if let Some(session) = self.store.get() {
            if session.user != identity {
                self.store.set(Session {
                    user: identity.clone(),
                    ..session
                });
            }
        }
        Ok(identity)
    }

    /// One `GET /auth/me` attempt with the currently stored token.
    pub(crate) async fn identity_request(&self) -> AuthResult<Identity> {
        let session = self.store.get().ok_or(AuthError::Unauthorized)?;

        let url = self.config.url("/auth/me");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(into_network)?;
        let payload: UserPayload = handle_response(response).await?;
        Ok(payload.identity())
    }

    /// Log out.
    ///
    /// The backend notification is best-effort and a network failure is
    /// swallowed. Local state always clears: every namespace and the edge
    /// cookie are empty when this returns.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.store.get() {
            let url = self.config.url("/auth/logout");
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
                        "logout notification rejected"
                    );
                }
                Err(error) => warn!(%error, "logout notification failed"),
                Ok(_) => debug!("logout acknowledged"),
            }
        }

        self.store.clear_all();
        self.cookies.clear();
    }

    /// Request a password-reset email.
    ///
    /// Always reports success to the caller: the backend may 404 for
    /// unknown emails, but the client must not leak whether an account
    /// exists.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) {
        let url = self.config.url("/auth/password/reset");
        let request = PasswordResetRequest {
            email: email.to_string(),
        };

        match self.http.post(&url).json(&request).send().await {
            Ok(response) if !response.status().is_success() => {
                debug!(
                    status = response.status().as_u16(),
                    "password reset not acknowledged"
                );
            }
            Err(error) => debug!(%error, "password reset request failed"),
            Ok(_) => {}
        }
    }

    /// Complete the emailed reset flow with a new password.
    ///
    /// The access token comes from the reset link, not the credential
    /// store; nothing is persisted on success.
    #[instrument(skip(self, reset_access_token, new_password))]
    pub async fn update_password(
        &self,
        reset_access_token: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let url = self.config.url("/auth/password/update");
        let request = PasswordUpdateRequest {
            access_token: reset_access_token.to_string(),
            new_password: new_password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(into_network)?;
        let _: MessagePayload = handle_response(response).await?;
        Ok(())
    }

    /// Build the domain session from a login/register response.
    fn session_from_payload(&self, payload: AuthUserPayload) -> Session {
        let user = payload.user.identity();
        Session::new(
            payload.session.access_token.clone(),
            payload.session.refresh_token.clone(),
            payload.session.expiry(Utc::now()),
            user,
        )
    }

    /// Store a session and re-project the edge cookie.
    ///
    /// Order matters: both writes complete before the mutating operation
    /// returns, so a navigation issued afterwards sees fresh guard input.
    pub(crate) fn commit_session(&self, session: Session) {
        self.store.set(session.clone());
        self.project(&session);
    }

    /// Project the session into the host cookie jar.
    fn project(&self, session: &Session) {
        let attributes =
            CookieAttributes::for_session(session, Utc::now(), self.config.cookie_secure);
        self.cookies.write(&EdgeCookie::project(session), &attributes);
    }

    /// Clear the user session and its cookie projection.
    pub(crate) fn clear_session_and_cookie(&self) {
        self.store.clear();
        self.cookies.clear();
    }
}

/// Convert a transport failure into the domain error.
pub(crate) fn into_network(error: reqwest::Error) -> AuthError {
    AuthError::Network(error.to_string())
}

/// Decode a successful response or map the error status.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> AuthResult<T> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    } else {
        Err(error_from_status(status, response).await)
    }
}

/// Map an error response to the domain taxonomy.
async fn error_from_status(status: StatusCode, response: reqwest::Response) -> AuthError {
    let detail = response
        .json::<ErrorPayload>()
        .await
        .ok()
        .and_then(|body| body.detail);

    match status {
        StatusCode::BAD_REQUEST => {
            let message = detail.unwrap_or_else(|| "invalid input".to_string());
            let lowered = message.to_lowercase();
            if lowered.contains("already registered") || lowered.contains("already exists") {
                AuthError::EmailAlreadyRegistered
            } else {
                AuthError::InvalidInput(message)
            }
        }
        StatusCode::UNAUTHORIZED => AuthError::Unauthorized,
        StatusCode::FORBIDDEN => AuthError::Forbidden,
        s if s.is_server_error() => AuthError::Network(format!("server error {}", s.as_u16())),
        s => AuthError::InvalidResponse(format!("unexpected status {}", s.as_u16())),
    }
}

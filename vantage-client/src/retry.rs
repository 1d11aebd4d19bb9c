//! The 401 → refresh → retry-once policy.
//!
//! The single retry rule of the subsystem, written as an explicit
//! combinator instead of exception control flow crossing async
//! boundaries. There is no backoff and no attempt counting: one refresh,
//! one retry, then the verdict stands.

use std::future::Future;

use tracing::{debug, warn};

use vantage_identity::{AuthError, AuthResult};

use crate::client::AuthClient;

/// Execute an authenticated operation with the refresh-retry policy.
///
/// On [`AuthError::Unauthorized`] the client performs exactly one
/// `refresh()` (single-flight with any concurrent refresh) and retries the
/// operation once. A second `Unauthorized` after a successful refresh is
/// terminal: the session is cleared and the error surfaces.
///
/// Any other error, including a failed refresh, propagates unchanged.
///
/// # Arguments
///
/// * `client` - The auth client owning the session being extended
/// * `operation` - The request to run (must be repeatable)
pub async fn with_refresh_retry<T, F, Fut>(client: &AuthClient, mut operation: F) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthResult<T>>,
{
    match operation().await {
        Err(AuthError::Unauthorized) => {
            debug!("request unauthorized, attempting one refresh");
            client.refresh().await?;

            match operation().await {
                Err(AuthError::Unauthorized) => {
                    warn!("request unauthorized after refresh, clearing session");
                    client.clear_session_and_cookie();
                    Err(AuthError::Unauthorized)
                }
                other => other,
            }
        }
        other => other,
    }
}

//! # Guard Decisions
//!
//! The decision function the edge runtime calls on every request. Pure:
//! the same `(path, cookie)` pair always yields the same [`Decision`], and
//! nothing here suspends or performs I/O.

use serde::{Deserialize, Serialize};

use vantage_identity::EdgeCookie;

use crate::routes::{PathClass, APP_HOME_PATH, LOGIN_PATH};

/// Guard verdict for a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    /// Serve the page.
    Allow,
    /// Send the visitor to the login page, preserving where they were
    /// headed so login can return them there.
    RedirectToLogin {
        /// The originally requested path.
        next: String,
    },
    /// Send the authenticated user into the application.
    RedirectToApp,
}

/// Decide how to route a request.
///
/// Rules, in priority order:
/// 1. Admin-prefixed paths bypass this guard entirely: the admin surface
///    authenticates through its own layer, which can afford a backend
///    round trip.
/// 2. Unauthenticated + protected path: redirect to login with the
///    original path preserved.
/// 3. Authenticated + auth-only page (login/signup): redirect into the app.
/// 4. Authenticated + public landing page: redirect into the app.
/// 5. Otherwise: allow.
///
/// "Authenticated" means cookie *presence* only. The cookie is a
/// projection of the stored session; its contents are validated downstream
/// by the backend, never here.
///
/// # Example
///
/// ```
/// use vantage_guard::{decide, Decision};
/// use vantage_identity::EdgeCookie;
///
/// let cookie = EdgeCookie::from_value("opaque-token");
/// assert_eq!(decide("/documents", Some(&cookie)), Decision::Allow);
/// assert_eq!(decide("/login", Some(&cookie)), Decision::RedirectToApp);
/// ```
pub fn decide(path: &str, cookie: Option<&EdgeCookie>) -> Decision {
    let class = PathClass::of(path);
    let authenticated = cookie.is_some();

    match class {
        // Rule 1: delegated to the admin auth layer.
        PathClass::Admin => Decision::Allow,
        PathClass::Protected if !authenticated => Decision::RedirectToLogin {
            next: path.to_string(),
        },
        PathClass::AuthOnly | PathClass::PublicLanding if authenticated => Decision::RedirectToApp,
        _ => Decision::Allow,
    }
}

/// Render the login redirect location for a decision, carrying the
/// return target as the `next` query parameter.
///
/// Returns `None` for decisions that are not login redirects.
pub fn login_redirect_target(decision: &Decision) -> Option<String> {
    match decision {
        Decision::RedirectToLogin { next } => {
            Some(format!("{}?next={}", LOGIN_PATH, urlencode(next)))
        }
        _ => None,
    }
}

/// Location an authenticated redirect lands on.
pub fn app_redirect_target() -> &'static str {
    APP_HOME_PATH
}

/// Minimal percent-encoding for a path used as a query value.
fn urlencode(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

//! # Vantage Edge Guard
//!
//! The route guard that runs before any protected page is served. It makes
//! coarse allow/redirect decisions from the cookie-resident access token,
//! with no backend calls and no async: a pure function of
//! `(path, cookie presence)`.
//!
//! ## Overview
//!
//! - [`PathClass`]: classification of request paths (admin, auth-only,
//!   public landing, protected)
//! - [`Decision`]: the guard verdict (allow, redirect to login with the
//!   original path preserved, redirect into the app)
//! - [`decide`]: the decision function itself
//!
//! True token validation happens downstream in `vantage-client`: a
//! forged-but-present cookie passes this gate and is rejected by the
//! backend. That tradeoff buys a guard that adds zero latency to every
//! page load.
//!
//! ## Example
//!
//! ```
//! use vantage_guard::{decide, Decision};
//!
//! // No cookie, protected path: bounce to login, remember where we were.
//! let decision = decide("/documents", None);
//! assert_eq!(
//!     decision,
//!     Decision::RedirectToLogin { next: "/documents".to_string() }
//! );
//! ```

pub mod guard;
pub mod routes;

// Re-export main types
pub use guard::{app_redirect_target, decide, login_redirect_target, Decision};
pub use routes::{PathClass, ADMIN_PREFIX, APP_HOME_PATH, LOGIN_PATH};

//! # Path Classification
//!
//! Classifies request paths into the categories the guard's rules are
//! written against. Classification looks at the path only; query strings
//! and fragments are ignored.

use serde::{Deserialize, Serialize};

/// Prefix of the administrator surface.
pub const ADMIN_PREFIX: &str = "/admin";

/// The login page, used as the redirect target for unauthenticated access.
pub const LOGIN_PATH: &str = "/login";

/// Landing destination for authenticated users.
pub const APP_HOME_PATH: &str = "/dashboard";

/// Pages that only make sense for a signed-out visitor.
const AUTH_PATHS: &[&str] = &["/login", "/signup", "/password-reset"];

/// The public marketing landing page.
const PUBLIC_LANDING: &str = "/";

/// Category of a request path, from the guard's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PathClass {
    /// Administrator surface; the guard defers to the admin auth layer.
    Admin,
    /// Sign-in/sign-up/reset pages; redirected away when authenticated.
    AuthOnly,
    /// The public landing page; redirected into the app when authenticated.
    PublicLanding,
    /// Everything else requires an authenticated session.
    Protected,
}

impl PathClass {
    /// Get the string representation of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathClass::Admin => "admin",
            PathClass::AuthOnly => "auth_only",
            PathClass::PublicLanding => "public_landing",
            PathClass::Protected => "protected",
        }
    }

    /// Classify a request path.
    ///
    /// Matching is prefix-based for the admin surface and exact (modulo a
    /// trailing query string) for auth-only and landing pages.
    pub fn of(path: &str) -> Self {
        let path = strip_query(path);

        if path == ADMIN_PREFIX || path.starts_with("/admin/") {
            return PathClass::Admin;
        }
        if AUTH_PATHS.contains(&path) {
            return PathClass::AuthOnly;
        }
        if path == PUBLIC_LANDING {
            return PathClass::PublicLanding;
        }
        PathClass::Protected
    }
}

/// Drop the query string, if any.
fn strip_query(path: &str) -> &str {
    match path.split_once('?') {
        Some((before, _)) => before,
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_prefix_classification() {
        assert_eq!(PathClass::of("/admin"), PathClass::Admin);
        assert_eq!(PathClass::of("/admin/users"), PathClass::Admin);
        assert_eq!(PathClass::of("/admin/users/42/impersonate"), PathClass::Admin);

        // Prefix match must not swallow sibling paths.
        assert_eq!(PathClass::of("/administration"), PathClass::Protected);
    }

    #[test]
    fn test_auth_only_pages() {
        assert_eq!(PathClass::of("/login"), PathClass::AuthOnly);
        assert_eq!(PathClass::of("/signup"), PathClass::AuthOnly);
        assert_eq!(PathClass::of("/password-reset"), PathClass::AuthOnly);
        assert_eq!(PathClass::of("/login?next=/documents"), PathClass::AuthOnly);
    }

    #[test]
    fn test_public_landing() {
        assert_eq!(PathClass::of("/"), PathClass::PublicLanding);
        assert_eq!(PathClass::of("/?utm_source=ad"), PathClass::PublicLanding);
    }

    #[test]
    fn test_everything_else_is_protected() {
        assert_eq!(PathClass::of("/documents"), PathClass::Protected);
        assert_eq!(PathClass::of("/settings/billing"), PathClass::Protected);
        assert_eq!(PathClass::of("/loginx"), PathClass::Protected);
    }
}

//! Edge cookie projection of the active session.
//!
//! The edge route guard runs before any page is served and cannot reach the
//! backend, so it reads a single HTTP-only cookie carrying the access token.
//! That cookie is a *projection* of [`Session::access_token`], never an
//! independent source of truth: every session mutation re-projects through
//! [`EdgeCookie::project`] before the mutating operation returns, so the two
//! storage mediums cannot silently diverge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Name of the session cookie read by the edge guard.
pub const SESSION_COOKIE_NAME: &str = "vantage_session";

/// The opaque cookie-resident access token.
///
/// The guard only ever tests presence; it never inspects the value. A
/// forged-but-present value passes the gate and is rejected by the backend
/// downstream, an accepted tradeoff for a zero-round-trip guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeCookie(String);

impl EdgeCookie {
    /// Project a session into its cookie form.
    pub fn project(session: &Session) -> Self {
        Self(session.access_token.clone())
    }

    /// Construct from a raw cookie value received from the host.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token value.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Render the `Set-Cookie` header value for this cookie.
    pub fn header_value(&self, attributes: &CookieAttributes) -> String {
        format!(
            "{}={}; {}",
            SESSION_COOKIE_NAME,
            self.0,
            attributes.render()
        )
    }
}

/// Render the `Set-Cookie` header value that removes the session cookie.
pub fn clear_header_value(attributes: &CookieAttributes) -> String {
    format!(
        "{}=; Max-Age=0; Path={}; HttpOnly{}; SameSite={}",
        SESSION_COOKIE_NAME,
        attributes.path,
        if attributes.secure { "; Secure" } else { "" },
        attributes.same_site.as_str(),
    )
}

/// SameSite cookie policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on same-site requests and top-level navigations
    Lax,
    /// Sent on same-site requests only
    Strict,
    /// Sent on all requests (requires Secure)
    None,
}

impl SameSite {
    /// String form used in the Set-Cookie header.
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Attributes applied to the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Reject script access (always set)
    pub http_only: bool,

    /// Require HTTPS transport (enabled in production config)
    pub secure: bool,

    /// SameSite policy (Lax: survives top-level navigation)
    pub same_site: SameSite,

    /// Cookie lifetime in seconds, matching the session TTL
    pub max_age_secs: i64,

    /// Cookie path
    pub path: String,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            max_age_secs: 3600,
            path: "/".to_string(),
        }
    }
}

impl CookieAttributes {
    /// Build attributes for a session: max-age equals the remaining session
    /// TTL at `now`.
    ///
    /// # Arguments
    ///
    /// * `session` - The session being projected
    /// * `now` - Current time, used to compute the remaining TTL
    /// * `secure` - Whether the Secure attribute is set (production)
    pub fn for_session(session: &Session, now: DateTime<Utc>, secure: bool) -> Self {
        Self {
            secure,
            max_age_secs: session.remaining_secs(now),
            ..Default::default()
        }
    }

    fn render(&self) -> String {
        let mut parts = vec![
            format!("Max-Age={}", self.max_age_secs),
            format!("Path={}", self.path),
        ];
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
        parts.join("; ")
    }
}

/// Seam to the host environment's cookie jar.
///
/// The SDK never touches the cookie medium directly; the host (edge
/// runtime, test harness) implements this trait. Writes must complete
/// before any navigation that depends on the guard's decision, which is why
/// the interface is synchronous.
pub trait CookieSink: Send + Sync {
    /// Write the projected cookie.
    fn write(&self, cookie: &EdgeCookie, attributes: &CookieAttributes);

    /// Remove the cookie.
    fn clear(&self);

    /// Read back the current cookie, if present.
    fn current(&self) -> Option<EdgeCookie>;
}

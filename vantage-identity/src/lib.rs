//! # Vantage Identity
//!
//! Domain model for identity and session lifecycle management in the
//! Vantage platform, shared across the credential store, the auth clients,
//! and the edge route guard.
//!
//! ## Overview
//!
//! The vantage-identity crate defines:
//! - **Session**: access/refresh token bundle with expiry and the owning user
//! - **AdminSession**: the administrator-namespace equivalent (no refresh)
//! - **Impersonation**: the record + original-admin-token pair, stored as one
//!   atomic value so partial state is unrepresentable
//! - **EdgeCookie**: the one-way cookie projection of the active session that
//!   the edge guard reads
//! - **AuthError**: the error taxonomy every identity operation speaks
//!
//! ## Invariants
//!
//! - `Session::expires_at` is always derived from the backend-declared TTL at
//!   issuance and never extended client-side.
//! - `Identity` is immutable once issued; refresh replaces it wholesale.
//! - An [`ImpersonationState`] either exists in full (record and original
//!   admin token) or not at all.
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `vantage-store`: owns the persisted `Session`/`AdminSession` values
//! - `vantage-client`: mutates sessions on login/refresh/impersonation
//! - `vantage-guard`: consumes `EdgeCookie` for routing decisions

pub mod cookie;
pub mod error;
pub mod session;

// Re-export main types
pub use cookie::{
    clear_header_value, CookieAttributes, CookieSink, EdgeCookie, SameSite, SESSION_COOKIE_NAME,
};
pub use error::{AuthError, AuthResult};
pub use session::{
    AdminIdentity, AdminSession, Identity, ImpersonationRecord, ImpersonationState, Role, Session,
    ADMIN_SESSION_TTL_HOURS,
};

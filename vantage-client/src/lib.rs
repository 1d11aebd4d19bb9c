//! # Vantage Auth Client
//!
//! Stateless HTTP operations against the Vantage identity backend, plus the
//! two managers layered on them: the administrator session manager and the
//! impersonation broker.
//!
//! ## Overview
//!
//! - [`AuthClient`]: register, login, refresh, fetch-current-identity,
//!   logout, password reset/update. Owns the single-flight refresh lock.
//! - [`AdminAuthManager`]: the administrator namespace, with independent
//!   login/logout, no silent refresh, immediate credential clear on 401.
//! - [`ImpersonationBroker`]: exchanges an admin credential for a scoped
//!   user session while preserving the admin's own token for restoration.
//! - [`with_refresh_retry`]: the one retry policy in the subsystem:
//!   401, then one refresh, then one retry, then a terminal clear.
//!
//! ## Concurrency contract
//!
//! `refresh()` is single-flight: concurrent callers coalesce onto one
//! backend call, because redeeming the same refresh token twice is treated
//! as replay by the backend and revokes the session.
//!
//! Every mutating operation writes the credential store *and* re-projects
//! the edge cookie before returning, so a navigation issued after the call
//! observes consistent guard state.

pub mod admin;
pub mod client;
pub mod config;
pub mod impersonation;
pub mod retry;
pub mod wire;

// Re-export main types
pub use admin::AdminAuthManager;
pub use client::{AuthClient, RegisterOutcome};
pub use config::AuthServiceConfig;
pub use impersonation::{ImpersonationBroker, ImpersonationStatus};
pub use retry::with_refresh_retry;

//! # Vantage Session
//!
//! The top of the identity stack: an explicit service instance bundling
//! the credential store, the auth clients, and the impersonation broker,
//! plus the observer that exposes "current effective identity" to the rest
//! of the application.
//!
//! ## Overview
//!
//! - [`SessionManager`]: constructor-based lifecycle over the injected
//!   collaborators. An explicit instance rather than an ambient module
//!   singleton, so tests and multi-instance hosts (e.g. server-side
//!   concurrent requests) stay safe.
//! - [`SessionContext`]: the aggregator application UI code is allowed to
//!   depend on directly. It re-derives `{ identity, is_authenticated,
//!   is_loading }` on every credential-store change (login, refresh,
//!   impersonation start/exit, logout, remote tab signal) and publishes
//!   snapshots through a tokio `watch` channel.
//!
//! ## Boot sequence
//!
//! A page load passes the edge guard first (`vantage-guard`); if allowed,
//! the client mounts a [`SessionContext`], which reads the store and,
//! when a session exists, lazily confirms it against the backend via
//! `fetch_current_identity()` (which may itself refresh single-flight).

pub mod context;
pub mod manager;

// Re-export main types
pub use context::{ContextSnapshot, SessionContext};
pub use manager::SessionManager;

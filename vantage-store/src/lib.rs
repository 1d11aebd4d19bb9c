//! # Vantage Credential Store
//!
//! Durable client-side storage of the current session's tokens and
//! identities, with change notification for local subscribers and a
//! pluggable cross-process (tab) sync signal.
//!
//! ## Overview
//!
//! The store is a dumb persisted map plus notification: it performs no
//! network I/O and no validation of token contents. Three namespaces are
//! held behind one narrow API:
//! - **user**: the active [`Session`](vantage_identity::Session)
//! - **admin**: the [`AdminSession`](vantage_identity::AdminSession)
//! - **impersonation**: the atomic
//!   [`ImpersonationState`](vantage_identity::ImpersonationState) pair
//!
//! The namespaces never alias: no accessor can read one as another.
//!
//! ## Concurrency discipline
//!
//! The store is the single mutable resource of the identity subsystem. All
//! writers (the auth client, the impersonation broker) go through
//! `set`/`clear`; no component touches the underlying medium directly.
//! Mutators are synchronous, so a writer observes its own write before its
//! next await point.
//!
//! ## Cross-tab consistency
//!
//! Each process keeps its own cached copy; mutation broadcasts a
//! [`CredentialChange`] locally (tokio broadcast) and publishes it on the
//! injected [`SyncTransport`]. Remote signals are best-effort and
//! eventually consistent; no correctness property depends on sub-second
//! propagation.

pub mod events;
pub mod store;

// Re-export main types
pub use events::{
    ChangeKind, CredentialChange, LoopbackTransport, Namespace, NullTransport, SyncTransport,
};
pub use store::{CredentialStore, MemoryCredentialStore, StoreSnapshot};

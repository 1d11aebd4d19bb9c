//! Credential change events and the cross-process sync seam.
//!
//! Local subscribers receive [`CredentialChange`] values over a tokio
//! broadcast channel. Cross-tab propagation goes through the
//! [`SyncTransport`] trait so the core logic depends on an abstract
//! pub/sub interface, not on any specific host primitive (browser storage
//! events, OS IPC, a test loopback).

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Storage namespace a change applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Ordinary user session
    User,
    /// Administrator session
    Admin,
    /// Impersonation record + original admin token
    Impersonation,
}

impl Namespace {
    /// Convert to the string form used as the external signal topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::User => "user",
            Namespace::Admin => "admin",
            Namespace::Impersonation => "impersonation",
        }
    }
}

/// Whether the namespace was written or emptied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A value was stored
    Updated,
    /// The namespace was emptied
    Cleared,
}

/// A credential store mutation, as seen by subscribers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialChange {
    /// The namespace that changed
    pub namespace: Namespace,

    /// What happened to it
    pub kind: ChangeKind,
}

impl CredentialChange {
    /// Shorthand for an update event.
    pub fn updated(namespace: Namespace) -> Self {
        Self {
            namespace,
            kind: ChangeKind::Updated,
        }
    }

    /// Shorthand for a clear event.
    pub fn cleared(namespace: Namespace) -> Self {
        Self {
            namespace,
            kind: ChangeKind::Cleared,
        }
    }
}

/// Cross-process change signal.
///
/// The host environment implements this over whatever primitive it has;
/// other tabs feed received signals back through
/// [`CredentialStore::apply_remote`](crate::CredentialStore::apply_remote).
/// Publication is best-effort: a failed or delayed signal only delays
/// eventual resynchronization of the other tab.
pub trait SyncTransport: Send + Sync {
    /// Publish a change signal to other processes.
    fn publish(&self, change: &CredentialChange);
}

/// No-op transport for single-process use.
#[derive(Debug, Default)]
pub struct NullTransport;

impl SyncTransport for NullTransport {
    fn publish(&self, _change: &CredentialChange) {}
}

/// In-memory transport that records published changes.
///
/// Stands in for the host primitive in tests and single-process demos: a
/// second store can drain the log and apply each entry as a remote signal.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    published: Mutex<Vec<CredentialChange>>,
}

impl LoopbackTransport {
    /// Create an empty loopback transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all changes published so far.
    pub fn drain(&self) -> Vec<CredentialChange> {
        let mut published = self.published.lock().expect("transport lock poisoned");
        std::mem::take(&mut *published)
    }
}

impl SyncTransport for LoopbackTransport {
    fn publish(&self, change: &CredentialChange) {
        let mut published = self.published.lock().expect("transport lock poisoned");
        published.push(*change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_strings() {
        assert_eq!(Namespace::User.as_str(), "user");
        assert_eq!(Namespace::Admin.as_str(), "admin");
        assert_eq!(Namespace::Impersonation.as_str(), "impersonation");
    }

    #[test]
    fn test_loopback_records_in_order() {
        let transport = LoopbackTransport::new();
        transport.publish(&CredentialChange::updated(Namespace::User));
        transport.publish(&CredentialChange::cleared(Namespace::Admin));

        let drained = transport.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], CredentialChange::updated(Namespace::User));
        assert_eq!(drained[1], CredentialChange::cleared(Namespace::Admin));
        assert!(transport.drain().is_empty());
    }
}

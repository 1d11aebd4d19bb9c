//! Credential store contract and the in-memory implementation.
//!
//! The store holds the three credential namespaces behind one narrow API.
//! Every mutator notifies local subscribers synchronously and publishes the
//! change on the configured [`SyncTransport`] so other tabs can resync.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::debug;

use vantage_identity::{AdminSession, ImpersonationState, Session};

use crate::events::{CredentialChange, Namespace, NullTransport, SyncTransport};

/// Broadcast channel capacity for change notifications.
///
/// Changes are tiny and subscribers re-read the store rather than relying
/// on the event payload, so a lagged receiver only costs a redundant
/// re-derivation.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Point-in-time copy of all three namespaces.
///
/// Produced by [`CredentialStore::snapshot`] and consumed by
/// [`CredentialStore::apply_remote`] when a tab resynchronizes after a
/// cross-process change signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// User namespace
    pub session: Option<Session>,
    /// Admin namespace
    pub admin_session: Option<AdminSession>,
    /// Impersonation namespace
    pub impersonation: Option<ImpersonationState>,
}

/// Durable key/value storage of the current session state.
///
/// No network I/O and no validation of token contents: this layer is a
/// persisted map plus notification. All mutators are synchronous and
/// notify subscribers before returning.
pub trait CredentialStore: Send + Sync {
    /// Current user session, if any.
    fn get(&self) -> Option<Session>;

    /// Replace the user session.
    fn set(&self, session: Session);

    /// Empty the user namespace.
    fn clear(&self);

    /// Current admin session, if any.
    fn admin_session(&self) -> Option<AdminSession>;

    /// Replace the admin session.
    fn set_admin_session(&self, session: AdminSession);

    /// Empty the admin namespace.
    fn clear_admin_session(&self);

    /// Current impersonation state, if any.
    fn impersonation(&self) -> Option<ImpersonationState>;

    /// Replace the impersonation state (record + original admin token,
    /// committed as one value).
    fn set_impersonation(&self, state: ImpersonationState);

    /// Empty the impersonation namespace.
    fn clear_impersonation(&self);

    /// Empty every namespace. Used by logout, which must leave nothing
    /// behind even when its backend call failed.
    fn clear_all(&self);

    /// Subscribe to change notifications.
    ///
    /// Each mutator emits one [`CredentialChange`] per namespace it
    /// touched. Subscribers should re-read the store on receipt rather
    /// than trusting any cached value.
    fn subscribe(&self) -> broadcast::Receiver<CredentialChange>;

    /// Copy of all namespaces, for cross-process resynchronization.
    fn snapshot(&self) -> StoreSnapshot;

    /// Replace local state from another process's snapshot.
    ///
    /// Notifies local subscribers for every namespace that differed but
    /// does not re-publish on the sync transport (the signal originated
    /// remotely).
    fn apply_remote(&self, snapshot: StoreSnapshot);
}

/// In-memory credential store.
///
/// Suitable for single-process applications and testing; a host embedding
/// the SDK wraps its durable medium in the same trait.
pub struct MemoryCredentialStore {
    inner: RwLock<StoreSnapshot>,
    changes: broadcast::Sender<CredentialChange>,
    transport: Arc<dyn SyncTransport>,
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("store lock poisoned");
        f.debug_struct("MemoryCredentialStore")
            .field("has_session", &inner.session.is_some())
            .field("has_admin_session", &inner.admin_session.is_some())
            .field("has_impersonation", &inner.impersonation.is_some())
            .finish()
    }
}

impl MemoryCredentialStore {
    /// Create a store with no cross-process transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(NullTransport))
    }

    /// Create a store publishing changes on the given transport.
    pub fn with_transport(transport: Arc<dyn SyncTransport>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(StoreSnapshot::default()),
            changes,
            transport,
        }
    }

    /// Notify local subscribers and the sync transport.
    fn emit(&self, change: CredentialChange) {
        debug!(
            namespace = change.namespace.as_str(),
            kind = ?change.kind,
            "credential store changed"
        );
        // A send error only means no local subscribers exist.
        let _ = self.changes.send(change);
        self.transport.publish(&change);
    }

    /// Notify local subscribers without publishing externally.
    fn emit_local(&self, change: CredentialChange) {
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Session> {
        self.inner.read().expect("store lock poisoned").session.clone()
    }

    fn set(&self, session: Session) {
        {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.session = Some(session);
        }
        self.emit(CredentialChange::updated(Namespace::User));
    }

    fn clear(&self) {
        let was_present = {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.session.take().is_some()
        };
        if was_present {
            self.emit(CredentialChange::cleared(Namespace::User));
        }
    }

    fn admin_session(&self) -> Option<AdminSession> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .admin_session
            .clone()
    }

    fn set_admin_session(&self, session: AdminSession) {
        {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.admin_session = Some(session);
        }
        self.emit(CredentialChange::updated(Namespace::Admin));
    }

    fn clear_admin_session(&self) {
        let was_present = {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.admin_session.take().is_some()
        };
        if was_present {
            self.emit(CredentialChange::cleared(Namespace::Admin));
        }
    }

    fn impersonation(&self) -> Option<ImpersonationState> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .impersonation
            .clone()
    }

    fn set_impersonation(&self, state: ImpersonationState) {
        {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.impersonation = Some(state);
        }
        self.emit(CredentialChange::updated(Namespace::Impersonation));
    }

    fn clear_impersonation(&self) {
        let was_present = {
            let mut inner = self.inner.write().expect("store lock poisoned");
            inner.impersonation.take().is_some()
        };
        if was_present {
            self.emit(CredentialChange::cleared(Namespace::Impersonation));
        }
    }

    fn clear_all(&self) {
        let (had_session, had_admin, had_impersonation) = {
            let mut inner = self.inner.write().expect("store lock poisoned");
            (
                inner.session.take().is_some(),
                inner.admin_session.take().is_some(),
                inner.impersonation.take().is_some(),
            )
        };
        if had_session {
            self.emit(CredentialChange::cleared(Namespace::User));
        }
        if had_admin {
            self.emit(CredentialChange::cleared(Namespace::Admin));
        }
        if had_impersonation {
            self.emit(CredentialChange::cleared(Namespace::Impersonation));
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<CredentialChange> {
        self.changes.subscribe()
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().expect("store lock poisoned").clone()
    }

    fn apply_remote(&self, snapshot: StoreSnapshot) {
        let (session_changed, admin_changed, impersonation_changed) = {
            let mut inner = self.inner.write().expect("store lock poisoned");
            let changed = (
                inner.session != snapshot.session,
                inner.admin_session != snapshot.admin_session,
                inner.impersonation != snapshot.impersonation,
            );
            *inner = snapshot;
            changed
        };
        // Local notification only: the signal originated in another
        // process, re-publishing would loop.
        if session_changed {
            self.emit_local(CredentialChange::updated(Namespace::User));
        }
        if admin_changed {
            self.emit_local(CredentialChange::updated(Namespace::Admin));
        }
        if impersonation_changed {
            self.emit_local(CredentialChange::updated(Namespace::Impersonation));
        }
    }
}

//! Effective-identity context.
//!
//! An observer with no independent state beyond a cached snapshot: the
//! credential store stays the single source of truth, and every change
//! event triggers a re-derivation. Application surfaces read snapshots or
//! await changes through a tokio `watch` channel.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use vantage_client::AuthClient;
use vantage_identity::Identity;
use vantage_store::CredentialStore;

/// What the application currently knows about the effective identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// The effective identity. During an impersonation this is the
    /// impersonated user's, since the broker swaps the active session.
    pub identity: Option<Identity>,

    /// Whether a session is present.
    pub is_authenticated: bool,

    /// True until the mount-time backend confirmation settles.
    pub is_loading: bool,
}

impl ContextSnapshot {
    fn derive(store: &dyn CredentialStore, is_loading: bool) -> Self {
        let session = store.get();
        Self {
            identity: session.as_ref().map(|s| s.user.clone()),
            is_authenticated: session.is_some(),
            is_loading,
        }
    }
}

/// The aggregator application UI code depends on.
///
/// Mounted once per surface; owns a background task that consumes store
/// change events and republishes snapshots.
pub struct SessionContext {
    snapshots: watch::Receiver<ContextSnapshot>,
    auth: Arc<AuthClient>,
    observer: JoinHandle<()>,
}

impl SessionContext {
    /// Mount the context: read the store, confirm freshness lazily, and
    /// start observing changes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(auth: Arc<AuthClient>, store: Arc<dyn CredentialStore>) -> Self {
        let (tx, rx) = watch::channel(ContextSnapshot::derive(store.as_ref(), true));

        let observer_auth = auth.clone();
        let observer = tokio::spawn(async move {
            // Confirm an existing session before reporting settled state.
            // A terminal failure inside fetch_current_identity already
            // cleared the store, so deriving afterwards is always right.
            if store.get().is_some() {
                if let Err(error) = observer_auth.fetch_current_identity().await {
                    debug!(%error, "mount-time identity confirmation failed");
                }
            }

            let mut changes = store.subscribe();
            let _ = tx.send(ContextSnapshot::derive(store.as_ref(), false));

            loop {
                match changes.recv().await {
                    Ok(change) => {
                        debug!(namespace = change.namespace.as_str(), "re-deriving context");
                        let _ = tx.send(ContextSnapshot::derive(store.as_ref(), false));
                    }
                    // Dropped behind: the store is still authoritative,
                    // one re-derivation catches up.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        let _ = tx.send(ContextSnapshot::derive(store.as_ref(), false));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            snapshots: rx,
            auth,
            observer,
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> ContextSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver for awaiting snapshot changes.
    pub fn watch(&self) -> watch::Receiver<ContextSnapshot> {
        self.snapshots.clone()
    }

    /// Log out the current user. Local state always clears, whatever the
    /// backend says; the cleared store then drives a snapshot update.
    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    /// Stop observing store changes.
    pub fn dispose(&self) {
        self.observer.abort();
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.observer.abort();
    }
}

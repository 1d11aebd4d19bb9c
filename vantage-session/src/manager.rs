//! Session manager: the composition root of the identity subsystem.
//!
//! One instance per client process. All collaborators are injected at
//! construction and shared behind `Arc`, so hosts that need several
//! independent instances (tests, server-side rendering of concurrent
//! requests) create several managers with their own stores.

use std::sync::Arc;

use vantage_client::{AdminAuthManager, AuthClient, AuthServiceConfig, ImpersonationBroker};
use vantage_identity::CookieSink;
use vantage_store::CredentialStore;

use crate::context::SessionContext;

/// Explicit service instance wiring the identity components together.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    auth: Arc<AuthClient>,
    admin: Arc<AdminAuthManager>,
    impersonation: Arc<ImpersonationBroker>,
}

impl SessionManager {
    /// Create a manager over the given store and cookie sink.
    ///
    /// # Arguments
    ///
    /// * `config` - Backend connection configuration
    /// * `store` - The credential store (single mutable resource)
    /// * `cookies` - Seam to the host's cookie jar
    pub fn new(
        config: AuthServiceConfig,
        store: Arc<dyn CredentialStore>,
        cookies: Arc<dyn CookieSink>,
    ) -> Self {
        let auth = Arc::new(AuthClient::new(
            config.clone(),
            store.clone(),
            cookies.clone(),
        ));
        let admin = Arc::new(AdminAuthManager::new(config.clone(), store.clone()));
        let impersonation = Arc::new(ImpersonationBroker::new(config, store.clone(), cookies));

        Self {
            store,
            auth,
            admin,
            impersonation,
        }
    }

    /// The user auth client.
    pub fn auth(&self) -> Arc<AuthClient> {
        self.auth.clone()
    }

    /// The administrator session manager.
    pub fn admin(&self) -> Arc<AdminAuthManager> {
        self.admin.clone()
    }

    /// The impersonation broker.
    pub fn impersonation(&self) -> Arc<ImpersonationBroker> {
        self.impersonation.clone()
    }

    /// The credential store.
    pub fn store(&self) -> Arc<dyn CredentialStore> {
        self.store.clone()
    }

    /// Mount a session context.
    ///
    /// Reads the store, starts the change observer, and lazily confirms
    /// any existing session against the backend. The returned context owns
    /// the observer task; dropping it (or calling
    /// [`dispose`](SessionContext::dispose)) ends observation.
    pub fn mount_context(&self) -> SessionContext {
        SessionContext::mount(self.auth.clone(), self.store.clone())
    }
}

//! Composition root: one `SessionClient` per process wires every session
//! component together and owns the shared handles.
//!
//! ARCHITECTURE
//! ============
//! The request authenticator is built before the store exists and is bound
//! to it afterwards, so the transport, the gateway, and the navigation
//! dispatcher can all be constructed without a cycle. Hydration is not run
//! during construction; the host calls [`SessionClient::start`] once its
//! event loop is up.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::gateway::AuthGateway;
use crate::navigation::{NavigationDispatcher, Navigator};
use crate::net::authenticator::{AuthenticatedTransport, RequestAuthenticator};
use crate::net::transport::Transport;
use crate::net::types::Identity;
use crate::scheduler::Scheduler;
use crate::state::session::Intent;
use crate::state::store::SessionStore;
use crate::storage::{StorageBackend, TokenPersistence};

pub struct SessionClient {
    config: SessionConfig,
    store: Rc<SessionStore>,
    persistence: Rc<TokenPersistence>,
    authenticator: RequestAuthenticator,
    gateway: AuthGateway,
    dispatcher: Rc<NavigationDispatcher>,
    started: Cell<bool>,
}

impl SessionClient {
    /// Wire a client over `transport`. Every request the gateway makes goes
    /// through the bearer-credential hook first.
    pub fn new<T>(
        config: SessionConfig,
        transport: T,
        backend: Rc<dyn StorageBackend>,
        navigator: Rc<dyn Navigator>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self
    where
        T: Transport + 'static,
    {
        let persistence = Rc::new(TokenPersistence::new(backend, &config));
        let authenticator = RequestAuthenticator::new(Rc::clone(&persistence));
        let transport: Rc<dyn Transport> = Rc::new(AuthenticatedTransport::new(transport, authenticator.clone()));

        let store = Rc::new(SessionStore::new());
        authenticator.bind(&store);

        let gateway = AuthGateway::new(
            transport,
            Rc::clone(&store),
            Rc::clone(&persistence),
            Rc::clone(&navigator),
            config.routes.clone(),
        );
        let dispatcher = NavigationDispatcher::new(Rc::clone(&store), navigator, scheduler, config.routes.clone());
        dispatcher.attach();

        log::debug!("session client ready against {}", config.api_base_url);
        Self { config, store, persistence, authenticator, gateway, dispatcher, started: Cell::new(false) }
    }

    /// Native host: `reqwest` transport over the given store.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`](crate::error::TransportError::ClientBuild)
    /// if the HTTP client cannot be built.
    #[cfg(feature = "native")]
    pub fn native(
        config: SessionConfig,
        backend: Rc<dyn StorageBackend>,
        navigator: Rc<dyn Navigator>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, crate::error::TransportError> {
        let transport = crate::net::http::HttpTransport::new(&config)?;
        Ok(Self::new(config, transport, backend, navigator, scheduler))
    }

    /// Browser host: `gloo-net` transport, `localStorage`, full-page
    /// navigation, and timer-based ticks.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser(config: SessionConfig) -> Self {
        let transport = crate::net::browser::BrowserTransport::new(&config);
        Self::new(
            config,
            transport,
            crate::storage::detect_backend(),
            Rc::new(crate::navigation::LocationNavigator),
            Rc::new(crate::scheduler::BrowserScheduler),
        )
    }

    /// Restore any persisted session. Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Returns the identity-fetch error from hydration.
    pub async fn start(&self) -> Result<Option<Identity>, AuthError> {
        if self.started.replace(true) {
            return Ok(self.store.identity());
        }
        self.gateway.hydrate().await
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Ask for a navigation (e.g. `Profile` or `Admin` from a menu).
    pub fn set_intent(&self, intent: Intent) {
        self.store.set_intent(intent);
    }

    #[must_use]
    pub fn store(&self) -> &Rc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    #[must_use]
    pub fn persistence(&self) -> &Rc<TokenPersistence> {
        &self.persistence
    }

    #[must_use]
    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Rc<NavigationDispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

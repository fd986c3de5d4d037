//! Request hook that attaches the bearer credential.
//!
//! ARCHITECTURE
//! ============
//! The transport is built before the session store is wired, and the store's
//! own operations go through the transport. The authenticator therefore
//! never captures the store at construction: it holds a late-bound slot the
//! composition root fills with [`RequestAuthenticator::bind`], and it
//! resolves the credential on every call. Until the slot is bound (or if the
//! store has been dropped) it falls back to persisted storage.

#[cfg(test)]
#[path = "authenticator_test.rs"]
mod authenticator_test;

use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::TransportError;
use crate::state::store::SessionStore;
use crate::storage::TokenPersistence;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Rc<OnceCell<Weak<SessionStore>>>,
    persistence: Rc<TokenPersistence>,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(persistence: Rc<TokenPersistence>) -> Self {
        Self { store: Rc::new(OnceCell::new()), persistence }
    }

    /// Point every clone of this authenticator at `store`. First bind wins.
    pub fn bind(&self, store: &Rc<SessionStore>) {
        if self.store.set(Rc::downgrade(store)).is_err() {
            log::debug!("request authenticator already bound; ignoring rebind");
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.store.get().is_some_and(|w| w.strong_count() > 0)
    }

    /// In-memory credential first, persisted credential second.
    #[must_use]
    pub fn resolve_credential(&self) -> Option<String> {
        self.store
            .get()
            .and_then(Weak::upgrade)
            .and_then(|store| store.credential())
            .or_else(|| self.persistence.get())
    }

    #[must_use]
    pub fn authenticate(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(token) = self.resolve_credential() {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }
}

/// Any [`Transport`] with the authenticator in front of it.
pub struct AuthenticatedTransport<T> {
    inner: T,
    authenticator: RequestAuthenticator,
}

impl<T> AuthenticatedTransport<T> {
    pub fn new(inner: T, authenticator: RequestAuthenticator) -> Self {
        Self { inner, authenticator }
    }
}

#[async_trait::async_trait(?Send)]
impl<T: Transport> Transport for AuthenticatedTransport<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let request = self.authenticator.authenticate(request);
        self.inner.send(request).await
    }
}

//! Network-facing session operations: sign-in flows, identity refresh,
//! logout, hydration, and the admin user endpoints.
//!
//! ARCHITECTURE
//! ============
//! Credential-issuing calls share one protocol: raise `loading`, clear the
//! previous error, call the server, and on success write the credential to
//! the store and to persistence before fetching the identity. Only then is
//! the navigation intent set. Failures are mapped, stored in the session at
//! the point they happen, and returned.
//!
//! SEQUENCE GUARD
//! ==============
//! Each sign-in attempt takes a sequence number from `issued` when it starts.
//! Writing a credential commits that number, and so does the attempt ending
//! in failure; `logout` commits a fresh one. Any result whose sequence is
//! below `committed` is dropped without touching the store and comes back as
//! [`AuthError::Superseded`]. A slow response can never overwrite a newer
//! attempt, whether that attempt succeeded or failed, and can never resurrect
//! a signed-out session. `loading` stays raised until every operation that
//! raised it has finished.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::cell::Cell;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::config::Routes;
use crate::error::{AuthError, TransportError};
use crate::navigation::Navigator;
use crate::net::transport::{ApiRequest, ApiResponse, Transport};
use crate::net::types::{
    Identity, IdentityPatch, LoginRequest, Provider, ProviderTokenRequest, RegisterRequest, TokenResponse,
};
use crate::state::session::Intent;
use crate::state::store::SessionStore;
use crate::storage::TokenPersistence;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const ME_PATH: &str = "/auth/me";
const USERS_PATH: &str = "/auth/users";

type Seq = u64;

pub struct AuthGateway {
    transport: Rc<dyn Transport>,
    store: Rc<SessionStore>,
    persistence: Rc<TokenPersistence>,
    navigator: Rc<dyn Navigator>,
    routes: Routes,
    issued: Cell<Seq>,
    committed: Cell<Seq>,
    busy: Cell<u32>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(
        transport: Rc<dyn Transport>,
        store: Rc<SessionStore>,
        persistence: Rc<TokenPersistence>,
        navigator: Rc<dyn Navigator>,
        routes: Routes,
    ) -> Self {
        Self {
            transport,
            store,
            persistence,
            navigator,
            routes,
            issued: Cell::new(0),
            committed: Cell::new(0),
            busy: Cell::new(0),
        }
    }

    // =========================================================================
    // SIGN-IN
    // =========================================================================

    /// Exchange email and password for a credential, then load the identity.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`AuthError`] (also stored in the session), or
    /// [`AuthError::Superseded`] if a newer operation completed first.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let seq = self.begin();
        let busy = self.start_loading();
        let request = ApiRequest::post(LOGIN_PATH, &LoginRequest { email, password });
        let result = self.sign_in(seq, request).await;
        self.settle(seq, busy, result, Intent::Login)
    }

    /// Create an account and sign straight into it with the same email and password.
    ///
    /// # Errors
    ///
    /// As [`login`](Self::login); a rejected registration never reaches the login call.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Identity, AuthError> {
        let seq = self.begin();
        let busy = self.start_loading();
        let result = self.register_then_sign_in(seq, name, email, password).await;
        self.settle(seq, busy, result, Intent::Signup)
    }

    /// Exchange a third-party provider token for a credential.
    ///
    /// # Errors
    ///
    /// As [`login`](Self::login).
    pub async fn login_with_provider(&self, provider: Provider, token: &str) -> Result<Identity, AuthError> {
        let seq = self.begin();
        let busy = self.start_loading();
        log::debug!("signing in with {}", provider.as_str());
        let request = ApiRequest::post(provider.endpoint(), &ProviderTokenRequest { token });
        let result = self.sign_in(seq, request).await;
        self.settle(seq, busy, result, Intent::Login)
    }

    /// # Errors
    ///
    /// As [`login`](Self::login).
    pub async fn login_with_google(&self, token: &str) -> Result<Identity, AuthError> {
        self.login_with_provider(Provider::Google, token).await
    }

    /// # Errors
    ///
    /// As [`login`](Self::login).
    pub async fn login_with_facebook(&self, token: &str) -> Result<Identity, AuthError> {
        self.login_with_provider(Provider::Facebook, token).await
    }

    async fn register_then_sign_in(
        &self,
        seq: Seq,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let request = ApiRequest::post(REGISTER_PATH, &RegisterRequest { name, email, password });
        self.send(seq, request).await.map_err(|e| self.fail(seq, e))?;
        log::info!("registered {email}");
        self.sign_in(seq, ApiRequest::post(LOGIN_PATH, &LoginRequest { email, password })).await
    }

    async fn sign_in(&self, seq: Seq, request: Result<ApiRequest, TransportError>) -> Result<Identity, AuthError> {
        let response = self.send(seq, request).await.map_err(|e| self.fail(seq, e))?;
        let token: TokenResponse =
            response.json().map_err(|e| self.fail(seq, AuthError::from_transport(&e)))?;
        self.issue_credential(seq, &token.token);
        self.load_identity(seq).await
    }

    fn issue_credential(&self, seq: Seq, token: &str) {
        self.commit(seq);
        self.store.set_credential(token);
        self.persistence.set(token);
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// Load the identity for the current credential.
    ///
    /// A 401 signs the session out completely; no error message is kept.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`AuthError`], or [`AuthError::Superseded`] if a
    /// sign-in attempt or logout completed while the request was in flight.
    pub async fn fetch_identity(&self) -> Result<Identity, AuthError> {
        let seq = self.committed.get();
        let busy = self.start_loading();
        let result = self.load_identity(seq).await;
        drop(busy);
        if let Err(AuthError::Superseded) = &result {
            log::warn!("dropped identity refresh for a replaced session");
        }
        result
    }

    async fn load_identity(&self, seq: Seq) -> Result<Identity, AuthError> {
        let response = match self.send(seq, Ok(ApiRequest::get(ME_PATH))).await {
            Err(err) if err.is_invalid_credential() => {
                log::info!("credential rejected by {ME_PATH}; signing out");
                self.logout();
                return Err(err);
            }
            other => other.map_err(|e| self.fail(seq, e))?,
        };
        let identity: Identity = response.json().map_err(|e| self.fail(seq, AuthError::from_transport(&e)))?;

        self.store.set_identity(identity.clone());
        self.persistence.set_cached_identity(&identity);
        if self.store.credential().is_none()
            && let Some(token) = self.persistence.get()
        {
            self.store.set_credential(token);
        }
        log::debug!("identity loaded for {}", identity.email);
        Ok(identity)
    }

    // =========================================================================
    // LOGOUT / HYDRATION
    // =========================================================================

    /// Drop the session everywhere and go to the login route. No network call.
    pub fn logout(&self) {
        let seq = self.begin();
        self.commit(seq);
        log::info!("signing out");
        self.store.set_intent(Intent::Logout);
        self.persistence.clear();
        self.store.clear_auth();
        self.store.set_loading(false);
        self.navigator.navigate(&self.routes.login);
    }

    /// Restore a persisted session.
    ///
    /// With a cached identity the session is shown immediately and then
    /// revalidated; a failed revalidation signs out. Without one the identity
    /// is fetched and the user is sent home. Returns `Ok(None)` when nothing
    /// was persisted.
    ///
    /// # Errors
    ///
    /// Returns the error from the identity fetch.
    pub async fn hydrate(&self) -> Result<Option<Identity>, AuthError> {
        let Some(token) = self.persistence.get() else {
            log::debug!("no persisted credential; nothing to restore");
            return Ok(None);
        };
        self.store.set_credential(token);

        if let Some(cached) = self.persistence.cached_identity() {
            log::debug!("restoring cached identity for {}", cached.email);
            self.store.set_identity(cached);
            return match self.fetch_identity().await {
                Ok(identity) => Ok(Some(identity)),
                Err(err) => {
                    // 401 has already signed out; stale results belong to a newer session.
                    if !err.is_invalid_credential() && !err.is_superseded() {
                        log::warn!("cached session failed revalidation: {err}");
                        self.logout();
                    }
                    Err(err)
                }
            };
        }

        let identity = self.fetch_identity().await?;
        self.store.set_intent(Intent::Home);
        Ok(Some(identity))
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// # Errors
    ///
    /// Returns the mapped [`AuthError`], also stored in the session.
    pub async fn list_identities(&self) -> Result<Vec<Identity>, AuthError> {
        self.call(Ok(ApiRequest::get(USERS_PATH))).await
    }

    /// # Errors
    ///
    /// Returns the mapped [`AuthError`], also stored in the session.
    pub async fn update_identity(&self, id: &str, patch: &IdentityPatch) -> Result<Identity, AuthError> {
        self.call(ApiRequest::put(format!("{USERS_PATH}/{id}"), patch)).await
    }

    /// # Errors
    ///
    /// Returns the mapped [`AuthError`], also stored in the session.
    pub async fn delete_identity(&self, id: &str) -> Result<(), AuthError> {
        let outcome = self.transport.send(ApiRequest::delete(format!("{USERS_PATH}/{id}"))).await;
        check(outcome).map(drop).map_err(|e| self.record(e))
    }

    async fn call<T: DeserializeOwned>(&self, request: Result<ApiRequest, TransportError>) -> Result<T, AuthError> {
        let outcome = match request {
            Ok(request) => self.transport.send(request).await,
            Err(e) => Err(e),
        };
        let response = check(outcome).map_err(|e| self.record(e))?;
        response.json().map_err(|e| self.record(AuthError::from_transport(&e)))
    }

    // =========================================================================
    // PLUMBING
    // =========================================================================

    fn begin(&self) -> Seq {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);
        seq
    }

    fn commit(&self, seq: Seq) {
        if seq > self.committed.get() {
            self.committed.set(seq);
        }
    }

    fn is_stale(&self, seq: Seq) -> bool {
        seq < self.committed.get()
    }

    fn start_loading(&self) -> Busy<'_> {
        self.busy.set(self.busy.get() + 1);
        self.store.set_loading(true);
        self.store.clear_error();
        Busy { gateway: self }
    }

    /// Send `request` on behalf of operation `seq`. Stale outcomes are
    /// reported as superseded whatever the server said.
    async fn send(&self, seq: Seq, request: Result<ApiRequest, TransportError>) -> Result<ApiResponse, AuthError> {
        let outcome = match request {
            Ok(request) => self.transport.send(request).await,
            Err(e) => Err(e),
        };
        if self.is_stale(seq) {
            return Err(AuthError::Superseded);
        }
        check(outcome)
    }

    /// Store `err` unless operation `seq` has been superseded.
    fn fail(&self, seq: Seq, err: AuthError) -> AuthError {
        if err.is_superseded() || self.is_stale(seq) {
            return AuthError::Superseded;
        }
        self.record(err)
    }

    fn record(&self, err: AuthError) -> AuthError {
        log::debug!("session error: {err}");
        self.store.set_error(err.message());
        err
    }

    /// Close out a sign-in attempt. Any outcome that was not superseded
    /// commits `seq`, so older attempts still in flight are discarded.
    fn settle(
        &self,
        seq: Seq,
        busy: Busy<'_>,
        result: Result<Identity, AuthError>,
        intent: Intent,
    ) -> Result<Identity, AuthError> {
        if !matches!(result, Err(AuthError::Superseded)) {
            self.commit(seq);
        }
        drop(busy);
        match &result {
            Ok(identity) => {
                log::info!("signed in as {}", identity.email);
                self.store.clear_error();
                self.store.set_intent(intent);
            }
            Err(AuthError::Superseded) => log::warn!("dropped result of a superseded sign-in"),
            Err(_) => {}
        }
        result
    }
}

/// Holds `loading` up for one in-flight operation. The flag drops when the
/// last holder is released, including when its future is dropped mid-flight.
struct Busy<'a> {
    gateway: &'a AuthGateway,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        let busy = &self.gateway.busy;
        busy.set(busy.get().saturating_sub(1));
        if busy.get() == 0 {
            self.gateway.store.set_loading(false);
        }
    }
}

fn check(outcome: Result<ApiResponse, TransportError>) -> Result<ApiResponse, AuthError> {
    match outcome {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => Err(AuthError::from_response(response.status, &response.body)),
        Err(e) => Err(AuthError::from_transport(&e)),
    }
}

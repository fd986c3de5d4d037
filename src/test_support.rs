//! Shared fixtures for unit tests: identities, a scripted transport, a
//! recording navigator, and a fully wired client harness.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;

use crate::client::SessionClient;
use crate::config::SessionConfig;
use crate::error::TransportError;
use crate::navigation::Navigator;
use crate::net::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::net::types::Identity;
use crate::scheduler::TickQueue;
use crate::storage::MemoryStorage;

pub fn identity(id: &str, roles: &[&str]) -> Identity {
    Identity {
        id: id.to_owned(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
        phone: None,
        avatar: None,
        created_at: "2025-01-01T00:00:00".to_owned(),
        connected_accounts: None,
    }
}

pub fn identity_json(identity: &Identity) -> String {
    serde_json::to_string(identity).unwrap()
}

pub fn token_json(token: &str) -> String {
    serde_json::json!({ "token": token }).to_string()
}

// =============================================================================
// MockTransport
// =============================================================================

enum Reply {
    Ready(Result<ApiResponse, TransportError>),
    Deferred(oneshot::Receiver<ApiResponse>),
}

type Handler = Rc<dyn Fn(&ApiRequest) -> ApiResponse>;

/// Scripted transport. Queued replies are consumed in order per
/// `(method, path)`; when the queue is empty the route's handler answers;
/// with neither, the reply is a 404.
#[derive(Default)]
pub struct MockTransport {
    queued: RefCell<HashMap<(Method, String), VecDeque<Reply>>>,
    handlers: RefCell<HashMap<(Method, String), Handler>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.queued.borrow_mut().entry((method, path.to_owned())).or_default().push_back(reply);
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(method, path, Reply::Ready(Ok(ApiResponse::new(status, body))));
    }

    pub fn fail(&self, method: Method, path: &str, err: TransportError) {
        self.push(method, path, Reply::Ready(Err(err)));
    }

    /// Queue a reply the test completes later through the returned sender.
    pub fn defer(&self, method: Method, path: &str) -> oneshot::Sender<ApiResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Deferred(rx));
        tx
    }

    pub fn handle<F>(&self, method: Method, path: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> ApiResponse + 'static,
    {
        self.handlers.borrow_mut().insert((method, path.to_owned()), Rc::new(handler));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests.borrow().iter().filter(|r| r.method == method && r.path == path).cloned().collect()
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let key = (request.method, request.path.clone());
        let queued = self.queued.borrow_mut().get_mut(&key).and_then(VecDeque::pop_front);
        match queued {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx.await.map_err(|_| TransportError::Request("reply dropped".into())),
            None => {
                let handler = self.handlers.borrow().get(&key).cloned();
                Ok(handler.map_or_else(|| ApiResponse::new(404, ""), |h| h(&request)))
            }
        }
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    visits: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visits.borrow().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.borrow_mut().push(path.to_owned());
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub client: SessionClient,
    pub transport: Rc<MockTransport>,
    pub navigator: Rc<RecordingNavigator>,
    pub ticks: Rc<TickQueue>,
    pub backend: Rc<MemoryStorage>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_backend(Rc::new(MemoryStorage::new()))
    }

    pub fn with_backend(backend: Rc<MemoryStorage>) -> Self {
        let transport = MockTransport::new();
        let navigator = RecordingNavigator::new();
        let ticks = Rc::new(TickQueue::new());
        let client = SessionClient::new(
            SessionConfig::default(),
            Rc::clone(&transport),
            backend.clone(),
            navigator.clone(),
            ticks.clone(),
        );
        Self { client, transport, navigator, ticks, backend }
    }

    /// Script a successful `POST /auth/login` issuing `token`, and a
    /// `GET /auth/me` that answers with `identity` for that token.
    pub fn script_login(&self, token: &str, identity: &Identity) {
        self.transport.reply(Method::Post, "/auth/login", 200, token_json(token));
        self.script_me(token, identity);
    }

    /// `GET /auth/me` answers `identity` when called with `token`, 401 otherwise.
    pub fn script_me(&self, token: &str, identity: &Identity) {
        let expected = format!("Bearer {token}");
        let body = identity_json(identity);
        self.transport.handle(Method::Get, "/auth/me", move |req| {
            if req.header("Authorization") == Some(expected.as_str()) {
                ApiResponse::new(200, body.clone())
            } else {
                ApiResponse::new(401, "")
            }
        });
    }
}

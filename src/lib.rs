//! Client-side session manager for the auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionClient`] per process holds the signed-in user, persists the
//! bearer credential across restarts, attaches it to every API call, and
//! turns sign-in outcomes into role-aware navigation. Browser builds
//! (`hydrate`) run it against `localStorage` and `gloo-net`; native builds
//! (`native`, the default) use `reqwest` and a JSON state file.
//!
//! MODULES
//! =======
//! - `state`: the `Session` snapshot and its observable store
//! - `storage`: durable credential and identity-cache persistence
//! - `net`: wire types, the transport seam, and the bearer hook
//! - `gateway`: sign-in, logout, hydration, and admin calls
//! - `navigation`: intent-driven, role-gated post-auth routing
//! - `scheduler`: next-tick task deferral
//! - `client`: the composition root

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod net;
pub mod scheduler;
pub mod state;
pub mod storage;
#[cfg(any(feature = "hydrate", feature = "ssr"))]
pub mod ui;

#[cfg(test)]
mod test_support;

pub use client::SessionClient;
pub use config::{Routes, SessionConfig, Timeouts};
pub use error::{AuthError, ConfigError, StorageError, TransportError};
pub use gateway::AuthGateway;
pub use navigation::{NavigationDispatcher, Navigator, decide};
pub use net::authenticator::{AuthenticatedTransport, RequestAuthenticator};
pub use net::transport::{ApiRequest, ApiResponse, Method, Transport};
pub use net::types::{Identity, IdentityPatch, Provider};
pub use scheduler::{Scheduler, TickQueue};
pub use state::session::{Intent, Session};
pub use state::store::SessionStore;
pub use storage::{MemoryStorage, NoStorage, StorageBackend, TokenPersistence};

/// Route `log` records to the browser console and install the panic hook.
#[cfg(feature = "hydrate")]
pub fn init_browser_logging() {
    console_error_panic_hook::set_once();
    // A second call finds the first logger still installed and keeps it.
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        log::warn!("browser logger already installed: {err}");
    }
}

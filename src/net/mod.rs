//! Networking: wire types, the transport seam, and the request hook.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the auth wire schema, `transport` the request/response
//! seam, `authenticator` the bearer-credential hook in front of it. `http`
//! (native, `reqwest`) and `browser` (`gloo-net`) are the concrete stacks.

pub mod authenticator;
#[cfg(feature = "hydrate")]
pub mod browser;
#[cfg(feature = "native")]
pub mod http;
pub mod transport;
pub mod types;

//! Session state: the snapshot type and the observable store that owns it.
//!
//! DESIGN
//! ======
//! `session` is plain data with derived predicates; `store` wraps it in a
//! single-threaded observer container. Persistence and navigation live
//! elsewhere and react to store changes.

pub mod session;
pub mod store;

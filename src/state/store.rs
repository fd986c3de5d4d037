//! Observable container for the one `Session` per process.
//!
//! ARCHITECTURE
//! ============
//! Every mutation goes through a named setter that updates the snapshot in
//! one step, releases the borrow, and then notifies subscribers
//! synchronously. Subscribers may call setters from inside their callback;
//! the nested notification runs to completion before the outer loop moves
//! to the next subscriber, and every subscriber is handed the latest
//! snapshot at the moment it is called.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::session::{Intent, Session};
use crate::net::types::Identity;

pub type SubscriptionId = u64;

type Listener = Rc<dyn Fn(&Session)>;

#[derive(Default)]
pub struct SessionStore {
    state: RefCell<Session>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<SubscriptionId>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.state.borrow().credential.clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn intent(&self) -> Option<Intent> {
        self.state.borrow().intent
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Register `listener` for every subsequent change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Session) + 'static,
    {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    pub fn set_identity(&self, identity: Identity) {
        self.mutate(|s| s.identity = Some(identity));
    }

    pub fn clear_identity(&self) {
        self.mutate(|s| s.identity = None);
    }

    pub fn set_credential(&self, credential: impl Into<String>) {
        let credential = credential.into();
        self.mutate(|s| s.credential = Some(credential));
    }

    pub fn clear_credential(&self) {
        self.mutate(|s| s.credential = None);
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(|s| s.loading = loading);
    }

    pub fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.mutate(|s| s.error = Some(error));
    }

    pub fn clear_error(&self) {
        self.mutate(|s| s.error = None);
    }

    /// Replace the pending intent; there is never more than one.
    pub fn set_intent(&self, intent: Intent) {
        self.mutate(|s| s.intent = Some(intent));
    }

    pub fn clear_intent(&self) {
        self.mutate(|s| s.intent = None);
    }

    /// Drop identity, credential, and error in a single mutation.
    pub fn clear_auth(&self) {
        self.mutate(|s| {
            s.identity = None;
            s.credential = None;
            s.error = None;
        });
    }

    fn mutate<F>(&self, apply: F)
    where
        F: FnOnce(&mut Session),
    {
        {
            let mut state = self.state.borrow_mut();
            let before = state.clone();
            apply(&mut state);
            if *state == before {
                return;
            }
        }
        self.notify();
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            let snapshot = self.snapshot();
            listener(&snapshot);
        }
    }
}

//! Role-gated post-auth navigation driven by the session's pending intent.
//!
//! ARCHITECTURE
//! ============
//! [`decide`] is the pure transition table. [`NavigationDispatcher`]
//! subscribes to the store and re-evaluates whenever the pending intent or
//! the facts it depends on (identity present, admin role) change, so a
//! `Login` intent that lands before the identity navigates once the identity
//! arrives. Every evaluation, including a no-op, schedules the intent reset
//! on the next tick; the reset never runs inside the reaction itself.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::config::Routes;
use crate::scheduler::Scheduler;
use crate::state::session::{Intent, Session};
use crate::state::store::{SessionStore, SubscriptionId};

/// Consumer of navigation decisions (the router).
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Full-page navigation through `window.location`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for LocationNavigator {
    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
}

/// Where `intent` leads given `session`, or `None` to stay put.
#[must_use]
pub fn decide<'a>(intent: Intent, session: &Session, routes: &'a Routes) -> Option<&'a str> {
    let signed_in = session.is_authenticated();
    match intent {
        Intent::Login | Intent::Signup if signed_in => {
            Some(if session.is_admin() { routes.admin_home.as_str() } else { routes.home.as_str() })
        }
        Intent::Login | Intent::Signup | Intent::Logout => None,
        Intent::Profile => signed_in.then_some(routes.profile.as_str()),
        Intent::Home => Some(routes.home.as_str()),
        Intent::Admin => session.is_admin().then_some(routes.admin_home.as_str()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Trigger {
    intent: Intent,
    signed_in: bool,
    admin: bool,
}

impl Trigger {
    fn of(intent: Intent, session: &Session) -> Self {
        Self { intent, signed_in: session.is_authenticated(), admin: session.is_admin() }
    }
}

pub struct NavigationDispatcher {
    store: Rc<SessionStore>,
    navigator: Rc<dyn Navigator>,
    scheduler: Rc<dyn Scheduler>,
    routes: Routes,
    last: Cell<Option<Trigger>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl NavigationDispatcher {
    #[must_use]
    pub fn new(
        store: Rc<SessionStore>,
        navigator: Rc<dyn Navigator>,
        scheduler: Rc<dyn Scheduler>,
        routes: Routes,
    ) -> Rc<Self> {
        Rc::new(Self {
            store,
            navigator,
            scheduler,
            routes,
            last: Cell::new(None),
            subscription: Cell::new(None),
        })
    }

    /// Start reacting to store changes. Calling twice is a no-op.
    pub fn attach(self: &Rc<Self>) {
        if self.subscription.get().is_some() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.store.subscribe(move |session| {
            if let Some(dispatcher) = weak.upgrade() {
                dispatcher.on_change(session);
            }
        });
        self.subscription.set(Some(id));
    }

    pub fn detach(&self) {
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
        }
        self.last.set(None);
    }

    fn on_change(&self, session: &Session) {
        let Some(intent) = session.intent else {
            self.last.set(None);
            return;
        };
        let trigger = Trigger::of(intent, session);
        if self.last.get() == Some(trigger) {
            return;
        }
        self.last.set(Some(trigger));
        self.dispatch(intent, session);
    }

    /// Apply the transition table once and schedule the intent reset.
    /// Returns the path navigated to, if any.
    pub fn dispatch(&self, intent: Intent, session: &Session) -> Option<String> {
        let target = decide(intent, session, &self.routes);
        match target {
            Some(path) => {
                log::debug!("intent '{}' -> {path}", intent.as_str());
                self.navigator.navigate(path);
            }
            None => log::debug!("intent '{}' -> no navigation", intent.as_str()),
        }

        let store = Rc::downgrade(&self.store);
        self.scheduler.defer(Box::new(move || {
            if let Some(store) = store.upgrade() {
                store.clear_intent();
            }
        }));

        target.map(str::to_owned)
    }
}

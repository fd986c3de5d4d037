//! Leptos bridge: mirror the session store into a signal and adapt the
//! router to the navigation seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components read `RwSignal<Session>` from context and apply the
//! same unauthenticated redirect; the store stays the source of truth.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::client::SessionClient;
use crate::navigation::Navigator;
use crate::state::session::Session;

/// Provide a signal that tracks every store change, and kick off hydration
/// in the browser.
pub fn provide_session_signal(client: &Rc<SessionClient>) -> RwSignal<Session> {
    let session = RwSignal::new(client.store().snapshot());
    client.store().subscribe(move |snapshot| session.set(snapshot.clone()));
    provide_context(session);

    #[cfg(feature = "hydrate")]
    {
        let client = Rc::clone(client);
        leptos::task::spawn_local(async move {
            if let Err(e) = client.start().await {
                log::warn!("session restore failed: {e}");
            }
        });
    }

    session
}

/// Redirect to `login_route` whenever the session has settled with nobody signed in.
pub fn install_unauth_redirect<F>(session: RwSignal<Session>, login_route: String, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = session.get();
        if !state.loading && !state.is_authenticated() {
            navigate(&login_route, NavigateOptions::default());
        }
    });
}

/// Client-side router navigation (e.g. from `leptos_router::hooks::use_navigate`).
#[derive(Clone)]
pub struct RouterNavigator<F> {
    navigate: F,
}

impl<F> RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    pub fn new(navigate: F) -> Self {
        Self { navigate }
    }
}

impl<F> Navigator for RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    fn navigate(&self, path: &str) {
        (self.navigate)(path, NavigateOptions::default());
    }
}

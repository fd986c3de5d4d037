#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::Identity;

/// A deferred navigation decision, made once pending auth work settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    Login,
    Signup,
    Logout,
    Profile,
    Home,
    Admin,
}

impl Intent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Logout => "logout",
            Self::Profile => "profile",
            Self::Home => "home",
            Self::Admin => "admin",
        }
    }
}

/// Snapshot of the authenticated session.
///
/// In the Leptos bridge this is mirrored into an `RwSignal<Session>`;
/// everywhere else it is read through `SessionStore::snapshot`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub credential: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub intent: Option<Intent>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Derived from `identity.roles` on every call; never cached.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }
}

//! Session configuration: API location, storage keys, timeouts, and routes.
//!
//! Browser builds normally use [`SessionConfig::default`]; native hosts and
//! the CLI read overrides from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TOKEN_KEY: &str = "authToken";
pub const DEFAULT_IDENTITY_KEY: &str = "user";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const API_URL_VAR: &str = "SESSION_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Paths the navigation dispatcher hands to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub login: String,
    pub home: String,
    pub admin_home: String,
    pub profile: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".to_owned(),
            home: "/home".to_owned(),
            admin_home: "/admin/dashboard".to_owned(),
            profile: "/profile".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Prefix for every auth endpoint, without a trailing slash.
    pub api_base_url: String,
    /// Storage key for the bearer credential.
    pub token_key: String,
    /// Storage key for the cached identity JSON.
    pub identity_key: String,
    pub timeouts: Timeouts,
    pub routes: Routes,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            identity_key: DEFAULT_IDENTITY_KEY.to_owned(),
            timeouts: Timeouts::default(),
            routes: Routes::default(),
        }
    }
}

impl SessionConfig {
    /// Build config from environment variables.
    ///
    /// All optional:
    /// - `SESSION_API_URL`: default `http://localhost:8080/api`
    /// - `SESSION_TOKEN_KEY` / `SESSION_IDENTITY_KEY`: default `authToken` / `user`
    /// - `SESSION_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SESSION_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_ROUTE_LOGIN`, `SESSION_ROUTE_HOME`, `SESSION_ROUTE_ADMIN`, `SESSION_ROUTE_PROFILE`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is blank or a route is not absolute.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] but reading from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is blank or a route is not absolute.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = match non_empty(&lookup, API_URL_VAR)? {
            Some(raw) => base_url(&raw)?,
            None => defaults.api_base_url,
        };

        let token_key = non_empty(&lookup, "SESSION_TOKEN_KEY")?.unwrap_or(defaults.token_key);
        let identity_key = non_empty(&lookup, "SESSION_IDENTITY_KEY")?.unwrap_or(defaults.identity_key);

        let timeouts = Timeouts {
            request_secs: parse_u64(&lookup, "SESSION_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "SESSION_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let routes = Routes {
            login: route(&lookup, "SESSION_ROUTE_LOGIN", defaults.routes.login)?,
            home: route(&lookup, "SESSION_ROUTE_HOME", defaults.routes.home)?,
            admin_home: route(&lookup, "SESSION_ROUTE_ADMIN", defaults.routes.admin_home)?,
            profile: route(&lookup, "SESSION_ROUTE_PROFILE", defaults.routes.profile)?,
        };

        Ok(Self { api_base_url, token_key, identity_key, timeouts, routes })
    }

    /// Replace the API base URL, applying the same checks as `SESSION_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if nothing is left after trimming.
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = base_url(raw)?;
        Ok(self)
    }

    /// Join an endpoint path onto the API base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::Empty { var: API_URL_VAR.into() });
    }
    Ok(url.to_owned())
}

fn non_empty<F>(lookup: &F, var: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { var: var.into() }),
        Some(v) => Ok(Some(v.trim().to_owned())),
    }
}

fn parse_u64<F>(lookup: &F, var: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

fn route<F>(lookup: &F, var: &str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = non_empty(lookup, var)? else {
        return Ok(default);
    };
    if !value.starts_with('/') {
        return Err(ConfigError::InvalidRoute { var: var.into(), value });
    }
    Ok(value)
}

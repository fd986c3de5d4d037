use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// defaults
// =============================================================================

#[test]
fn empty_lookup_yields_defaults() {
    let cfg = SessionConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, SessionConfig::default());
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.token_key, "authToken");
    assert_eq!(cfg.identity_key, "user");
    assert_eq!(cfg.routes.admin_home, "/admin/dashboard");
}

// =============================================================================
// overrides
// =============================================================================

#[test]
fn overrides_are_applied_and_base_url_trimmed() {
    let cfg = SessionConfig::from_lookup(lookup(&[
        ("SESSION_API_URL", "https://api.example.test/api/"),
        ("SESSION_TOKEN_KEY", "tok"),
        ("SESSION_IDENTITY_KEY", "me"),
        ("SESSION_REQUEST_TIMEOUT_SECS", "5"),
        ("SESSION_CONNECT_TIMEOUT_SECS", "2"),
        ("SESSION_ROUTE_ADMIN", "/admin"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_base_url, "https://api.example.test/api");
    assert_eq!(cfg.token_key, "tok");
    assert_eq!(cfg.identity_key, "me");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.routes.admin_home, "/admin");
    assert_eq!(cfg.routes.home, "/home");
}

#[test]
fn unparseable_timeouts_fall_back_to_defaults() {
    let cfg = SessionConfig::from_lookup(lookup(&[("SESSION_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

// =============================================================================
// validation
// =============================================================================

#[test]
fn blank_value_is_rejected() {
    let err = SessionConfig::from_lookup(lookup(&[("SESSION_TOKEN_KEY", "  ")])).unwrap_err();
    assert_eq!(err, ConfigError::Empty { var: "SESSION_TOKEN_KEY".into() });
}

#[test]
fn slash_only_base_url_is_rejected() {
    let err = SessionConfig::from_lookup(lookup(&[("SESSION_API_URL", "/")])).unwrap_err();
    assert_eq!(err, ConfigError::Empty { var: "SESSION_API_URL".into() });
}

#[test]
fn base_url_override_is_trimmed() {
    let cfg = SessionConfig::default().with_api_base_url(" http://h.test/api/ ").unwrap();
    assert_eq!(cfg.api_base_url, "http://h.test/api");
    assert_eq!(cfg.endpoint("/auth/me"), "http://h.test/api/auth/me");
}

#[test]
fn blank_base_url_override_is_rejected() {
    for raw in ["", "   ", "/", "//"] {
        let err = SessionConfig::default().with_api_base_url(raw).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: "SESSION_API_URL".into() }, "override {raw:?}");
    }
}

#[test]
fn relative_route_is_rejected() {
    let err = SessionConfig::from_lookup(lookup(&[("SESSION_ROUTE_HOME", "home")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidRoute { var: "SESSION_ROUTE_HOME".into(), value: "home".into() });
}

// =============================================================================
// endpoint
// =============================================================================

#[test]
fn endpoint_joins_with_single_slash() {
    let cfg = SessionConfig::default();
    assert_eq!(cfg.endpoint("/auth/me"), "http://localhost:8080/api/auth/me");
    assert_eq!(cfg.endpoint("auth/users/7"), "http://localhost:8080/api/auth/users/7");
}

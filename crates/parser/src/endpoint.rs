//! Backend endpoint resolution
//!
//! The first declared server becomes the single upstream target of the proxy.
//! Its path doubles as the proxy's public base path.

use crate::openapi::OpenApiSpec;
use oas2proxy_common::{GeneratorError, Result};
use tracing::debug;
use url::Url;

/// Backend derived from the first server entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    /// URL scheme (e.g., "https")
    pub scheme: String,

    /// Host name, without any port
    pub host: String,

    /// URL path as written; empty when the URL has none
    pub path: String,
}

impl BackendEndpoint {
    /// Backend target URL, `scheme://host`
    pub fn target_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Public base path of the proxy
    pub fn base_path(&self) -> &str {
        &self.path
    }
}

/// Resolve the backend endpoint from the document's server list
///
/// Only the first server is considered. A document without servers is a
/// configuration error; no default host is assumed.
pub fn resolve_backend(spec: &OpenApiSpec) -> Result<BackendEndpoint> {
    let servers = spec.declared_servers();
    let server = servers
        .first()
        .ok_or_else(|| GeneratorError::Configuration("no server declared".to_string()))?;

    if servers.len() > 1 {
        debug!(
            ignored = servers.len() - 1,
            "using first declared server only"
        );
    }

    let url = Url::parse(&server.url).map_err(|e| {
        GeneratorError::Configuration(format!("invalid server url '{}': {}", server.url, e))
    })?;

    let host = url.host_str().ok_or_else(|| {
        GeneratorError::Configuration(format!("server url '{}' has no host", server.url))
    })?;

    if let Some(port) = url.port() {
        debug!(port, "dropping server port from target url");
    }

    Ok(BackendEndpoint {
        scheme: url.scheme().to_string(),
        host: host.to_string(),
        path: declared_path(&url, &server.url),
    })
}

/// Path of the server URL as declared
///
/// `Url` reports "/" for an authority with no path at all; the declared
/// text decides whether the path was actually written.
fn declared_path(url: &Url, declared: &str) -> String {
    let after_scheme = declared
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(declared);
    let authority_and_path = after_scheme
        .split(&['?', '#'][..])
        .next()
        .unwrap_or_default();

    if authority_and_path.contains('/') {
        url.path().to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_with_servers(servers: serde_json::Value) -> OpenApiSpec {
        serde_json::from_value(json!({
            "openapi": "3.0.0",
            "servers": servers
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_first_server() {
        let spec = spec_with_servers(json!([
            {"url": "https://api.example.com/v1"},
            {"url": "https://staging.example.com/v1"}
        ]));

        let backend = resolve_backend(&spec).unwrap();
        assert_eq!(backend.scheme, "https");
        assert_eq!(backend.host, "api.example.com");
        assert_eq!(backend.target_url(), "https://api.example.com");
        assert_eq!(backend.base_path(), "/v1");
    }

    #[test]
    fn test_second_server_does_not_matter() {
        let a = spec_with_servers(json!([
            {"url": "https://api.example.com/v1"},
            {"url": "https://one.example.com"}
        ]));
        let b = spec_with_servers(json!([
            {"url": "https://api.example.com/v1"},
            {"url": "http://two.example.org/other"}
        ]));

        assert_eq!(resolve_backend(&a).unwrap(), resolve_backend(&b).unwrap());
    }

    #[test]
    fn test_missing_servers_is_configuration_error() {
        let spec = spec_with_servers(json!([]));
        let err = resolve_backend(&spec).unwrap_err();
        assert!(
            matches!(err, GeneratorError::Configuration(ref msg) if msg == "no server declared")
        );

        let spec: OpenApiSpec = serde_json::from_value(json!({"openapi": "3.0.0"})).unwrap();
        assert!(matches!(
            resolve_backend(&spec),
            Err(GeneratorError::Configuration(_))
        ));
    }

    #[test]
    fn test_port_dropped_from_target() {
        let spec = spec_with_servers(json!([{"url": "http://localhost:8080/"}]));
        let backend = resolve_backend(&spec).unwrap();
        assert_eq!(backend.host, "localhost");
        assert_eq!(backend.target_url(), "http://localhost");
        assert_eq!(backend.base_path(), "/");
    }

    #[test]
    fn test_trailing_slash_kept() {
        let spec = spec_with_servers(json!([{"url": "https://api.example.com/v1/"}]));
        assert_eq!(resolve_backend(&spec).unwrap().base_path(), "/v1/");
    }

    #[test]
    fn test_missing_path_is_empty() {
        let spec = spec_with_servers(json!([{"url": "https://api.example.com"}]));
        assert_eq!(resolve_backend(&spec).unwrap().base_path(), "");

        let spec = spec_with_servers(json!([{"url": "https://api.example.com?x=1"}]));
        assert_eq!(resolve_backend(&spec).unwrap().base_path(), "");
    }

    #[test]
    fn test_relative_server_url_rejected() {
        let spec = spec_with_servers(json!([{"url": "/v1"}]));
        assert!(matches!(
            resolve_backend(&spec),
            Err(GeneratorError::Configuration(msg)) if msg.contains("/v1")
        ));
    }
}

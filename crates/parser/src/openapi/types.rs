//! OpenAPI 2.0 / 3.x type definitions
//!
//! Simplified representation focusing on what proxy generation needs. The
//! full document is kept separately as a JSON tree, so fields not modelled
//! here survive re-serialization.

use oas2proxy_common::HttpMethod;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// OpenAPI document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI 3 version (e.g., "3.0.3")
    #[serde(default)]
    pub openapi: Option<String>,

    /// Swagger 2 version (always "2.0")
    #[serde(default)]
    pub swagger: Option<String>,

    /// API metadata
    #[serde(default)]
    pub info: Option<Info>,

    /// API paths, ordered by path template; `x-` extensions are dropped
    #[serde(default, deserialize_with = "deserialize_paths")]
    pub paths: BTreeMap<String, PathItem>,

    /// Servers (OpenAPI 3)
    #[serde(default)]
    pub servers: Vec<Server>,

    /// Host (Swagger 2)
    #[serde(default)]
    pub host: Option<String>,

    /// Base path (Swagger 2)
    #[serde(rename = "basePath")]
    #[serde(default)]
    pub base_path: Option<String>,

    /// Transfer schemes (Swagger 2)
    #[serde(default)]
    pub schemes: Vec<String>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    /// API title
    #[serde(default)]
    pub title: String,

    /// API version
    #[serde(default)]
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Server {
    /// Server URL, possibly containing `{variable}` placeholders
    #[serde(default)]
    pub url: String,

    /// Substitution variables for the URL
    #[serde(default)]
    pub variables: BTreeMap<String, ServerVariable>,
}

/// Server URL variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Value used when no alternative is supplied
    #[serde(default)]
    pub default: String,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub options: Option<Operation>,

    #[serde(default)]
    pub trace: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Responses keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, serde_json::Value>,
}

/// Decode the Paths object, skipping `x-` extension entries
///
/// Extensions may hold any value, so they are removed before each entry is
/// decoded as a [`PathItem`].
fn deserialize_paths<'de, D>(deserializer: D) -> Result<BTreeMap<String, PathItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    entries
        .into_iter()
        .filter(|(key, _)| !key.starts_with("x-"))
        .map(|(key, value)| {
            serde_json::from_value::<PathItem>(value)
                .map(|item| (key.clone(), item))
                .map_err(|e| serde::de::Error::custom(format!("path '{}': {}", key, e)))
        })
        .collect()
}

impl PathItem {
    /// Operation declared for a method, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    /// Declared operations in canonical method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

impl OpenApiSpec {
    /// True for Swagger 2.0 documents
    pub fn is_swagger2(&self) -> bool {
        self.openapi.is_none() && self.swagger.is_some()
    }

    /// Non-empty API description, if declared
    pub fn description(&self) -> Option<&str> {
        self.info
            .as_ref()
            .and_then(|info| info.description.as_deref())
            .filter(|description| !description.is_empty())
    }

    /// Path items in path order
    pub fn path_items(&self) -> impl Iterator<Item = (&str, &PathItem)> {
        self.paths.iter().map(|(key, item)| (key.as_str(), item))
    }

    /// Servers in declaration order, with URL variables substituted
    ///
    /// Swagger 2 documents have no `servers` list; a single server is built
    /// from `schemes`, `host` and `basePath` when a host is declared.
    pub fn declared_servers(&self) -> Vec<Server> {
        if !self.servers.is_empty() {
            return self
                .servers
                .iter()
                .map(|server| Server {
                    url: server.resolved_url(),
                    ..server.clone()
                })
                .collect();
        }

        match (&self.host, self.is_swagger2()) {
            (Some(host), true) if !host.is_empty() => {
                let scheme = self.schemes.first().map(String::as_str).unwrap_or("https");
                let base_path = self.base_path.as_deref().unwrap_or("");
                vec![Server {
                    url: format!("{}://{}{}", scheme, host, base_path),
                    ..Server::default()
                }]
            }
            _ => Vec::new(),
        }
    }
}

impl Server {
    /// URL with every `{name}` replaced by the variable's default value
    pub fn resolved_url(&self) -> String {
        self.variables
            .iter()
            .fold(self.url.clone(), |url, (name, variable)| {
                url.replace(&format!("{{{}}}", name), &variable.default)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operations_follow_canonical_order() {
        let item: PathItem = serde_json::from_value(json!({
            "head": {"responses": {"200": {"description": "OK"}}},
            "delete": {"responses": {"204": {"description": "Gone"}}},
            "get": {"responses": {"200": {"description": "OK"}}}
        }))
        .unwrap();

        let methods: Vec<HttpMethod> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Delete, HttpMethod::Head]
        );
    }

    #[test]
    fn test_server_variables_substituted() {
        let spec: OpenApiSpec = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "servers": [{
                "url": "https://{region}.example.com/{basePath}",
                "variables": {
                    "region": {"default": "eu", "enum": ["eu", "us"]},
                    "basePath": {"default": "v2"}
                }
            }]
        }))
        .unwrap();

        let servers = spec.declared_servers();
        assert_eq!(servers[0].url, "https://eu.example.com/v2");
    }

    #[test]
    fn test_swagger2_server_from_host() {
        let spec: OpenApiSpec = serde_json::from_value(json!({
            "swagger": "2.0",
            "host": "petstore.example.com:8443",
            "basePath": "/api",
            "schemes": ["http"]
        }))
        .unwrap();

        assert!(spec.is_swagger2());
        let servers = spec.declared_servers();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].url, "http://petstore.example.com:8443/api");
    }

    #[test]
    fn test_no_servers_without_host() {
        let spec: OpenApiSpec = serde_json::from_value(json!({"swagger": "2.0"})).unwrap();
        assert!(spec.declared_servers().is_empty());
    }

    #[test]
    fn test_path_extensions_with_any_value_skipped() {
        let spec: OpenApiSpec = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "paths": {
                "x-internal": true,
                "x-owners": ["team-a"],
                "/items": {"get": {"responses": {"200": {"description": "OK"}}}}
            }
        }))
        .unwrap();

        let keys: Vec<&str> = spec.path_items().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["/items"]);
    }

    #[test]
    fn test_malformed_path_item_names_the_path() {
        let err = serde_json::from_value::<OpenApiSpec>(json!({
            "openapi": "3.0.0",
            "paths": {"/items": true}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("/items"));
    }

    #[test]
    fn test_empty_description_is_none() {
        let spec: OpenApiSpec = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1", "description": ""}
        }))
        .unwrap();
        assert_eq!(spec.description(), None);
    }
}

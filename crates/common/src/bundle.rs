//! Proxy bundle model
//!
//! The generator never builds a [`ProxyBundle`] directly. It talks to the
//! [`ProxyBundleModel`] setter interface so that alternative bundle
//! representations (or test doubles) can receive the same sequence of calls.

use crate::HttpMethod;
use serde::{Deserialize, Serialize};

/// Setter interface for populating a proxy bundle definition
pub trait ProxyBundleModel {
    /// Set the bundle display name
    fn set_display_name(&mut self, name: &str);

    /// Set the bundle description
    fn set_description(&mut self, description: &str);

    /// Set the creation timestamp (epoch milliseconds)
    fn set_created_at(&mut self, epoch_millis: i64);

    /// Set the last modification timestamp (epoch milliseconds)
    fn set_last_modified_at(&mut self, epoch_millis: i64);

    /// Set the bundle configuration version
    fn set_configuration_version(&mut self, version: ConfigurationVersion);

    /// Register a target endpoint name in the bundle descriptor
    fn add_target_endpoint(&mut self, name: &str);

    /// Register a proxy endpoint name in the bundle descriptor
    fn add_proxy_endpoint(&mut self, name: &str);

    /// Attach a bundled resource
    fn add_resource(&mut self, resource: BundleResource);

    /// Register a policy name
    fn add_policy(&mut self, name: &str);

    /// Set the public base path of the bundle
    fn set_base_path(&mut self, base_path: &str);

    /// Create the target endpoint pointing at a backend URL
    fn new_target_endpoint(&mut self, name: &str, url: &str);

    /// Create the proxy endpoint serving a base path
    fn new_proxy_endpoint(&mut self, name: &str, base_path: &str);

    /// Append a step to the proxy endpoint's request pre-flow
    fn add_pre_flow_request_step(&mut self, step: &str);

    /// Append a routing flow to the proxy endpoint
    fn add_flow(&mut self, flow: Flow);
}

/// Bundle configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationVersion {
    pub major: u32,
    pub minor: u32,
}

impl Default for ConfigurationVersion {
    fn default() -> Self {
        Self { major: 4, minor: 0 }
    }
}

/// A file shipped inside the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleResource {
    /// Resource type (e.g., "oas")
    pub kind: String,

    /// Resource file name
    pub name: String,

    /// Raw file content
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl BundleResource {
    /// Create an OpenAPI document resource
    pub fn oas(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: "oas".to_string(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Resource reference as used by policies (e.g., "oas://petstore.yaml")
    pub fn reference(&self) -> String {
        format!("{}://{}", self.kind, self.name)
    }
}

/// One routing rule of the proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow name (the operation identifier)
    pub name: String,

    /// Wildcarded path pattern (e.g., "/items/*")
    pub path_pattern: String,

    /// HTTP verb the flow matches
    pub method: HttpMethod,

    /// Human-readable description, possibly empty
    pub description: String,
}

/// Upstream backend definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEndpoint {
    pub name: String,
    pub url: String,
}

/// Public-facing endpoint with its pre-flow and routing flows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub name: String,
    pub base_path: String,
    pub pre_flow_request_steps: Vec<String>,
    pub flows: Vec<Flow>,
}

/// In-memory proxy bundle definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyBundle {
    pub display_name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub last_modified_at: i64,
    pub configuration_version: ConfigurationVersion,
    pub base_path: String,

    /// Names listed in the bundle descriptor
    pub target_endpoint_names: Vec<String>,
    pub proxy_endpoint_names: Vec<String>,

    pub resources: Vec<BundleResource>,
    pub policies: Vec<String>,
    pub target_endpoint: Option<TargetEndpoint>,
    pub proxy_endpoint: Option<ProxyEndpoint>,
}

impl ProxyBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Routing flows of the proxy endpoint (empty if none was created)
    pub fn flows(&self) -> &[Flow] {
        self.proxy_endpoint
            .as_ref()
            .map(|endpoint| endpoint.flows.as_slice())
            .unwrap_or_default()
    }

    fn proxy_endpoint_mut(&mut self) -> &mut ProxyEndpoint {
        let fallback_name = self
            .proxy_endpoint_names
            .first()
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        self.proxy_endpoint.get_or_insert_with(|| ProxyEndpoint {
            name: fallback_name,
            ..ProxyEndpoint::default()
        })
    }
}

impl ProxyBundleModel for ProxyBundle {
    fn set_display_name(&mut self, name: &str) {
        self.display_name = name.to_string();
    }

    fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    fn set_created_at(&mut self, epoch_millis: i64) {
        self.created_at = epoch_millis;
    }

    fn set_last_modified_at(&mut self, epoch_millis: i64) {
        self.last_modified_at = epoch_millis;
    }

    fn set_configuration_version(&mut self, version: ConfigurationVersion) {
        self.configuration_version = version;
    }

    fn add_target_endpoint(&mut self, name: &str) {
        self.target_endpoint_names.push(name.to_string());
    }

    fn add_proxy_endpoint(&mut self, name: &str) {
        self.proxy_endpoint_names.push(name.to_string());
    }

    fn add_resource(&mut self, resource: BundleResource) {
        self.resources.push(resource);
    }

    fn add_policy(&mut self, name: &str) {
        self.policies.push(name.to_string());
    }

    fn set_base_path(&mut self, base_path: &str) {
        self.base_path = base_path.to_string();
    }

    fn new_target_endpoint(&mut self, name: &str, url: &str) {
        self.target_endpoint = Some(TargetEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    fn new_proxy_endpoint(&mut self, name: &str, base_path: &str) {
        self.proxy_endpoint = Some(ProxyEndpoint {
            name: name.to_string(),
            base_path: base_path.to_string(),
            ..ProxyEndpoint::default()
        });
    }

    fn add_pre_flow_request_step(&mut self, step: &str) {
        self.proxy_endpoint_mut()
            .pre_flow_request_steps
            .push(step.to_string());
    }

    fn add_flow(&mut self, flow: Flow) {
        self.proxy_endpoint_mut().flows.push(flow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_reference() {
        let resource = BundleResource::oas("petstore.yaml", "openapi: 3.0.0");
        assert_eq!(resource.reference(), "oas://petstore.yaml");
        assert_eq!(resource.content, b"openapi: 3.0.0".to_vec());
    }

    #[test]
    fn test_flows_attach_to_lazily_created_endpoint() {
        let mut bundle = ProxyBundle::new();
        bundle.add_proxy_endpoint("edge");
        bundle.add_flow(Flow {
            name: "listItems".to_string(),
            path_pattern: "/items".to_string(),
            method: HttpMethod::Get,
            description: String::new(),
        });

        let endpoint = bundle.proxy_endpoint.as_ref().unwrap();
        assert_eq!(endpoint.name, "edge");
        assert_eq!(bundle.flows().len(), 1);
    }

    #[test]
    fn test_new_proxy_endpoint_resets_flows() {
        let mut bundle = ProxyBundle::new();
        bundle.add_pre_flow_request_step("Verify-Key");
        bundle.new_proxy_endpoint("default", "/v1");

        let endpoint = bundle.proxy_endpoint.as_ref().unwrap();
        assert_eq!(endpoint.base_path, "/v1");
        assert!(endpoint.pre_flow_request_steps.is_empty());
    }

    #[test]
    fn test_default_configuration_version() {
        let bundle = ProxyBundle::new();
        assert_eq!(
            bundle.configuration_version,
            ConfigurationVersion { major: 4, minor: 0 }
        );
        assert!(bundle.flows().is_empty());
    }
}

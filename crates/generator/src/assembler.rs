//! Flow assembly
//!
//! Drives a [`ProxyBundleModel`] from a loaded OpenAPI document: bundle
//! identity, the single backend target, the proxy endpoint with its schema
//! validation step, and one flow per declared (path, method) pair.

use chrono::Utc;
use oas2proxy_common::{
    BundleResource, ConfigurationVersion, Flow, GeneratorError, ProxyBundleModel, Result,
};
use oas2proxy_parser::{resolve_backend, wildcard_path, LoadedDocument, OperationMapper};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Name of the target endpoint and proxy endpoint
pub const DEFAULT_ENDPOINT_NAME: &str = "default";

/// Pre-flow step that runs OpenAPI request validation
pub const VALIDATION_STEP_NAME: &str = "OpenAPI-Spec-Validation-1";

/// Name of the schema validation policy for a proxy
pub fn validation_policy_name(display_name: &str) -> String {
    format!("Validate-{}-Schema", display_name)
}

/// Populate `model` with a proxy bundle generated from `document`
///
/// The backend is resolved before the model is touched, so a document
/// without servers leaves the model exactly as it was.
pub fn assemble<M: ProxyBundleModel + ?Sized>(
    document: &LoadedDocument,
    display_name: &str,
    resource_name: &str,
    model: &mut M,
) -> Result<()> {
    check_display_name(display_name)?;

    let spec = document.spec();
    let backend = resolve_backend(spec)?;
    debug!(
        target_url = %backend.target_url(),
        base_path = backend.base_path(),
        "resolved backend"
    );

    model.set_display_name(display_name);
    if let Some(description) = spec.description() {
        model.set_description(description);
    }

    let now = Utc::now().timestamp_millis();
    model.set_created_at(now);
    model.set_last_modified_at(now);
    model.set_configuration_version(ConfigurationVersion::default());

    model.add_target_endpoint(DEFAULT_ENDPOINT_NAME);
    model.add_proxy_endpoint(DEFAULT_ENDPOINT_NAME);
    model.add_resource(BundleResource::oas(resource_name, document.content()));
    model.add_policy(&validation_policy_name(display_name));

    model.set_base_path(backend.base_path());
    model.new_target_endpoint(DEFAULT_ENDPOINT_NAME, &backend.target_url());
    model.new_proxy_endpoint(DEFAULT_ENDPOINT_NAME, backend.base_path());
    model.add_pre_flow_request_step(VALIDATION_STEP_NAME);

    let flow_count = add_flows(document, model);
    info!(
        proxy = display_name,
        flows = flow_count,
        "assembled proxy bundle"
    );

    Ok(())
}

/// The display name also names the bundle descriptor file
fn check_display_name(display_name: &str) -> Result<()> {
    if display_name.trim().is_empty() {
        return Err(GeneratorError::Configuration(
            "proxy display name must not be empty".to_string(),
        ));
    }
    if display_name == "." || display_name == ".." || display_name.contains(&['/', '\\'][..]) {
        return Err(GeneratorError::Configuration(format!(
            "proxy display name '{}' must not contain path separators",
            display_name
        )));
    }
    Ok(())
}

/// Register one flow per declared (path, method) pair, returning the count
fn add_flows<M: ProxyBundleModel + ?Sized>(document: &LoadedDocument, model: &mut M) -> usize {
    let mut seen = HashSet::new();
    let mut count = 0;

    for (path, item) in document.spec().path_items() {
        let path_pattern = wildcard_path(path);
        for (method, detail) in OperationMapper::map_methods(item, path) {
            if !seen.insert(detail.operation_id.clone()) {
                warn!(
                    flow = %detail.operation_id,
                    path,
                    "duplicate flow name"
                );
            }

            model.add_flow(Flow {
                name: detail.operation_id,
                path_pattern: path_pattern.clone(),
                method,
                description: detail.description,
            });
            count += 1;
        }
    }

    count
}

//! Structural validation of OpenAPI documents
//!
//! Runs after decoding and before any derived model is built. Each check
//! reports the first violation it finds as a `GeneratorError::Validation`.

use super::types::OpenApiSpec;
use oas2proxy_common::{GeneratorError, Result};

/// Validate a decoded document
pub fn validate_document(spec: &OpenApiSpec) -> Result<()> {
    validate_version(spec)?;
    validate_info(spec)?;
    validate_servers(spec)?;
    validate_paths(spec)?;
    Ok(())
}

/// The document must declare `openapi: 3.x` or `swagger: 2.0`
fn validate_version(spec: &OpenApiSpec) -> Result<()> {
    match (spec.openapi.as_deref(), spec.swagger.as_deref()) {
        (Some(version), _) if version.starts_with("3.") => Ok(()),
        (Some(version), _) => Err(GeneratorError::Validation(format!(
            "unsupported openapi version '{}'",
            version
        ))),
        (None, Some("2.0")) => Ok(()),
        (None, Some(version)) => Err(GeneratorError::Validation(format!(
            "unsupported swagger version '{}'",
            version
        ))),
        (None, None) => Err(GeneratorError::Validation(
            "document declares neither 'openapi' nor 'swagger' version".to_string(),
        )),
    }
}

fn validate_info(spec: &OpenApiSpec) -> Result<()> {
    let info = spec.info.as_ref().ok_or_else(|| {
        GeneratorError::Validation("document missing required 'info' object".to_string())
    })?;

    if info.title.trim().is_empty() {
        return Err(GeneratorError::Validation(
            "info.title must not be empty".to_string(),
        ));
    }
    if info.version.trim().is_empty() {
        return Err(GeneratorError::Validation(
            "info.version must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_servers(spec: &OpenApiSpec) -> Result<()> {
    for (index, server) in spec.servers.iter().enumerate() {
        if server.url.trim().is_empty() {
            return Err(GeneratorError::Validation(format!(
                "servers[{}].url must not be empty",
                index
            )));
        }
    }
    Ok(())
}

/// Swagger 2.0 and OpenAPI 3.0.x require `responses` on every operation;
/// 3.1 made it optional
fn requires_responses(spec: &OpenApiSpec) -> bool {
    match spec.openapi.as_deref() {
        Some(version) => version == "3.0" || version.starts_with("3.0."),
        None => spec.is_swagger2(),
    }
}

fn validate_paths(spec: &OpenApiSpec) -> Result<()> {
    let responses_required = requires_responses(spec);

    for (path, item) in spec.path_items() {
        if !path.starts_with('/') {
            return Err(GeneratorError::Validation(format!(
                "path '{}' must begin with '/'",
                path
            )));
        }

        for (method, operation) in item.operations() {
            if responses_required && operation.responses.is_empty() {
                return Err(GeneratorError::Validation(format!(
                    "operation {} {} must declare at least one response",
                    method.as_str().to_uppercase(),
                    path
                )));
            }
        }
    }
    Ok(())
}

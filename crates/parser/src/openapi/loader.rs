//! OpenAPI document loader
//!
//! Reads a document from disk, from a URI, or from memory, validates it and
//! re-serializes it in the textual format it came in.

use super::types::OpenApiSpec;
use super::validation::validate_document;
use oas2proxy_common::{GeneratorError, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Textual format of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Infer the format from a file name or URI
    ///
    /// Any occurrence of `.yaml` or `.yml` selects YAML, so URIs with query
    /// strings (`spec.yaml?raw=true`) are still recognized. Everything else
    /// is treated as JSON.
    pub fn from_name(name: &str) -> Self {
        if name.contains(".yaml") || name.contains(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Json
        }
    }
}

/// A parsed and validated OpenAPI document
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    base_name: String,
    format: DocumentFormat,
    content: String,
    raw: serde_json::Value,
    spec: OpenApiSpec,
}

impl LoadedDocument {
    /// Final path segment of the source (file name or URL path tail)
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Format the document was read in, and is re-serialized to
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Re-serialized document text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Full canonical document tree
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Typed view of the document
    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }
}

/// Entry points for loading OpenAPI documents
pub struct OasLoader;

impl OasLoader {
    /// Load a document from a local file
    ///
    /// # Example
    /// ```rust,ignore
    /// let doc = OasLoader::load_from_file("petstore.yaml")?;
    /// assert_eq!(doc.base_name(), "petstore.yaml");
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<LoadedDocument> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading OpenAPI document");

        let content = fs::read_to_string(path)?;
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let format = DocumentFormat::from_name(&path.to_string_lossy());
        Self::load(&content, base_name, format)
    }

    /// Fetch a document from a remote URI
    pub fn load_from_uri(uri: &str) -> Result<LoadedDocument> {
        let url = Url::parse(uri)
            .map_err(|e| GeneratorError::Network(format!("Invalid URI {}: {}", uri, e)))?;
        debug!(%url, "fetching OpenAPI document");

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| GeneratorError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let response = client
            .get(url.clone())
            .send()
            .map_err(|e| GeneratorError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Network(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            )));
        }

        let content = response
            .text()
            .map_err(|e| GeneratorError::Network(format!("Failed to read {}: {}", url, e)))?;

        Self::load(&content, uri_base_name(&url), DocumentFormat::from_name(uri))
    }

    /// Load a document from memory; `name` drives format detection and
    /// becomes the base name
    pub fn load_from_str(content: &str, name: &str) -> Result<LoadedDocument> {
        let base_name = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name).to_string();
        Self::load(content, base_name, DocumentFormat::from_name(name))
    }

    fn load(content: &str, base_name: String, format: DocumentFormat) -> Result<LoadedDocument> {
        let raw: serde_json::Value = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                GeneratorError::Parse(format!("Failed to parse OpenAPI YAML: {}", e))
            })?,
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
                GeneratorError::Parse(format!("Failed to parse OpenAPI JSON: {}", e))
            })?,
        };

        if !raw.is_object() {
            return Err(GeneratorError::Parse(
                "OpenAPI document must be a mapping at the top level".to_string(),
            ));
        }

        let spec: OpenApiSpec = serde_json::from_value(raw.clone()).map_err(|e| {
            GeneratorError::Parse(format!("Document does not match OpenAPI shape: {}", e))
        })?;

        validate_document(&spec)?;

        let content = match format {
            DocumentFormat::Yaml => serde_yaml::to_string(&raw)?,
            DocumentFormat::Json => serde_json::to_string_pretty(&raw)?,
        };

        info!(
            document = %base_name,
            paths = spec.paths.len(),
            "loaded OpenAPI document"
        );

        Ok(LoadedDocument {
            base_name,
            format,
            content,
            raw,
            spec,
        })
    }
}

fn uri_base_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| url.host_str().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_JSON: &str = r#"{
        "openapi": "3.0.0",
        "info": {
            "title": "Test API",
            "version": "1.0.0"
        },
        "paths": {}
    }"#;

    #[test]
    fn test_format_from_name() {
        assert_eq!(DocumentFormat::from_name("api.yaml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_name("api.yml"), DocumentFormat::Yaml);
        assert_eq!(
            DocumentFormat::from_name("https://host/spec.yaml?raw=true"),
            DocumentFormat::Yaml
        );
        assert_eq!(DocumentFormat::from_name("api.json"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_name("openapi"), DocumentFormat::Json);
    }

    #[test]
    fn test_load_minimal_json() {
        let doc = OasLoader::load_from_str(MINIMAL_JSON, "specs/minimal.json").unwrap();
        assert_eq!(doc.base_name(), "minimal.json");
        assert_eq!(doc.format(), DocumentFormat::Json);
        assert_eq!(doc.spec().openapi.as_deref(), Some("3.0.0"));
        assert_eq!(doc.spec().info.as_ref().unwrap().title, "Test API");
    }

    #[test]
    fn test_scalar_document_is_parse_error() {
        let err = OasLoader::load_from_str("42", "number.json").unwrap_err();
        assert!(matches!(err, GeneratorError::Parse(_)));
    }

    #[test]
    fn test_uri_base_name() {
        let url = Url::parse("https://example.com/specs/v1/petstore.yaml?raw=1").unwrap();
        assert_eq!(uri_base_name(&url), "petstore.yaml");

        let url = Url::parse("https://example.com/specs/").unwrap();
        assert_eq!(uri_base_name(&url), "specs");
    }

    #[test]
    fn test_invalid_uri_is_network_error() {
        let err = OasLoader::load_from_uri("not a uri").unwrap_err();
        assert!(matches!(err, GeneratorError::Network(_)));
    }
}

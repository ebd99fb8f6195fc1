//! Proxy bundle generation for oas2proxy
//!
//! This crate turns a loaded OpenAPI document into a proxy bundle definition
//! and renders that definition to an `apiproxy/` directory tree.

mod assembler;
mod templates;

pub use assembler::{
    assemble, validation_policy_name, DEFAULT_ENDPOINT_NAME, VALIDATION_STEP_NAME,
};

use oas2proxy_common::{GeneratorError, ProxyBundle, ProxyBundleModel, Result};
use oas2proxy_parser::{LoadedDocument, OasLoader};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::debug;

/// Generation session
///
/// Holds the current OpenAPI document. Loading a new document replaces the
/// previous one; generating before any successful load fails with
/// [`GeneratorError::NotLoaded`].
#[derive(Debug, Default)]
pub struct ProxyGenerator {
    document: Option<LoadedDocument>,
}

impl ProxyGenerator {
    /// Create a session with no document loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session around an already loaded document
    pub fn with_document(document: LoadedDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// Load the current document from a local file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&LoadedDocument> {
        let document = OasLoader::load_from_file(path)?;
        Ok(self.document.insert(document))
    }

    /// Load the current document from a remote URI
    pub fn load_from_uri(&mut self, uri: &str) -> Result<&LoadedDocument> {
        let document = OasLoader::load_from_uri(uri)?;
        Ok(self.document.insert(document))
    }

    /// The current document, if one has been loaded
    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Generate a fresh [`ProxyBundle`] from the current document
    ///
    /// The document's base name is used as the bundled resource name.
    pub fn generate(&self, display_name: &str) -> Result<ProxyBundle> {
        let mut bundle = ProxyBundle::new();
        self.generate_into(display_name, &mut bundle)?;
        Ok(bundle)
    }

    /// Populate an arbitrary bundle model from the current document
    pub fn generate_into<M: ProxyBundleModel + ?Sized>(
        &self,
        display_name: &str,
        model: &mut M,
    ) -> Result<()> {
        let document = self.document.as_ref().ok_or(GeneratorError::NotLoaded)?;
        assemble(document, display_name, document.base_name(), model)
    }
}

/// Bundle writer
///
/// Renders a [`ProxyBundle`] into the on-disk layout:
/// - apiproxy/<name>.xml (bundle descriptor)
/// - apiproxy/proxies/<endpoint>.xml
/// - apiproxy/targets/<endpoint>.xml
/// - apiproxy/policies/<policy>.xml
/// - apiproxy/resources/<kind>/<resource>
pub struct BundleWriter {
    bundle: ProxyBundle,
    tera: Tera,
}

impl BundleWriter {
    /// Create a new writer for a populated bundle
    pub fn new(bundle: ProxyBundle) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { bundle, tera })
    }

    /// Write the bundle under `output_dir`, returning the `apiproxy` directory
    pub fn write_to_directory(&self, output_dir: &Path) -> Result<PathBuf> {
        check_file_name(&self.bundle.display_name)?;

        let root = output_dir.join("apiproxy");
        for dir in ["proxies", "targets", "policies", "resources"] {
            fs::create_dir_all(root.join(dir)).map_err(|e| {
                GeneratorError::Generation(format!("Failed to create {} directory: {}", dir, e))
            })?;
        }

        self.write_descriptor(&root)?;
        self.write_proxy_endpoint(&root)?;
        self.write_target_endpoint(&root)?;
        self.write_policies(&root)?;
        self.write_resources(&root)?;

        Ok(root)
    }

    /// Generate apiproxy/<name>.xml
    fn write_descriptor(&self, root: &Path) -> Result<()> {
        let context = self.create_context();
        let rendered = self.render("apiproxy", &context)?;
        write_file(
            &root.join(format!("{}.xml", self.bundle.display_name)),
            rendered,
        )
    }

    fn write_proxy_endpoint(&self, root: &Path) -> Result<()> {
        let endpoint = self.bundle.proxy_endpoint.as_ref().ok_or_else(|| {
            GeneratorError::Generation("bundle has no proxy endpoint".to_string())
        })?;
        check_file_name(&endpoint.name)?;

        let target_name = self
            .bundle
            .target_endpoint
            .as_ref()
            .map(|target| target.name.as_str())
            .unwrap_or(DEFAULT_ENDPOINT_NAME);

        let mut context = self.create_context();
        context.insert("endpoint", endpoint);
        context.insert("target_name", target_name);

        let rendered = self.render("proxy_endpoint", &context)?;
        write_file(
            &root.join("proxies").join(format!("{}.xml", endpoint.name)),
            rendered,
        )
    }

    fn write_target_endpoint(&self, root: &Path) -> Result<()> {
        let target = self.bundle.target_endpoint.as_ref().ok_or_else(|| {
            GeneratorError::Generation("bundle has no target endpoint".to_string())
        })?;
        check_file_name(&target.name)?;

        let mut context = self.create_context();
        context.insert("target", target);

        let rendered = self.render("target_endpoint", &context)?;
        write_file(
            &root.join("targets").join(format!("{}.xml", target.name)),
            rendered,
        )
    }

    /// Generate one OASValidation policy per registered policy name
    fn write_policies(&self, root: &Path) -> Result<()> {
        if self.bundle.policies.is_empty() {
            return Ok(());
        }

        let resource = self
            .bundle
            .resources
            .iter()
            .find(|resource| resource.kind == "oas")
            .ok_or_else(|| {
                GeneratorError::Generation(
                    "validation policy requires an OpenAPI resource".to_string(),
                )
            })?;

        for policy in &self.bundle.policies {
            check_file_name(policy)?;

            let mut context = self.create_context();
            context.insert("policy", policy);
            context.insert("resource", &resource.reference());

            let rendered = self.render("oas_validation", &context)?;
            write_file(
                &root.join("policies").join(format!("{}.xml", policy)),
                rendered,
            )?;
        }

        Ok(())
    }

    fn write_resources(&self, root: &Path) -> Result<()> {
        for resource in &self.bundle.resources {
            check_file_name(&resource.kind)?;
            check_file_name(&resource.name)?;

            let dir = root.join("resources").join(&resource.kind);
            fs::create_dir_all(&dir).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create resources/{} directory: {}",
                    resource.kind, e
                ))
            })?;
            write_file(&dir.join(&resource.name), &resource.content)?;
        }
        Ok(())
    }

    fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {:?}", e)))
    }

    /// Create template context from the bundle
    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("bundle", &self.bundle);
        context
    }
}

/// Generate a bundle from a document file and write it (convenience function)
pub fn generate_bundle(spec_path: &Path, display_name: &str, output_dir: &Path) -> Result<PathBuf> {
    let mut generator = ProxyGenerator::new();
    generator.load_from_file(spec_path)?;
    let bundle = generator.generate(display_name)?;
    BundleWriter::new(bundle)?.write_to_directory(output_dir)
}

fn check_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
        return Err(GeneratorError::Generation(format!(
            "'{}' cannot be used as a bundle file name",
            name
        )));
    }
    Ok(())
}

fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    debug!(path = %path.display(), "writing bundle file");
    fs::write(path, content).map_err(|e| {
        GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e))
    })
}

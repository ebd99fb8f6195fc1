//! OpenAPI 2.0 / 3.x document handling
//!
//! Loads OpenAPI documents (Swagger 2.0 or OpenAPI 3.x, JSON or YAML) from
//! disk or over HTTP, validates them, and exposes a typed view alongside the
//! canonical document tree.
//!
//! ## Usage
//! ```rust,ignore
//! use oas2proxy_parser::openapi::OasLoader;
//!
//! let doc = OasLoader::load_from_file("petstore.yaml")?;
//! for (path, item) in doc.spec().path_items() {
//!     println!("{} declares {} operations", path, item.operations().count());
//! }
//! ```

mod loader;
mod types;
mod validation;

pub use loader::{DocumentFormat, LoadedDocument, OasLoader};
pub use types::*;
pub use validation::validate_document;

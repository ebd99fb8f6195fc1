//! OpenAPI parsing for oas2proxy
//!
//! This crate turns OpenAPI documents into the pieces a proxy bundle is built
//! from:
//!
//! - [`openapi::OasLoader`] loads, validates and re-serializes the document
//! - [`resolve_backend`] derives the upstream target and base path
//! - [`OperationMapper`] extracts per-method operation identifiers
//! - [`wildcard_path`] turns path templates into routing patterns

mod endpoint;
pub mod openapi;
mod operation_mapper;
mod wildcard;

pub use endpoint::{resolve_backend, BackendEndpoint};
pub use openapi::{DocumentFormat, LoadedDocument, OasLoader};
pub use operation_mapper::{OperationDetail, OperationMapper};
pub use wildcard::wildcard_path;

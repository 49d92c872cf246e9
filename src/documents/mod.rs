//! Searchable document model
//!
//! Defines what a record must provide to be indexed, the per-type search
//! configuration, and the registry used to resolve `object_class` values
//! back to types.

mod config;
mod model;
mod registry;

pub use config::*;
pub use model::*;
pub use registry::TypeRegistry;

/// Field naming the type that owns an indexed document
pub const OBJECT_CLASS_FIELD: &str = "object_class";

/// Field holding the unprefixed primary key when ids are class-prefixed
pub const ORIGINAL_ID_FIELD: &str = "original_document_id";

/// Document id field in the index
pub const ID_FIELD: &str = "id";

//! Index access and maintenance
//!
//! Resolves index names per type, binds them to the admin or search client,
//! keeps filterable/sortable settings in line with each type's configuration
//! and writes documents.

mod accessor;
mod attributes;
mod writer;

pub use accessor::*;
pub use attributes::*;
pub use writer::*;

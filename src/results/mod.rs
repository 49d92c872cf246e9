//! Result types and assembly of the final search response
//!
//! This module defines the match descriptors, paging metadata and the
//! response shape handed back to callers.

mod container;
mod types;

pub use container::{assemble, SearchResults};
pub use types::*;

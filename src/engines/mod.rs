//! Search engine module
//!
//! Defines the narrow `SearchEngine` interface the pipeline consumes and the
//! Meilisearch implementation of it.

mod meilisearch;
mod traits;

pub use meilisearch::Meilisearch;
pub use traits::*;

//! Search orchestration module
//!
//! Builds query options, runs the query, normalizes hits, hydrates records
//! from the primary store and assembles the response.

mod executor;
mod hydrator;
mod models;
mod normalizer;

pub use executor::{filter_by_class, prepare_options, raw_search, Search};
pub use hydrator::{hydrate, HydrationReport, RecordStore};
pub use models::*;
pub use normalizer::{demangle_id, normalize_hits, NormalizedHits, TypeGroup};

//! record-search: full-text search for application records backed by Meilisearch
//!
//! Records of registered [`Searchable`] types are written to engine indexes
//! as flat documents. A search queries one type's index, normalizes the hits,
//! loads the matching records from the primary store in one batched fetch per
//! type and hands them back in relevance order.

pub mod config;
pub mod credentials;
pub mod documents;
pub mod engines;
pub mod error;
pub mod index;
pub mod network;
pub mod results;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Settings;
pub use credentials::{CredentialResolver, CredentialSet, SearchClients};
pub use documents::{IndexableDocument, Record, SearchConfig, Searchable, SearchableType, TypeRegistry};
pub use engines::{Meilisearch, SearchEngine};
pub use error::{Result, SearchError};
pub use index::Indexer;
pub use results::SearchResults;
pub use search::{RecordStore, Search, SearchOptions, SearchRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

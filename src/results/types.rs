//! Result type definitions

use crate::engines::SearchResponse;
use serde::{Deserialize, Serialize};

/// Keys copied from the engine response into the metadata block
pub const RESPONSE_METADATA_KEYS: &[&str] = &[
    "query",
    "processingTimeMs",
    "limit",
    "offset",
    "estimatedTotalHits",
    "nbHits",
];

/// One hit, reduced to what hydration needs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchDescriptor {
    /// Document id in the index, possibly class-prefixed
    pub id: String,
    /// `object_class` of the hit
    pub owning_class: String,
    /// Primary key in the record store
    pub original_id: String,
}

/// Paging metadata, copied from the engine response as sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_total_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_hits: Option<u64>,
}

impl SearchMetadata {
    pub fn from_response(response: &SearchResponse) -> Self {
        Self {
            query: response.query.clone(),
            processing_time_ms: response.processing_time_ms,
            limit: response.limit,
            offset: response.offset,
            estimated_total_hits: response.estimated_total_hits,
            nb_hits: response.nb_hits,
        }
    }
}

/// Either bare primary keys or hydrated records, in relevance order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Matches<R> {
    Ids(Vec<String>),
    Records(Vec<R>),
}

impl<R> Matches<R> {
    pub fn len(&self) -> usize {
        match self {
            Matches::Ids(ids) => ids.len(),
            Matches::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Option<&[String]> {
        match self {
            Matches::Ids(ids) => Some(ids),
            Matches::Records(_) => None,
        }
    }

    pub fn records(&self) -> Option<&[R]> {
        match self {
            Matches::Records(records) => Some(records),
            Matches::Ids(_) => None,
        }
    }
}

/// A type group whose records could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFailure {
    pub object_class: String,
    pub ids: Vec<String>,
    pub error: String,
}

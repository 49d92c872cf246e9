//! Final search response

use super::types::*;
use crate::engines::SearchResponse;
use serde::Serialize;

/// What a search hands back: matches in relevance order, optional paging
/// metadata, and any type groups that failed to hydrate.
///
/// Serializes as `{"matches": [...], "search_result_metadata": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults<R> {
    pub matches: Matches<R>,
    #[serde(
        rename = "search_result_metadata",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<SearchMetadata>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_groups: Vec<GroupFailure>,
}

impl<R> SearchResults<R> {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// True when every hit's type group hydrated
    pub fn is_complete(&self) -> bool {
        self.failed_groups.is_empty()
    }
}

/// Combine matches with metadata taken from the raw engine response
pub fn assemble<R>(
    matches: Matches<R>,
    response: &SearchResponse,
    include_metadata: bool,
    failed_groups: Vec<GroupFailure>,
) -> SearchResults<R> {
    SearchResults {
        matches,
        metadata: include_metadata.then(|| SearchMetadata::from_response(response)),
        failed_groups,
    }
}

//! Search execution: option preparation, the raw query, and the full
//! query -> normalize -> hydrate -> assemble pipeline

use super::hydrator::{hydrate, RecordStore};
use super::models::{Filter, SearchOptions, SearchRequest};
use super::normalizer::normalize_hits;
use crate::credentials::SearchClients;
use crate::documents::{SearchableType, TypeRegistry, OBJECT_CLASS_FIELD, ORIGINAL_ID_FIELD};
use crate::engines::SearchResponse;
use crate::error::Result;
use crate::index::{searchable_index, IndexHandle};
use crate::results::{assemble, Matches, SearchResults};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Make sure the attributes the pipeline needs come back with every hit.
///
/// Always the primary search key; `object_class` unless `ids_only`; and
/// `original_document_id` for types with class-prefixed ids. Entries the
/// caller already listed are kept.
pub fn prepare_options(options: &mut SearchOptions, ty: &SearchableType, ids_only: bool) {
    options.ensure_retrieved(ty.primary_search_key());
    if !ids_only {
        options.ensure_retrieved(OBJECT_CLASS_FIELD);
    }
    if ty.has_class_prefixed_ids() {
        options.ensure_retrieved(ORIGINAL_ID_FIELD);
    }
}

/// Restrict hits to `ty`: `object_class = <Type>` is appended to an array
/// filter, AND-ed onto a string filter, or set as a one-element array.
pub fn filter_by_class(options: &mut SearchOptions, ty: &SearchableType) {
    let clause = format!("{} = {}", OBJECT_CLASS_FIELD, ty.object_class());
    match options.filter {
        Some(ref mut filter) => filter.and(&clause),
        None => options.filter = Some(Filter::Clauses(vec![clause.into()])),
    }
}

/// Issue exactly one search call and return the engine's response untouched
pub async fn raw_search(
    index: &IndexHandle,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchResponse> {
    index.search(query, options).await
}

/// Search executor tying the engine clients, the type registry and the
/// record store together
pub struct Search<S> {
    /// Engine clients
    clients: SearchClients,
    /// Types hits may resolve to
    registry: Arc<TypeRegistry>,
    /// Primary store used for hydration
    store: Arc<S>,
}

impl<S: RecordStore> Search<S> {
    /// Create a new search executor
    pub fn new(clients: SearchClients, registry: Arc<TypeRegistry>, store: Arc<S>) -> Self {
        Self {
            clients,
            registry,
            store,
        }
    }

    pub fn clients(&self) -> &SearchClients {
        &self.clients
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Query the index of `ty` with `options` as given
    pub async fn raw_search(
        &self,
        ty: &SearchableType,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let index = searchable_index(&self.clients, ty)?;
        raw_search(&index, query, options).await
    }

    /// Run `request` through `ty`'s index and return matches in relevance order.
    ///
    /// Engine errors are returned as-is. Stale hits and type groups that fail
    /// to hydrate are not errors: the former are dropped, the latter are
    /// listed in [`SearchResults::failed_groups`].
    pub async fn search(
        &self,
        ty: &SearchableType,
        request: &SearchRequest,
    ) -> Result<SearchResults<S::Record>> {
        let start = Instant::now();
        let mut options = request
            .options
            .clone()
            .unwrap_or_else(|| ty.search_options());
        prepare_options(&mut options, ty, request.ids_only);
        if request.filtered_by_class {
            filter_by_class(&mut options, ty);
        }

        let response = self.raw_search(ty, &request.query, &options).await?;
        let normalized = normalize_hits(&response.hits, ty);

        let results = if request.ids_only {
            assemble(
                Matches::Ids(normalized.original_ids()),
                &response,
                request.include_metadata,
                Vec::new(),
            )
        } else if normalized.is_empty() {
            assemble(
                Matches::Records(Vec::new()),
                &response,
                request.include_metadata,
                Vec::new(),
            )
        } else {
            let report = hydrate(self.store.as_ref(), &self.registry, &normalized).await;
            assemble(
                Matches::Records(report.records),
                &response,
                request.include_metadata,
                report.failed_groups,
            )
        };

        debug!(
            "Search '{}' on {} returned {} hit(s), {} match(es) in {:?}",
            request.query,
            ty.object_class(),
            response.hits.len(),
            results.len(),
            start.elapsed()
        );

        Ok(results)
    }
}

//! Loads records for normalized hits, one batched fetch per owning type

use super::normalizer::{NormalizedHits, TypeGroup};
use crate::documents::{Record, SearchableType, TypeRegistry};
use crate::error::SearchError;
use crate::results::GroupFailure;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The primary data store, reduced to the one read the pipeline needs
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Record: Record;

    /// Records of `ty` whose primary key is in `keys`, in any order.
    /// Keys without a record are simply absent from the result.
    async fn fetch_by_primary_keys(
        &self,
        ty: &SearchableType,
        keys: &[String],
    ) -> anyhow::Result<Vec<Self::Record>>;
}

/// Hydrated records in relevance order, plus the groups that failed
#[derive(Debug)]
pub struct HydrationReport<R> {
    pub records: Vec<R>,
    pub failed_groups: Vec<GroupFailure>,
}

/// Fetch every type group once (concurrently), then walk the descriptors in
/// order and keep the records that were found.
///
/// A group whose type is not registered, or whose fetch fails, is reported in
/// `failed_groups` without affecting the others. Hits whose record no longer
/// exists are dropped.
pub async fn hydrate<S: RecordStore>(
    store: &S,
    registry: &TypeRegistry,
    hits: &NormalizedHits,
) -> HydrationReport<S::Record> {
    let fetches = hits
        .groups
        .iter()
        .map(|group| async move { (group, fetch_group(store, registry, group).await) });
    let fetched = join_all(fetches).await;

    let mut by_class: HashMap<&str, HashMap<String, S::Record>> = HashMap::new();
    let mut failed_groups = Vec::new();

    for (group, result) in fetched {
        match result {
            Ok(records) => {
                let lookup = records
                    .into_iter()
                    .map(|record| (record.primary_key(), record))
                    .collect();
                by_class.insert(group.object_class.as_str(), lookup);
            }
            Err(e) => {
                warn!(
                    "Failed to load {} {} record(s): {}",
                    group.ids.len(),
                    group.object_class,
                    e
                );
                failed_groups.push(GroupFailure {
                    object_class: group.object_class.clone(),
                    ids: group.ids.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let mut records = Vec::with_capacity(hits.descriptors.len());
    for descriptor in &hits.descriptors {
        let Some(lookup) = by_class.get_mut(descriptor.owning_class.as_str()) else {
            continue;
        };
        match lookup.remove(&descriptor.original_id) {
            Some(record) => records.push(record),
            None => debug!(
                "Dropping stale hit {} ({} {} not in store)",
                descriptor.id, descriptor.owning_class, descriptor.original_id
            ),
        }
    }

    HydrationReport {
        records,
        failed_groups,
    }
}

async fn fetch_group<S: RecordStore>(
    store: &S,
    registry: &TypeRegistry,
    group: &TypeGroup,
) -> Result<Vec<S::Record>, SearchError> {
    let ty = registry
        .get(&group.object_class)
        .ok_or_else(|| SearchError::UnknownType(group.object_class.clone()))?;
    debug!("Fetching {} {} record(s)", group.ids.len(), group.object_class);
    Ok(store.fetch_by_primary_keys(ty, &group.ids).await?)
}

//! Turns raw hits into ordered match descriptors

use crate::documents::{stringify, SearchableType, OBJECT_CLASS_FIELD, ORIGINAL_ID_FIELD};
use crate::engines::Hit;
use crate::results::MatchDescriptor;
use std::collections::HashMap;
use tracing::warn;

/// Original ids of one owning type, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroup {
    pub object_class: String,
    pub ids: Vec<String>,
}

/// Hits in engine order plus the same ids grouped per owning type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHits {
    pub descriptors: Vec<MatchDescriptor>,
    pub groups: Vec<TypeGroup>,
}

impl NormalizedHits {
    /// Original ids in relevance order
    pub fn original_ids(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .map(|d| d.original_id.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Strip one leading `<token>_` from a class-prefixed id.
///
/// Lossy when the owning type's name contains an underscore: `Foo_Bar_1`
/// yields `Bar_1`. Ids without an underscore come back unchanged.
pub fn demangle_id(id: &str) -> &str {
    match id.split_once('_') {
        Some((_, rest)) => rest,
        None => id,
    }
}

/// Normalize `hits` returned for a search issued through `ty`.
///
/// Order is preserved exactly. Hits without `object_class` are attributed to
/// `ty`; hits without the primary search key are skipped.
pub fn normalize_hits(hits: &[Hit], ty: &SearchableType) -> NormalizedHits {
    let pk = ty.primary_search_key();
    let mut normalized = NormalizedHits::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for hit in hits {
        let id = match hit.get(pk) {
            Some(value) if !value.is_null() => stringify(value),
            _ => {
                warn!("Skipping hit without `{}` field", pk);
                continue;
            }
        };
        let owning_class = hit
            .get(OBJECT_CLASS_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| ty.object_class())
            .to_string();

        let original_id = if !ty.has_class_prefixed_ids() {
            id.clone()
        } else if let Some(original) = hit.get(ORIGINAL_ID_FIELD).filter(|v| !v.is_null()) {
            stringify(original)
        } else {
            demangle_id(&id).to_string()
        };

        let slot = *group_index
            .entry(owning_class.clone())
            .or_insert_with(|| {
                normalized.groups.push(TypeGroup {
                    object_class: owning_class.clone(),
                    ids: Vec::new(),
                });
                normalized.groups.len() - 1
            });
        normalized.groups[slot].ids.push(original_id.clone());

        normalized.descriptors.push(MatchDescriptor {
            id,
            owning_class,
            original_id,
        });
    }

    normalized
}

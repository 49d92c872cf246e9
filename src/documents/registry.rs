//! Registry of searchable types, keyed by `object_class`

use super::{Searchable, SearchableType};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves `object_class` values found in hits back to registered types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<SearchableType>>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a [`Searchable`] type with its own configuration
    pub fn register<T: Searchable>(&mut self) -> Arc<SearchableType> {
        self.register_type(SearchableType::of::<T>())
    }

    /// Register an explicit type descriptor, replacing any previous one
    pub fn register_type(&mut self, ty: SearchableType) -> Arc<SearchableType> {
        let ty = Arc::new(ty);
        self.types
            .insert(ty.object_class().to_string(), ty.clone());
        ty
    }

    /// Get a type by its `object_class`
    pub fn get(&self, object_class: &str) -> Option<&Arc<SearchableType>> {
        self.types.get(object_class)
    }

    /// Check if a type is registered
    pub fn contains(&self, object_class: &str) -> bool {
        self.types.contains_key(object_class)
    }

    /// Types sharing the given index
    pub fn sharing_index(&self, index_uid: &str) -> Vec<&Arc<SearchableType>> {
        self.types
            .values()
            .filter(|ty| crate::index::search_index_name(ty).ok().as_deref() == Some(index_uid))
            .collect()
    }

    /// Get all registered type names
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

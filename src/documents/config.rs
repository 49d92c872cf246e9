//! Per-type search configuration

use crate::search::SearchOptions;
use serde::{Deserialize, Serialize};

/// Ranking rules the engine uses unless a type overrides them
pub const DEFAULT_RANKING_RULES: &[&str] =
    &["words", "typo", "proximity", "attribute", "sort", "exactness"];

/// Primary search key used when a type doesn't configure one
pub const DEFAULT_PRIMARY_SEARCH_KEY: &str = "id";

/// Explicit search configuration for one type. Every field is optional;
/// unset fields fall back to defaults when resolved into a [`SearchableType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Index name; set the same value on several types to share an index
    pub index_name: Option<String>,
    /// Attribute guaranteed unique per record (default `id`)
    pub primary_search_key: Option<String>,
    /// Store ids as `<TypeName>_<primary key>`, for shared indexes
    pub class_prefixed_ids: bool,
    /// Attributes copied into the index (default: all declared attributes)
    pub searchable_attributes: Option<Vec<String>>,
    pub filterable_attributes: Option<Vec<String>>,
    pub sortable_attributes: Option<Vec<String>>,
    /// Only `object_class` stays filterable when set
    pub unfilterable: bool,
    pub ranking_rules: Option<Vec<String>>,
    /// Default options for searches issued through this type
    pub search_options: Option<SearchOptions>,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn primary_search_key(mut self, key: impl Into<String>) -> Self {
        self.primary_search_key = Some(key.into());
        self
    }

    pub fn class_prefixed_ids(mut self, enabled: bool) -> Self {
        self.class_prefixed_ids = enabled;
        self
    }

    pub fn searchable_attributes<S: Into<String>>(mut self, attrs: impl IntoIterator<Item = S>) -> Self {
        self.searchable_attributes = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    pub fn filterable_attributes<S: Into<String>>(mut self, attrs: impl IntoIterator<Item = S>) -> Self {
        self.filterable_attributes = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    pub fn sortable_attributes<S: Into<String>>(mut self, attrs: impl IntoIterator<Item = S>) -> Self {
        self.sortable_attributes = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    pub fn unfilterable(mut self, unfilterable: bool) -> Self {
        self.unfilterable = unfilterable;
        self
    }

    pub fn ranking_rules<S: Into<String>>(mut self, rules: impl IntoIterator<Item = S>) -> Self {
        self.ranking_rules = Some(rules.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = Some(options);
        self
    }
}

/// A registered type: its name, declared attributes and configuration,
/// with defaults filled in on access.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchableType {
    object_class: String,
    attribute_names: Vec<String>,
    config: SearchConfig,
}

impl SearchableType {
    pub fn new<S: Into<String>>(
        object_class: impl Into<String>,
        attribute_names: impl IntoIterator<Item = S>,
        config: SearchConfig,
    ) -> Self {
        Self {
            object_class: object_class.into(),
            attribute_names: attribute_names.into_iter().map(Into::into).collect(),
            config,
        }
    }

    /// Build the descriptor of a [`super::Searchable`] type
    pub fn of<T: super::Searchable>() -> Self {
        Self::new(T::object_class(), T::attribute_names(), T::search_config())
    }

    /// Value written to `object_class`
    pub fn object_class(&self) -> &str {
        &self.object_class
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    pub fn primary_search_key(&self) -> &str {
        self.config
            .primary_search_key
            .as_deref()
            .unwrap_or(DEFAULT_PRIMARY_SEARCH_KEY)
    }

    pub fn has_class_prefixed_ids(&self) -> bool {
        self.config.class_prefixed_ids
    }

    pub fn is_unfilterable(&self) -> bool {
        self.config.unfilterable
    }

    pub fn searchable_attributes(&self) -> Vec<String> {
        self.config
            .searchable_attributes
            .clone()
            .unwrap_or_else(|| self.attribute_names.clone())
    }

    pub fn ranking_rules(&self) -> Vec<String> {
        self.config.ranking_rules.clone().unwrap_or_else(|| {
            DEFAULT_RANKING_RULES
                .iter()
                .map(|r| r.to_string())
                .collect()
        })
    }

    pub fn search_options(&self) -> SearchOptions {
        self.config.search_options.clone().unwrap_or_default()
    }
}

//! Search options and request flags

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A filter expression: either one string or an array of clauses
/// (clauses may themselves be arrays, meaning OR).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    Expression(String),
    Clauses(Vec<Value>),
}

impl Filter {
    /// Add a clause that must also hold
    pub fn and(&mut self, clause: &str) {
        match self {
            Filter::Expression(expr) if expr.trim().is_empty() => *expr = clause.to_string(),
            Filter::Expression(expr) => {
                expr.push_str(" AND ");
                expr.push_str(clause);
            }
            Filter::Clauses(clauses) => clauses.push(Value::String(clause.to_string())),
        }
    }
}

/// Options sent along with a query. Parameters this type doesn't name are
/// kept in `extra` and forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_attributes_to_retrieve<S: Into<String>>(
        mut self,
        attrs: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes_to_retrieve = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    /// Set any other engine parameter, e.g. `attributesToHighlight`
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Make sure `attribute` is retrieved, keeping what the caller asked for
    pub fn ensure_retrieved(&mut self, attribute: &str) {
        let attrs = self.attributes_to_retrieve.get_or_insert_with(Vec::new);
        if !attrs.iter().any(|a| a == attribute) {
            attrs.push(attribute.to_string());
        }
    }
}

/// How a search should be run and shaped
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The query string
    pub query: String,
    /// Options; `None` uses the type's configured defaults
    pub options: Option<SearchOptions>,
    /// Return primary keys instead of loading records
    pub ids_only: bool,
    /// Restrict hits to the searching type (`object_class = <Type>`)
    pub filtered_by_class: bool,
    /// Attach the engine's paging metadata
    pub include_metadata: bool,
}

impl SearchRequest {
    /// Create a request with default flags
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            options: None,
            ids_only: false,
            filtered_by_class: true,
            include_metadata: true,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn ids_only(mut self, ids_only: bool) -> Self {
        self.ids_only = ids_only;
        self
    }

    pub fn filtered_by_class(mut self, filtered: bool) -> Self {
        self.filtered_by_class = filtered;
        self
    }

    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }
}

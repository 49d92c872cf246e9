//! Records and the documents built from them

use super::{SearchConfig, SearchableType, ID_FIELD, OBJECT_CLASS_FIELD, ORIGINAL_ID_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record owned by the primary store
pub trait Record: Send + Sync {
    /// Value of the record's primary search key, as a string
    fn primary_key(&self) -> String;
}

/// Capability every indexable entity type implements
pub trait Searchable: Record {
    /// Type name stored in `object_class`
    fn object_class() -> &'static str;

    /// Every attribute the type declares; the default searchable set
    fn attribute_names() -> Vec<String>;

    /// Attribute values of this record, keyed by attribute name
    fn attributes(&self) -> Map<String, Value>;

    fn search_config() -> SearchConfig {
        SearchConfig::default()
    }

    fn searchable_type() -> SearchableType
    where
        Self: Sized,
    {
        SearchableType::of::<Self>()
    }

    fn to_indexable_document(&self) -> IndexableDocument
    where
        Self: Sized,
    {
        IndexableDocument::build(&Self::searchable_type(), self.primary_key(), self.attributes())
    }
}

/// Render an id-like value as a string; strings are taken as-is
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Field name to scalar value mapping submitted to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexableDocument(Map<String, Value>);

impl IndexableDocument {
    /// Build the document for a record of `ty`.
    ///
    /// Only searchable attributes are copied. A `_id` attribute becomes `id`;
    /// without either, `id` is the primary key. Generated ids get the
    /// `<object_class>_` prefix when the type uses class-prefixed ids, in which
    /// case `original_document_id` carries the bare primary key.
    pub fn build(ty: &SearchableType, primary_key: String, attributes: Map<String, Value>) -> Self {
        let mut doc = Map::new();
        for name in ty.searchable_attributes() {
            if let Some(value) = attributes.get(&name) {
                doc.insert(name, value.clone());
            }
        }

        let prefix = |id: String| {
            if ty.has_class_prefixed_ids() {
                format!("{}_{}", ty.object_class(), id)
            } else {
                id
            }
        };

        if doc.contains_key("_id") && !doc.contains_key(ID_FIELD) {
            let id = doc.remove("_id").map(|v| stringify(&v)).unwrap_or_default();
            doc.insert(ID_FIELD.to_string(), Value::String(prefix(id)));
        } else if let Some(id) = doc.get(ID_FIELD) {
            if !id.is_string() {
                let id = stringify(id);
                doc.insert(ID_FIELD.to_string(), Value::String(id));
            }
        } else {
            doc.insert(ID_FIELD.to_string(), Value::String(prefix(primary_key.clone())));
        }

        if !doc.contains_key(OBJECT_CLASS_FIELD) {
            doc.insert(
                OBJECT_CLASS_FIELD.to_string(),
                Value::String(ty.object_class().to_string()),
            );
        }
        if ty.has_class_prefixed_ids() {
            doc.insert(ORIGINAL_ID_FIELD.to_string(), Value::String(primary_key));
        }

        Self(doc)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn object_class(&self) -> Option<&str> {
        self.0.get(OBJECT_CLASS_FIELD).and_then(Value::as_str)
    }

    pub fn original_document_id(&self) -> Option<&str> {
        self.0.get(ORIGINAL_ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for IndexableDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

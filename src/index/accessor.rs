//! Index naming and client binding

use crate::credentials::SearchClients;
use crate::documents::{IndexableDocument, SearchableType};
use crate::engines::{IndexStats, SearchEngine, SearchResponse, TaskInfo};
use crate::error::{Result, SearchError};
use crate::search::SearchOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"));
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// Lowercase snake form of a type name: `BasicTestModel` -> `basic_test_model`,
/// `HTMLPage` -> `html_page`, `Admin::User` -> `admin_user`
pub fn underscore(name: &str) -> String {
    let name = name.replace("::", "_");
    let name = ACRONYM_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.replace('-', "_").to_lowercase()
}

/// Index name for `ty`: the configured name, or the type name in snake case
pub fn search_index_name(ty: &SearchableType) -> Result<String> {
    let name = match ty.config().index_name {
        Some(ref name) => name.trim().to_string(),
        None => underscore(ty.object_class()),
    };
    if name.is_empty() {
        return Err(SearchError::InvalidIndexName(ty.object_class().to_string()));
    }
    Ok(name)
}

/// Index of `ty` bound to the admin client
pub fn administratable_index(clients: &SearchClients, ty: &SearchableType) -> Result<IndexHandle> {
    let engine = clients.require_admin()?.clone();
    IndexHandle::for_type(ty, engine)
}

/// Index of `ty` bound to the search client
pub fn searchable_index(clients: &SearchClients, ty: &SearchableType) -> Result<IndexHandle> {
    let engine = clients.require_search()?.clone();
    IndexHandle::for_type(ty, engine)
}

/// An index name bound to one engine client
#[derive(Clone)]
pub struct IndexHandle {
    uid: String,
    primary_key: String,
    engine: Arc<dyn SearchEngine>,
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("uid", &self.uid)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

impl IndexHandle {
    pub fn new(
        uid: impl Into<String>,
        primary_key: impl Into<String>,
        engine: Arc<dyn SearchEngine>,
    ) -> Self {
        Self {
            uid: uid.into(),
            primary_key: primary_key.into(),
            engine,
        }
    }

    pub fn for_type(ty: &SearchableType, engine: Arc<dyn SearchEngine>) -> Result<Self> {
        Ok(Self::new(search_index_name(ty)?, ty.primary_search_key(), engine))
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn engine(&self) -> &Arc<dyn SearchEngine> {
        &self.engine
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        self.engine.search(&self.uid, query, options).await
    }

    /// Block until `task` finishes
    pub async fn wait(&self, task: TaskInfo) -> Result<TaskInfo> {
        self.engine.wait_for_task(task.uid).await
    }

    pub async fn add_documents(&self, documents: &[IndexableDocument]) -> Result<TaskInfo> {
        self.engine
            .add_documents(&self.uid, documents, Some(&self.primary_key))
            .await
    }

    pub async fn add_documents_and_wait(&self, documents: &[IndexableDocument]) -> Result<TaskInfo> {
        let task = self.add_documents(documents).await?;
        self.wait(task).await
    }

    pub async fn update_documents(&self, documents: &[IndexableDocument]) -> Result<TaskInfo> {
        self.engine
            .update_documents(&self.uid, documents, Some(&self.primary_key))
            .await
    }

    pub async fn update_documents_and_wait(
        &self,
        documents: &[IndexableDocument],
    ) -> Result<TaskInfo> {
        let task = self.update_documents(documents).await?;
        self.wait(task).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<TaskInfo> {
        self.engine.delete_document(&self.uid, id).await
    }

    pub async fn delete_document_and_wait(&self, id: &str) -> Result<TaskInfo> {
        let task = self.delete_document(id).await?;
        self.wait(task).await
    }

    pub async fn delete_all_documents(&self) -> Result<TaskInfo> {
        self.engine.delete_all_documents(&self.uid).await
    }

    pub async fn delete_all_documents_and_wait(&self) -> Result<TaskInfo> {
        let task = self.delete_all_documents().await?;
        self.wait(task).await
    }

    pub async fn update_filterable_attributes(&self, attributes: &[String]) -> Result<TaskInfo> {
        self.engine
            .update_filterable_attributes(&self.uid, attributes)
            .await
    }

    pub async fn update_sortable_attributes(&self, attributes: &[String]) -> Result<TaskInfo> {
        self.engine
            .update_sortable_attributes(&self.uid, attributes)
            .await
    }

    pub async fn update_ranking_rules(&self, rules: &[String]) -> Result<TaskInfo> {
        self.engine.update_ranking_rules(&self.uid, rules).await
    }

    pub async fn get_filterable_attributes(&self) -> Result<Vec<String>> {
        self.engine.get_filterable_attributes(&self.uid).await
    }

    /// Create the index with this handle's primary key
    pub async fn create(&self) -> Result<TaskInfo> {
        self.engine
            .create_index(&self.uid, Some(&self.primary_key))
            .await
    }

    /// Delete the index and every document in it
    pub async fn delete(&self) -> Result<TaskInfo> {
        self.engine.delete_index(&self.uid).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.engine.index_stats(&self.uid).await
    }
}

//! Engine trait and wire types

use crate::documents::IndexableDocument;
use crate::error::{Result, SearchError};
use crate::search::SearchOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound for the delay between two task status polls
pub const MAX_TASK_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lower bound for the delay between two task status polls
pub const MIN_TASK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A raw hit as returned by the engine
pub type Hit = Map<String, Value>;

/// Response of a search call, kept as the engine sent it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Matching documents in relevance order
    #[serde(default)]
    pub hits: Vec<Hit>,
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
    /// Only sent by older engine versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_hits: Option<u64>,
    /// Anything else the engine included (facets, paging, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle state of an engine task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

/// Failure details attached to a failed task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskError {
    pub message: String,
    #[serde(default)]
    pub code: String,
}

/// Handle for an asynchronous engine operation.
///
/// Enqueue calls answer with `taskUid`, task lookups with `uid`; both decode here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    #[serde(alias = "taskUid")]
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub error: Option<TaskError>,
}

/// An API key as listed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    #[serde(default)]
    pub name: Option<String>,
    pub key: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of the key listing call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyList {
    #[serde(default)]
    pub results: Vec<ApiKey>,
}

impl KeyList {
    /// Find a key by its display name
    pub fn named(&self, name: &str) -> Option<&str> {
        self.results
            .iter()
            .find(|k| k.name.as_deref() == Some(name))
            .map(|k| k.key.as_str())
    }
}

/// Per-index statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub number_of_documents: u64,
    #[serde(default)]
    pub is_indexing: bool,
}

/// The operations this crate needs from a full-text search engine.
///
/// Write operations are asynchronous on the engine side and return a
/// [`TaskInfo`]; use [`SearchEngine::wait_for_task`] to block on one.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run a query against `index`
    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;

    async fn add_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo>;

    async fn update_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo>;

    async fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo>;

    async fn delete_all_documents(&self, index: &str) -> Result<TaskInfo>;

    async fn update_filterable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<TaskInfo>;

    async fn update_sortable_attributes(&self, index: &str, attributes: &[String])
        -> Result<TaskInfo>;

    async fn update_ranking_rules(&self, index: &str, rules: &[String]) -> Result<TaskInfo>;

    /// Currently configured filterable attributes; not-found if the index is missing
    async fn get_filterable_attributes(&self, index: &str) -> Result<Vec<String>>;

    async fn create_index(&self, index: &str, primary_key: Option<&str>) -> Result<TaskInfo>;

    async fn delete_index(&self, index: &str) -> Result<TaskInfo>;

    async fn index_stats(&self, index: &str) -> Result<IndexStats>;

    async fn get_task(&self, uid: u64) -> Result<TaskInfo>;

    async fn list_keys(&self) -> Result<KeyList>;

    /// Bound for blocking waits
    fn timeout(&self) -> Duration;

    /// First delay between two task polls
    fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(50)
    }

    /// Poll a task until it finishes. The delay starts at
    /// [`SearchEngine::task_poll_interval`] (at least [`MIN_TASK_POLL_INTERVAL`])
    /// and doubles after every poll up to [`MAX_TASK_POLL_INTERVAL`]; the whole
    /// wait is bounded by [`SearchEngine::timeout`].
    async fn wait_for_task(&self, uid: u64) -> Result<TaskInfo> {
        let deadline = Instant::now() + self.timeout();
        let mut delay = self
            .task_poll_interval()
            .clamp(MIN_TASK_POLL_INTERVAL, MAX_TASK_POLL_INTERVAL);

        loop {
            let task = self.get_task(uid).await?;
            match task.status {
                TaskStatus::Succeeded => return Ok(task),
                TaskStatus::Failed | TaskStatus::Canceled => {
                    let message = task
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| format!("{:?}", task.status).to_lowercase());
                    return Err(SearchError::TaskFailed { uid, message });
                }
                TaskStatus::Enqueued | TaskStatus::Processing => {}
            }

            if Instant::now() + delay > deadline {
                return Err(SearchError::TaskTimeout { uid });
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_TASK_POLL_INTERVAL);
        }
    }
}

//! Meilisearch engine implementation
//!
//! Talks to the Meilisearch REST API through [`HttpClient`].

use super::traits::*;
use crate::documents::IndexableDocument;
use crate::error::Result;
use crate::network::{ApiRequest, HttpClient};
use crate::search::SearchOptions;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// A Meilisearch client authenticated with a single API key
#[derive(Debug, Clone)]
pub struct Meilisearch {
    http: HttpClient,
    timeout: Duration,
    task_poll_interval: Duration,
}

impl Meilisearch {
    pub fn new(url: &str, api_key: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(url, api_key, timeout, max_retries)?,
            timeout,
            task_poll_interval: Duration::from_millis(50),
        })
    }

    /// Set the first delay used when polling tasks
    pub fn with_task_poll_interval(mut self, interval: Duration) -> Self {
        self.task_poll_interval = interval;
        self
    }

    /// Key this client authenticates with
    pub fn api_key(&self) -> &str {
        self.http.api_key()
    }

    pub fn url(&self) -> &str {
        self.http.base_url()
    }

    fn index_path(index: &str, rest: &str) -> String {
        format!("/indexes/{}{}", urlencoding::encode(index), rest)
    }

    fn documents_request(
        request: ApiRequest,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<ApiRequest> {
        let mut request = request.json(serde_json::to_value(documents)?);
        if let Some(pk) = primary_key {
            request = request.param("primaryKey", pk);
        }
        Ok(request)
    }
}

#[async_trait]
impl SearchEngine for Meilisearch {
    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let mut body = serde_json::to_value(options)?;
        if let Value::Object(ref mut map) = body {
            map.insert("q".to_string(), Value::String(query.to_string()));
        }
        let request = ApiRequest::post(Self::index_path(index, "/search")).json(body);
        self.http.execute(request).await
    }

    async fn add_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        let request = ApiRequest::post(Self::index_path(index, "/documents"));
        let request = Self::documents_request(request, documents, primary_key)?;
        self.http.execute(request).await
    }

    async fn update_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        let request = ApiRequest::put(Self::index_path(index, "/documents"));
        let request = Self::documents_request(request, documents, primary_key)?;
        self.http.execute(request).await
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo> {
        let path = Self::index_path(index, &format!("/documents/{}", urlencoding::encode(id)));
        self.http.execute(ApiRequest::delete(path)).await
    }

    async fn delete_all_documents(&self, index: &str) -> Result<TaskInfo> {
        self.http
            .execute(ApiRequest::delete(Self::index_path(index, "/documents")))
            .await
    }

    async fn update_filterable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<TaskInfo> {
        let path = Self::index_path(index, "/settings/filterable-attributes");
        self.http
            .execute(ApiRequest::put(path).json(json!(attributes)))
            .await
    }

    async fn update_sortable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<TaskInfo> {
        let path = Self::index_path(index, "/settings/sortable-attributes");
        self.http
            .execute(ApiRequest::put(path).json(json!(attributes)))
            .await
    }

    async fn update_ranking_rules(&self, index: &str, rules: &[String]) -> Result<TaskInfo> {
        let path = Self::index_path(index, "/settings/ranking-rules");
        self.http.execute(ApiRequest::put(path).json(json!(rules))).await
    }

    async fn get_filterable_attributes(&self, index: &str) -> Result<Vec<String>> {
        let path = Self::index_path(index, "/settings/filterable-attributes");
        self.http.execute(ApiRequest::get(path)).await
    }

    async fn create_index(&self, index: &str, primary_key: Option<&str>) -> Result<TaskInfo> {
        let body = json!({ "uid": index, "primaryKey": primary_key });
        self.http
            .execute(ApiRequest::post("/indexes").json(body))
            .await
    }

    async fn delete_index(&self, index: &str) -> Result<TaskInfo> {
        self.http
            .execute(ApiRequest::delete(Self::index_path(index, "")))
            .await
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        self.http
            .execute(ApiRequest::get(Self::index_path(index, "/stats")))
            .await
    }

    async fn get_task(&self, uid: u64) -> Result<TaskInfo> {
        self.http
            .execute(ApiRequest::get(format!("/tasks/{}", uid)))
            .await
    }

    async fn list_keys(&self) -> Result<KeyList> {
        self.http.execute(ApiRequest::get("/keys")).await
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn task_poll_interval(&self) -> Duration {
        self.task_poll_interval
    }
}

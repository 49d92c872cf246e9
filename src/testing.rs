//! In-memory doubles of the engine and the record store for unit tests

use crate::documents::{stringify, IndexableDocument, Record, SearchableType, Searchable, ID_FIELD};
use crate::engines::{Hit, IndexStats, KeyList, SearchEngine, SearchResponse, TaskInfo, TaskStatus};
use crate::error::{Result, SearchError};
use crate::search::{RecordStore, SearchOptions};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Raw hits from a JSON array of objects
pub fn hits(values: Value) -> Vec<Hit> {
    values
        .as_array()
        .expect("hits must be an array")
        .iter()
        .map(|v| v.as_object().cloned().expect("hit must be an object"))
        .collect()
}

/// Store-side record of any class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    pub class: String,
    pub key: String,
    pub name: String,
}

impl TestRecord {
    pub fn new(class: &str, key: &str, name: &str) -> Self {
        Self {
            class: class.to_string(),
            key: key.to_string(),
            name: name.to_string(),
        }
    }
}

impl Record for TestRecord {
    fn primary_key(&self) -> String {
        self.key.clone()
    }
}

/// A searchable type with default configuration (index `note`)
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub name: String,
    pub body: String,
}

impl Note {
    pub fn new(id: impl Into<String>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: body.into(),
        }
    }
}

impl Record for Note {
    fn primary_key(&self) -> String {
        self.id.clone()
    }
}

impl Searchable for Note {
    fn object_class() -> &'static str {
        "Note"
    }

    fn attribute_names() -> Vec<String> {
        vec!["id".to_string(), "name".to_string(), "body".to_string()]
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("id".to_string(), json!(self.id));
        attributes.insert("name".to_string(), json!(self.name));
        attributes.insert("body".to_string(), json!(self.body));
        attributes
    }
}

/// Record store keeping records per class in memory
pub struct MemoryStore<R = TestRecord> {
    records: HashMap<String, Vec<R>>,
    failing: Option<String>,
    fetches: AtomicUsize,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            failing: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn insert(&mut self, class: &str, record: R) {
        self.records.entry(class.to_string()).or_default().push(record);
    }

    /// Make every fetch of `class` fail
    pub fn failing_for(mut self, class: &str) -> Self {
        self.failing = Some(class.to_string());
        self
    }

    /// Number of fetch calls so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl MemoryStore<TestRecord> {
    pub fn with_records(records: Vec<TestRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            let class = record.class.clone();
            store.insert(&class, record);
        }
        store
    }
}

#[async_trait]
impl<R: Record + Clone> RecordStore for MemoryStore<R> {
    type Record = R;

    async fn fetch_by_primary_keys(
        &self,
        ty: &SearchableType,
        keys: &[String],
    ) -> anyhow::Result<Vec<R>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.as_deref() == Some(ty.object_class()) {
            anyhow::bail!("store unavailable for {}", ty.object_class());
        }
        Ok(self
            .records
            .get(ty.object_class())
            .map(|records| {
                records
                    .iter()
                    .filter(|r| keys.contains(&r.primary_key()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// A search call as the fake engine received it
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub index: String,
    pub query: String,
    pub options: SearchOptions,
}

#[derive(Debug, Default)]
struct FakeIndex {
    primary_key: Option<String>,
    documents: Vec<Hit>,
    filterable: Vec<String>,
    sortable: Vec<String>,
    ranking: Vec<String>,
}

impl FakeIndex {
    fn key_of(&self, doc: &Hit) -> Option<String> {
        let pk = self.primary_key.as_deref().unwrap_or(ID_FIELD);
        doc.get(pk).map(stringify)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| self.key_of(d).as_deref() == Some(key))
    }
}

#[derive(Debug, Default)]
struct FakeState {
    indexes: HashMap<String, FakeIndex>,
    calls: HashMap<&'static str, usize>,
    searches: Vec<RecordedSearch>,
    next_task: u64,
}

impl FakeState {
    fn record(&mut self, call: &'static str, index: &str) -> TaskInfo {
        *self.calls.entry(call).or_default() += 1;
        self.next_task += 1;
        TaskInfo {
            uid: self.next_task,
            index_uid: Some(index.to_string()),
            status: TaskStatus::Enqueued,
            kind: Some(call.to_string()),
            error: None,
        }
    }

    fn index_mut(&mut self, index: &str, primary_key: Option<&str>) -> &mut FakeIndex {
        let entry = self.indexes.entry(index.to_string()).or_default();
        if entry.primary_key.is_none() {
            entry.primary_key = primary_key.map(str::to_string);
        }
        entry
    }
}

fn index_not_found(index: &str) -> SearchError {
    SearchError::Api {
        status: 404,
        code: "index_not_found".to_string(),
        message: format!("Index `{}` not found.", index),
    }
}

/// Engine double applying writes immediately and counting calls per operation
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<FakeState>,
    response: Option<SearchResponse>,
    search_error: Mutex<Option<SearchError>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every search with `response`
    pub fn with_response(mut self, response: SearchResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Fail the next search with `error`
    pub fn failing_search(self, error: SearchError) -> Self {
        *self.search_error.lock().unwrap() = Some(error);
        self
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.state.lock().unwrap().calls.get(call).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn last_search(&self) -> Option<RecordedSearch> {
        self.state.lock().unwrap().searches.last().cloned()
    }

    /// Documents currently stored in `index`, in insertion order
    pub fn documents(&self, index: &str) -> Vec<Hit> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|i| i.documents.clone())
            .unwrap_or_default()
    }

    pub fn sortable_attributes(&self, index: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|i| i.sortable.clone())
            .unwrap_or_default()
    }

    pub fn ranking_rules(&self, index: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|i| i.ranking.clone())
            .unwrap_or_default()
    }

    fn write(
        &self,
        call: &'static str,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
        merge: bool,
    ) -> TaskInfo {
        let mut state = self.state.lock().unwrap();
        let task = state.record(call, index);
        let target = state.index_mut(index, primary_key);
        for doc in documents {
            let doc = doc.as_map().clone();
            let existing = target.key_of(&doc).and_then(|key| target.position(&key));
            match existing {
                Some(pos) if merge => target.documents[pos].extend(doc),
                Some(pos) => target.documents[pos] = doc,
                None => target.documents.push(doc),
            }
        }
        task
    }
}

#[async_trait]
impl SearchEngine for FakeEngine {
    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry("search").or_default() += 1;
        state.searches.push(RecordedSearch {
            index: index.to_string(),
            query: query.to_string(),
            options: options.clone(),
        });

        if let Some(error) = self.search_error.lock().unwrap().take() {
            return Err(error);
        }
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }
        let hits = state
            .indexes
            .get(index)
            .map(|i| i.documents.clone())
            .unwrap_or_default();
        Ok(SearchResponse {
            estimated_total_hits: Some(hits.len() as u64),
            hits,
            query: Some(query.to_string()),
            limit: options.limit.or(Some(20)),
            offset: options.offset.or(Some(0)),
            processing_time_ms: Some(0),
            ..Default::default()
        })
    }

    async fn add_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        Ok(self.write("add_documents", index, documents, primary_key, false))
    }

    async fn update_documents(
        &self,
        index: &str,
        documents: &[IndexableDocument],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        Ok(self.write("update_documents", index, documents, primary_key, true))
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("delete_document", index);
        if let Some(target) = state.indexes.get_mut(index) {
            if let Some(pos) = target.position(id) {
                target.documents.remove(pos);
            }
        }
        Ok(task)
    }

    async fn delete_all_documents(&self, index: &str) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("delete_all_documents", index);
        if let Some(target) = state.indexes.get_mut(index) {
            target.documents.clear();
        }
        Ok(task)
    }

    async fn update_filterable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("update_filterable_attributes", index);
        state.index_mut(index, None).filterable = attributes.to_vec();
        Ok(task)
    }

    async fn update_sortable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("update_sortable_attributes", index);
        state.index_mut(index, None).sortable = attributes.to_vec();
        Ok(task)
    }

    async fn update_ranking_rules(&self, index: &str, rules: &[String]) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("update_ranking_rules", index);
        state.index_mut(index, None).ranking = rules.to_vec();
        Ok(task)
    }

    async fn get_filterable_attributes(&self, index: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry("get_filterable_attributes").or_default() += 1;
        state
            .indexes
            .get(index)
            .map(|i| i.filterable.clone())
            .ok_or_else(|| index_not_found(index))
    }

    async fn create_index(&self, index: &str, primary_key: Option<&str>) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("create_index", index);
        state.index_mut(index, primary_key);
        Ok(task)
    }

    async fn delete_index(&self, index: &str) -> Result<TaskInfo> {
        let mut state = self.state.lock().unwrap();
        let task = state.record("delete_index", index);
        state.indexes.remove(index);
        Ok(task)
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry("index_stats").or_default() += 1;
        state
            .indexes
            .get(index)
            .map(|i| IndexStats {
                number_of_documents: i.documents.len() as u64,
                is_indexing: false,
            })
            .ok_or_else(|| index_not_found(index))
    }

    async fn get_task(&self, uid: u64) -> Result<TaskInfo> {
        Ok(TaskInfo {
            uid,
            index_uid: None,
            status: TaskStatus::Succeeded,
            kind: None,
            error: None,
        })
    }

    async fn list_keys(&self) -> Result<KeyList> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry("list_keys").or_default() += 1;
        Ok(KeyList::default())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }
}

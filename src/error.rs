//! Error types shared across the crate

use thiserror::Error;

/// Engine error codes that mean "the thing you asked about does not exist"
const NOT_FOUND_CODES: &[&str] = &["index_not_found", "document_not_found", "task_not_found"];

#[derive(Debug, Error)]
pub enum SearchError {
    /// No usable URL or credentials; raised once while building clients
    #[error("search is not configured: {0}")]
    Configuration(String),

    /// The engine answered with a non-success status
    #[error("search engine returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid engine url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid search index name for {0}")]
    InvalidIndexName(String),

    #[error("task {uid} failed: {message}")]
    TaskFailed { uid: u64, message: String },

    #[error("timed out waiting for task {uid}")]
    TaskTimeout { uid: u64 },

    #[error("unknown object class: {0}")]
    UnknownType(String),

    #[error("record store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl SearchError {
    /// True when the engine reported a missing index, document or task
    pub fn is_not_found(&self) -> bool {
        match self {
            SearchError::Api { status, code, .. } => {
                *status == 404 || NOT_FOUND_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

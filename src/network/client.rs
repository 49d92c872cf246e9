//! HTTP client for talking to the search engine's REST API

use crate::error::{Result, SearchError};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Base delay between retries; multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// A single API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the engine URL, starting with `/`
    pub path: String,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Error payload the engine sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: String,
}

/// HTTP client bound to one engine URL and one API key
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the key
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client for `url`, authenticating with `api_key`
    pub fn new(url: &str, api_key: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("record-search/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_retries,
        })
    }

    /// Engine base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Key this client authenticates with
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Execute a request and decode the JSON response, retrying transport
    /// failures and 5xx responses up to `max_retries` times.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let mut attempt = 0;
        loop {
            match self.execute_once(&request).await {
                Err(e) if attempt < self.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    warn!(
                        "{} {} failed ({}), retry {}/{}",
                        request.method, request.path, e, attempt, self.max_retries
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn execute_once<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req_builder = self
            .client
            .request(request.method.clone(), &url)
            .bearer_auth(&self.api_key);

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }
        if let Some(ref body) = request.body {
            req_builder = req_builder.json(body);
        }

        debug!("{} {}", request.method, url);
        let response = req_builder.send().await?;
        Self::parse_response(response).await
    }

    /// Decode a response, turning non-2xx statuses into `SearchError::Api`
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => (body.code, body.message),
                Err(_) => (String::new(), text),
            };
            return Err(SearchError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn is_retryable(error: &SearchError) -> bool {
        match error {
            SearchError::Http(e) => e.is_connect() || e.is_timeout(),
            SearchError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

//! # Page Sources
//!
//! The strategy the gateway uses to perform one request.
//!
//! ## Strategies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         dyn PageSource                                  │
//! │                                                                         │
//! │  HttpSource                          FixtureSource                      │
//! │  ──────────                          ─────────────                      │
//! │  reqwest GET base_url/path?query     JSON datasets held in memory       │
//! │  Bearer token, per-request timeout   limit/offset slicing as the API    │
//! │  status + Retry-After + body         products/{id}, .../variants        │
//! │                                      no waits (suppresses_waits)        │
//! │                                                                         │
//! │  Both answer with a RawResponse; the gateway decides what it means.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The strategy is chosen once, by whoever builds the gateway.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::{SourceMode, StocklineConfig};
use crate::error::{SyncError, SyncResult};

/// Collections the fixture source loads from a directory.
pub const FIXTURE_COLLECTIONS: [&str; 3] = ["products", "inventory", "sales"];

// =============================================================================
// Request / Response
// =============================================================================

/// One GET against the API, relative to its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        ApiRequest {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.query.extend(params);
        self
    }

    /// Last value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,

    /// Parsed `Retry-After` header (delta-seconds form only).
    pub retry_after: Option<Duration>,

    pub body: String,
}

impl RawResponse {
    /// A 200 with a JSON body.
    pub fn ok(body: &Value) -> Self {
        RawResponse {
            status: 200,
            retry_after: None,
            body: body.to_string(),
        }
    }

    /// A bodiless response with the given status.
    pub fn status(status: u16) -> Self {
        RawResponse {
            status,
            retry_after: None,
            body: String::new(),
        }
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

// =============================================================================
// Source Trait
// =============================================================================

/// Performs one request. No retries, no interpretation of statuses.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;

    /// True when backoff, rate-limit and pacing waits should be skipped.
    fn suppresses_waits(&self) -> bool {
        false
    }
}

/// Builds the source named by the configuration.
pub fn source_from_config(config: &StocklineConfig) -> SyncResult<Arc<dyn PageSource>> {
    match config.source.mode {
        SourceMode::Live => Ok(Arc::new(HttpSource::new(
            &config.api.base_url,
            &config.api.token,
            config.api.request_timeout(),
        )?)),
        SourceMode::Fixture => {
            let dir = config.source.fixture_dir.as_deref().ok_or_else(|| {
                SyncError::InvalidConfig("source.fixture_dir is required in fixture mode".into())
            })?;
            Ok(Arc::new(FixtureSource::from_dir(dir)?))
        }
    }
}

// =============================================================================
// HTTP Source
// =============================================================================

/// Live requests over reqwest.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> SyncResult<Self> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| SyncError::InvalidConfig(format!("API token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {}", e)))?;

        info!(base_url = %base, "HTTP source ready");
        Ok(HttpSource {
            client,
            base_url: base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        self.base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| TransportError::Other(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(request)?;
        debug!(url = %url, query = ?request.query, "GET");

        let response = self
            .client
            .get(url)
            .query(&request.query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

// =============================================================================
// Fixture Source
// =============================================================================

/// Offline source backed by static datasets.
///
/// ## Routes
/// ```text
/// {collection}?limit&offset[&filters]   ──► {"data": slice}
/// products/{id}                         ──► product object, or 404
/// products/{id}/variants?limit&offset   ──► {"data": slice of its variants}
/// unknown collection                    ──► {"data": []}
/// ```
/// Filters: `location_id` (equality), `date_from` / `date_to` (inclusive,
/// on the `YYYY-MM-DD` prefix of `date`).
#[derive(Debug, Default)]
pub struct FixtureSource {
    collections: HashMap<String, Vec<Value>>,
    requests: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, items: Vec<Value>) -> Self {
        self.collections.insert(name.into(), items);
        self
    }

    /// Loads `products.json`, `inventory.json` and `sales.json` from `dir`.
    /// Missing files are empty collections.
    pub fn from_dir(dir: &Path) -> SyncResult<Self> {
        let mut source = FixtureSource::new();
        for name in FIXTURE_COLLECTIONS {
            let path = dir.join(format!("{}.json", name));
            if !path.exists() {
                debug!(?path, "Fixture file missing, collection is empty");
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&contents)
                .map_err(|e| SyncError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
            let items = normalize_dataset(value);
            info!(collection = name, items = items.len(), "Loaded fixture");
            source.collections.insert(name.to_string(), items);
        }
        Ok(source)
    }

    /// Requests answered so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn find_product(&self, id: &str) -> Option<&Value> {
        self.collections
            .get("products")?
            .iter()
            .find(|product| id_of(product.get("id")).as_deref() == Some(id))
    }

    fn route(&self, request: &ApiRequest) -> RawResponse {
        let segments: Vec<&str> = request
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["products", id] => match self.find_product(id) {
                Some(product) => RawResponse::ok(product),
                None => RawResponse::status(404),
            },
            ["products", id, "variants"] => match self.find_product(id) {
                Some(product) => {
                    let variants = product
                        .get("variants")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    page_response(&variants, request)
                }
                None => RawResponse::status(404),
            },
            [collection] => {
                let items: Vec<Value> = self
                    .collections
                    .get(*collection)
                    .map(|items| {
                        items
                            .iter()
                            .filter(|item| matches_filters(item, request))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                page_response(&items, request)
            }
            _ => RawResponse::ok(&json!({ "data": [] })),
        }
    }
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.route(request))
    }

    fn suppresses_waits(&self) -> bool {
        true
    }
}

/// Accepts `{"data": [...]}` or a bare array.
fn normalize_dataset(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn date_prefix(item: &Value) -> Option<&str> {
    let date = item.get("date")?.as_str()?;
    Some(date.get(..10).unwrap_or(date))
}

fn matches_filters(item: &Value, request: &ApiRequest) -> bool {
    if let Some(location) = request.param("location_id") {
        if id_of(item.get("location_id")).as_deref() != Some(location) {
            return false;
        }
    }
    if let Some(from) = request.param("date_from") {
        if date_prefix(item).map_or(true, |date| date < from) {
            return false;
        }
    }
    if let Some(to) = request.param("date_to") {
        if date_prefix(item).map_or(true, |date| date > to) {
            return false;
        }
    }
    true
}

fn page_response(items: &[Value], request: &ApiRequest) -> RawResponse {
    let offset = request
        .param("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = request.param("limit").and_then(|v| v.parse::<usize>().ok());

    let start = offset.min(items.len());
    let end = match limit {
        Some(limit) => start.saturating_add(limit).min(items.len()),
        None => items.len(),
    };
    RawResponse::ok(&json!({ "data": &items[start..end] }))
}

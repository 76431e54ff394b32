//! # Retrying Gateway
//!
//! Hides pagination, rate limiting and transient-failure retry from callers.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  fetch_collection("sales", query)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Paginator ── PageCursor (offset, limit) ──┐                           │
//! │       │                                     │ one page                  │
//! │       ▼                                     ▼                           │
//! │  Gateway::request ── loop ──► PageSource::send ──► RetryPolicy::classify│
//! │       ▲                                                   │             │
//! │       │   RateLimited(d)  ── wait d ──────────────────────┤             │
//! │       │   Retryable       ── wait 1s, 2s, 4s ... ─────────┤             │
//! │       └───────────────────────────────────────────────────┘             │
//! │           Success → decode JSON   NotFound → None   Fatal → Err         │
//! │                                                                         │
//! │  Every wait races the cancellation signal and is skipped entirely      │
//! │  for sources that suppress waits (fixtures).                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let gateway = Gateway::new(source_from_config(&config)?, GatewayOptions::from_settings(&config.api));
//! let sales = gateway.get_sales(Some(from), Some(to)).await?;
//! ```

use backoff::backoff::Backoff;
use chrono::NaiveDate;
use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ApiSettings;
use crate::error::{SyncError, SyncResult};
use crate::records::{RemoteInventoryLevel, RemoteProduct, RemoteSale};

pub mod cursor;
pub mod retry;
pub mod source;

pub use cursor::{CursorState, PageCursor};
pub use retry::{Attempt, RetryPolicy, RetryableFailure};
pub use source::{
    source_from_config, ApiRequest, FixtureSource, HttpSource, PageSource, RawResponse,
    TransportError,
};

// =============================================================================
// Options
// =============================================================================

/// Everything about the gateway that is not the source.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    pub page_size: usize,
    pub confirm_short_page: bool,
    pub request_spacing: Duration,
    pub retry: RetryPolicy,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        GatewayOptions {
            page_size: 250,
            confirm_short_page: true,
            request_spacing: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}

impl GatewayOptions {
    pub fn from_settings(settings: &ApiSettings) -> Self {
        GatewayOptions {
            page_size: settings.page_size.max(1),
            confirm_short_page: settings.confirm_short_page,
            request_spacing: Duration::from_millis(settings.request_spacing_ms),
            retry: RetryPolicy::from_settings(settings),
        }
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Commerce API client with retry, rate-limit and pagination handling.
#[derive(Clone)]
pub struct Gateway {
    source: Arc<dyn PageSource>,
    options: GatewayOptions,
    cancel: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("options", &self.options)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl Gateway {
    pub fn new(source: Arc<dyn PageSource>, options: GatewayOptions) -> Self {
        Gateway {
            source,
            options,
            cancel: None,
        }
    }

    /// Waits end early with `SyncError::Cancelled` once `signal` holds `true`.
    pub fn with_cancellation(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    // =========================================================================
    // Waiting
    // =========================================================================

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn wait(&self, delay: Duration) -> SyncResult<()> {
        if self.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        if delay.is_zero() || self.source.suppresses_waits() {
            return Ok(());
        }

        match &self.cancel {
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(rx) => {
                let mut rx = rx.clone();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => Ok(()),
                    _ = cancelled(&mut rx) => {
                        info!("Wait interrupted by cancellation");
                        Err(SyncError::Cancelled)
                    }
                }
            }
        }
    }

    // =========================================================================
    // Single Request
    // =========================================================================

    /// One logical request: retried until it succeeds, is not found, or a
    /// budget runs out.
    ///
    /// Returns `None` on 404.
    pub async fn request(&self, request: &ApiRequest) -> SyncResult<Option<Value>> {
        let policy = &self.options.retry;
        let mut backoff = policy.backoff();
        let mut attempts = 0u32;
        let mut rate_limit_waits = 0u32;

        loop {
            if self.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let outcome = policy.classify(self.source.send(request).await);
            match outcome {
                Attempt::Success(body) => {
                    let value: Value = serde_json::from_str(&body)?;
                    self.wait(self.options.request_spacing).await?;
                    return Ok(Some(value));
                }
                Attempt::NotFound => {
                    debug!(path = %request.path, "Not found");
                    return Ok(None);
                }
                Attempt::Fatal(err) => {
                    warn!(path = %request.path, error = %err, "Request failed");
                    return Err(err);
                }
                Attempt::RateLimited(delay) => {
                    rate_limit_waits += 1;
                    if rate_limit_waits > policy.max_rate_limit_waits {
                        warn!(path = %request.path, waits = policy.max_rate_limit_waits, "Rate limit budget exhausted");
                        return Err(SyncError::RateLimited {
                            waits: policy.max_rate_limit_waits,
                        });
                    }
                    warn!(
                        path = %request.path,
                        retry_after_secs = delay.as_secs_f64(),
                        wait = rate_limit_waits,
                        "Rate limited, waiting"
                    );
                    self.wait(delay).await?;
                }
                Attempt::Retryable(failure) => {
                    attempts += 1;
                    if attempts >= policy.max_attempts {
                        warn!(path = %request.path, attempts, failure = %failure, "Giving up");
                        return Err(failure.into_error(attempts));
                    }
                    let delay = backoff.next_backoff().unwrap_or(policy.max_backoff);
                    warn!(
                        path = %request.path,
                        failure = %failure,
                        attempt = attempts,
                        max_attempts = policy.max_attempts,
                        backoff_secs = delay.as_secs_f64(),
                        "Transient failure, retrying"
                    );
                    self.wait(delay).await?;
                }
            }
        }
    }

    /// A single resource, `None` on 404.
    pub async fn fetch_one(&self, path: &str) -> SyncResult<Option<Value>> {
        self.request(&ApiRequest::new(path)).await
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Lazy, finite sequence over a paginated collection.
    ///
    /// Nothing is requested until the first `next_page` / `next_item`.
    /// Starting over means calling this again, which begins at offset 0.
    pub fn fetch_collection(&self, endpoint: &str, query: Vec<(String, String)>) -> Paginator<'_> {
        Paginator {
            gateway: self,
            query,
            cursor: PageCursor::new(endpoint, self.options.page_size)
                .with_confirmation(self.options.confirm_short_page),
            buffer: VecDeque::new(),
            pages: 0,
        }
    }

    /// Every item of a collection, decoded as `T`.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> SyncResult<Vec<T>> {
        let mut paginator = self.fetch_collection(endpoint, query);
        let mut records = Vec::new();
        while let Some(page) = paginator.next_page().await? {
            for item in page {
                records.push(serde_json::from_value(item)?);
            }
        }
        info!(
            endpoint,
            records = records.len(),
            pages = paginator.pages(),
            "Collection fetched"
        );
        Ok(records)
    }

    // =========================================================================
    // Typed Helpers
    // =========================================================================

    /// One product, `None` when the API does not know it.
    pub async fn get_product(&self, id: &str) -> SyncResult<Option<RemoteProduct>> {
        match self.fetch_one(&format!("products/{}", id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(unwrap_data(value))?)),
            None => Ok(None),
        }
    }

    /// All products; with `include_variants`, each product's variants are
    /// fetched from `products/{id}/variants`.
    pub async fn get_products(&self, include_variants: bool) -> SyncResult<Vec<RemoteProduct>> {
        let mut products: Vec<RemoteProduct> = self.fetch_all("products", Vec::new()).await?;
        if include_variants {
            for product in &mut products {
                product.variants = self
                    .fetch_all(&format!("products/{}/variants", product.id), Vec::new())
                    .await?;
            }
        }
        Ok(products)
    }

    /// Stock levels, optionally for one location.
    pub async fn get_inventory(
        &self,
        location_id: Option<&str>,
    ) -> SyncResult<Vec<RemoteInventoryLevel>> {
        let mut query = Vec::new();
        if let Some(location) = location_id {
            query.push(("location_id".to_string(), location.to_string()));
        }
        self.fetch_all("inventory", query).await
    }

    /// Sales between two dates, inclusive.
    pub async fn get_sales(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> SyncResult<Vec<RemoteSale>> {
        let mut query = Vec::new();
        if let Some(from) = date_from {
            query.push(("date_from".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = date_to {
            query.push(("date_to".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        self.fetch_all("sales", query).await
    }
}

/// Resolves once the signal reads `true`. Never resolves if the sender is
/// gone without having cancelled.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Single-resource endpoints answer either the object or `{"data": object}`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// =============================================================================
// Paginator
// =============================================================================

/// Pull-based walk over one collection.
#[derive(Debug)]
pub struct Paginator<'g> {
    gateway: &'g Gateway,
    query: Vec<(String, String)>,
    cursor: PageCursor,
    buffer: VecDeque<Value>,
    pages: usize,
}

impl<'g> Paginator<'g> {
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Pages with at least one item fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn page_request(&self) -> ApiRequest {
        ApiRequest::new(self.cursor.endpoint())
            .with_query(self.query.iter().cloned())
            .with_query(self.cursor.params())
    }

    /// The next non-empty page, or `None` once the collection is exhausted.
    pub async fn next_page(&mut self) -> SyncResult<Option<Vec<Value>>> {
        match self.cursor.state() {
            CursorState::Finished => Ok(None),
            CursorState::Confirming => {
                debug!(
                    endpoint = %self.cursor.endpoint(),
                    offset = self.cursor.offset(),
                    "Confirming end of collection"
                );
                let request = self.page_request();
                self.gateway.request(&request).await?;
                self.cursor.finish();
                Ok(None)
            }
            CursorState::Active => {
                let request = self.page_request();
                let Some(body) = self.gateway.request(&request).await? else {
                    self.cursor.finish();
                    return Ok(None);
                };

                let items = page_items(body)?;
                debug!(
                    endpoint = %self.cursor.endpoint(),
                    offset = self.cursor.offset(),
                    items = items.len(),
                    "Page fetched"
                );
                self.cursor.advance(items.len());

                if items.is_empty() {
                    Ok(None)
                } else {
                    self.pages += 1;
                    Ok(Some(items))
                }
            }
        }
    }

    /// The next item, fetching a page when the buffer runs dry.
    pub async fn next_item(&mut self) -> SyncResult<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page),
                None => return Ok(None),
            }
        }
    }

    /// The remaining items as a stream.
    pub fn into_stream(self) -> impl Stream<Item = SyncResult<Value>> + 'g {
        stream::try_unfold(self, |mut paginator| async move {
            let next = paginator.next_item().await?;
            Ok::<_, SyncError>(next.map(|item| (item, paginator)))
        })
    }
}

/// Items of a collection page: `{"data": [...]}` or a bare array. A body
/// without `data` ends the collection.
fn page_items(body: Value) -> SyncResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(SyncError::Decode(format!(
                "expected an array in `data`, got {}",
                json_kind(&other)
            ))),
        },
        other => Err(SyncError::Decode(format!(
            "expected a page object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::TryStreamExt;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Answers from a script, then with `fallback`; records every request.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
        fallback: RawResponse,
        seen: Mutex<Vec<(ApiRequest, Instant)>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<RawResponse, TransportError>>) -> Arc<Self> {
            Arc::new(ScriptedSource {
                script: Mutex::new(script.into()),
                fallback: RawResponse::ok(&json!({ "data": [] })),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn offsets(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|(r, _)| r.param("offset").unwrap_or("-").to_string())
                .collect()
        }

        fn gaps(&self) -> Vec<Duration> {
            let seen = self.seen.lock().unwrap();
            seen.windows(2).map(|w| w[1].1 - w[0].1).collect()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.clone(), Instant::now()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn page(ids: std::ops::Range<usize>) -> Result<RawResponse, TransportError> {
        let data: Vec<Value> = ids.map(|i| json!({ "id": i })).collect();
        Ok(RawResponse::ok(&json!({ "data": data })))
    }

    fn gateway(source: Arc<ScriptedSource>) -> Gateway {
        Gateway::new(source, GatewayOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_with_confirmation_call() {
        let source = ScriptedSource::new(vec![page(0..250), page(250..400), page(0..0)]);
        let gw = gateway(source.clone());

        let items: Vec<Value> = gw.fetch_all("products", Vec::new()).await.unwrap();

        assert_eq!(items.len(), 400);
        assert_eq!(source.calls(), 3);
        assert_eq!(source.offsets(), vec!["0", "250", "500"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_without_confirmation_call() {
        let source = ScriptedSource::new(vec![page(0..250), page(250..400)]);
        let options = GatewayOptions {
            confirm_short_page: false,
            ..GatewayOptions::default()
        };
        let gw = Gateway::new(source.clone(), options);

        let items: Vec<Value> = gw.fetch_all("products", Vec::new()).await.unwrap();
        assert_eq!(items.len(), 400);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_short_page_is_one_call() {
        let source = ScriptedSource::new(vec![page(0..2)]);
        let gw = gateway(source.clone());

        let items: Vec<Value> = gw.fetch_all("products", Vec::new()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_collection_is_one_call() {
        let source = ScriptedSource::new(vec![]);
        let gw = gateway(source.clone());

        let items: Vec<Value> = gw.fetch_all("products", Vec::new()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginator_is_lazy() {
        let source = ScriptedSource::new(vec![page(0..250), page(250..260)]);
        let gw = gateway(source.clone());

        let mut paginator = gw.fetch_collection("products", Vec::new());
        assert_eq!(source.calls(), 0);

        let first = paginator.next_item().await.unwrap().unwrap();
        assert_eq!(first["id"], 0);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginator_stream() {
        let source = ScriptedSource::new(vec![page(0..250), page(250..300)]);
        let gw = gateway(source.clone());

        let items: Vec<Value> = gw
            .fetch_collection("inventory", Vec::new())
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items.len(), 300);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_for_hint_then_succeeds() {
        let source = ScriptedSource::new(vec![
            Ok(RawResponse::status(429).with_retry_after(Duration::from_secs(2))),
            page(0..1),
        ]);
        let gw = gateway(source.clone());

        let body = gw.fetch_one("products").await.unwrap().unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(source.calls(), 2);
        assert_eq!(source.gaps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_does_not_use_attempts() {
        let limited = || Ok(RawResponse::status(429).with_retry_after(Duration::from_secs(1)));
        let source = ScriptedSource::new(vec![
            limited(),
            limited(),
            limited(),
            limited(),
            page(0..1),
        ]);
        let gw = gateway(source.clone());

        assert!(gw.fetch_one("products").await.unwrap().is_some());
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_budget_exhausted() {
        let limited = || Ok(RawResponse::status(429).with_retry_after(Duration::from_secs(1)));
        let source = ScriptedSource::new((0..10).map(|_| limited()).collect());
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::RateLimited { waits: 5 }));
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_back_off_then_fail() {
        let source = ScriptedSource::new(vec![
            Ok(RawResponse::status(503)),
            Ok(RawResponse::status(502)),
            Ok(RawResponse::status(500)),
        ]);
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::Server { status: 500, attempts: 3 }));
        assert_eq!(source.calls(), 3);
        assert_eq!(
            source.gaps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_recover() {
        let source = ScriptedSource::new(vec![
            Err(TransportError::Connect("refused".into())),
            Err(TransportError::Timeout("30s".into())),
            page(0..1),
        ]);
        let gw = gateway(source.clone());

        assert!(gw.fetch_one("products").await.unwrap().is_some());
        assert_eq!(source.calls(), 3);
        assert_eq!(
            source.gaps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failure_exhausts_attempts() {
        let source = ScriptedSource::new(
            (0..3)
                .map(|_| Err(TransportError::Connect("refused".into())))
                .collect(),
        );
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::Connection { attempts: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried() {
        let source = ScriptedSource::new(vec![Ok(RawResponse::status(401)), page(0..1)]);
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::Authentication));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_none() {
        let source = ScriptedSource::new(vec![Ok(RawResponse::status(404))]);
        let gw = gateway(source.clone());

        assert!(gw.get_product("missing").await.unwrap().is_none());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_client_errors_fail_after_retries() {
        let source = ScriptedSource::new(
            (0..3).map(|_| Ok(RawResponse::status(400))).collect(),
        );
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::Api { status: 400, .. }));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_is_decode_error() {
        let source = ScriptedSource::new(vec![Ok(RawResponse {
            status: 200,
            retry_after: None,
            body: "<html>".into(),
        })]);
        let gw = gateway(source.clone());

        let err = gw.fetch_one("products").await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_spacing_after_success() {
        let source = ScriptedSource::new(vec![page(0..250), page(250..251)]);
        let options = GatewayOptions {
            request_spacing: Duration::from_millis(500),
            confirm_short_page: false,
            ..GatewayOptions::default()
        };
        let gw = Gateway::new(source.clone(), options);

        let _: Vec<Value> = gw.fetch_all("products", Vec::new()).await.unwrap();
        assert_eq!(source.gaps(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_rate_limit_wait() {
        let source = ScriptedSource::new(vec![
            Ok(RawResponse::status(429).with_retry_after(Duration::from_secs(60))),
            page(0..1),
        ]);
        let (tx, rx) = watch::channel(false);
        let gw = gateway(source.clone()).with_cancellation(rx);

        let started = Instant::now();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            tx.send(true).unwrap();
        });

        let err = gw.fetch_one("products").await.unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(source.calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_request() {
        let source = ScriptedSource::new(vec![page(0..1)]);
        let (_tx, rx) = watch::channel(true);
        let gw = gateway(source.clone()).with_cancellation(rx);

        assert!(matches!(
            gw.fetch_one("products").await,
            Err(SyncError::Cancelled)
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fixture_source_skips_waits() {
        let source = Arc::new(FixtureSource::new().with_collection(
            "products",
            (0..400).map(|i| json!({ "id": i, "name": format!("P{}", i) })).collect(),
        ));
        let options = GatewayOptions {
            request_spacing: Duration::from_secs(3600),
            ..GatewayOptions::default()
        };
        let gw = Gateway::new(source.clone(), options);

        let products = gw.get_products(false).await.unwrap();
        assert_eq!(products.len(), 400);
        assert_eq!(source.request_count(), 3);
    }

    #[test]
    fn test_page_items_shapes() {
        assert_eq!(page_items(json!({ "data": [1, 2] })).unwrap().len(), 2);
        assert_eq!(page_items(json!([1])).unwrap().len(), 1);
        assert!(page_items(json!({ "meta": {} })).unwrap().is_empty());
        assert!(page_items(json!({ "data": "x" })).is_err());
        assert!(page_items(json!("x")).is_err());
    }
}

//! # Stockline Configuration
//!
//! Configuration for the gateway, the reconciliation run and the local store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKLINE_API_TOKEN=...                                            │
//! │     STOCKLINE_SOURCE_MODE=fixture                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockline/stockline.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockline.stockline/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     fixture-free live mode, lenient policy, page size 250              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only this module reads the environment. The gateway gets its source
//! strategy handed to it.
//!
//! ## Configuration File Format
//! ```toml
//! [tenant]
//! id = "00000000-0000-0000-0000-000000000001"
//!
//! [api]
//! base_url = "https://mystore.example.com/api/2.0"
//! token = "..."
//! page_size = 250
//! max_attempts = 3
//!
//! [source]
//! mode = "fixture"
//! fixture_dir = "fixtures/commerce"
//!
//! [reconcile]
//! policy = "lenient"
//!
//! [database]
//! path = "stockline.db"
//!
//! [cache]
//! ttl_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stockline_core::{NegativeStockPolicy, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TENANT_ID};
use stockline_db::CacheConfig;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Source Mode
// =============================================================================

/// Where the gateway reads collections from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// HTTP calls to the commerce API.
    #[default]
    Live,

    /// Static JSON datasets on disk, no network and no waits.
    Fixture,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Live => write!(f, "live"),
            SourceMode::Fixture => write!(f, "fixture"),
        }
    }
}

impl std::str::FromStr for SourceMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "http" => Ok(SourceMode::Live),
            "fixture" | "fixtures" | "demo" | "offline" => Ok(SourceMode::Fixture),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown source mode: '{}'. Valid options: live, fixture",
                other
            ))),
        }
    }
}

// =============================================================================
// Tenant
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default = "default_tenant_id")]
    pub id: String,
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

impl Default for TenantSettings {
    fn default() -> Self {
        TenantSettings {
            id: default_tenant_id(),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Commerce API connection and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL, e.g. `https://mystore.example.com/api/2.0`.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token.
    #[serde(default)]
    pub token: String,

    /// Items requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Attempts per request for 5xx, connection and other non-2xx failures.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay (milliseconds); doubles per failed attempt.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,

    /// Upper bound of one backoff delay (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,

    /// Wait used when a 429 carries no Retry-After header (seconds).
    #[serde(default = "default_retry_after")]
    pub default_retry_after_secs: u64,

    /// 429 responses tolerated per request. Separate from `max_attempts`.
    #[serde(default = "default_max_rate_limit_waits")]
    pub max_rate_limit_waits: u32,

    /// Fixed pause after every successful request (milliseconds).
    #[serde(default)]
    pub request_spacing_ms: u64,

    /// Per-request HTTP timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Issue one more request after a short non-first page.
    #[serde(default = "default_true")]
    pub confirm_short_page: bool,
}

fn default_page_size() -> usize {
    250
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_backoff() -> u64 {
    1000
}
fn default_max_backoff() -> u64 {
    30
}
fn default_retry_after() -> u64 {
    60
}
fn default_max_rate_limit_waits() -> u32 {
    5
}
fn default_request_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: String::new(),
            token: String::new(),
            page_size: default_page_size(),
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff(),
            max_backoff_secs: default_max_backoff(),
            default_retry_after_secs: default_retry_after(),
            max_rate_limit_waits: default_max_rate_limit_waits(),
            request_spacing_ms: 0,
            request_timeout_secs: default_request_timeout(),
            confirm_short_page: true,
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Source Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub mode: SourceMode,

    /// Directory holding `products.json`, `inventory.json`, `sales.json`.
    #[serde(default)]
    pub fixture_dir: Option<PathBuf>,
}

// =============================================================================
// Reconcile Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSettings {
    #[serde(default)]
    pub policy: NegativeStockPolicy,

    /// Used when the tenant config has no `LowStockThreshold`.
    #[serde(default = "default_threshold")]
    pub default_low_stock_threshold: i64,

    /// Days of sales fetched per run, ending today.
    #[serde(default = "default_lookback")]
    pub sales_lookback_days: u32,
}

fn default_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}
fn default_lookback() -> u32 {
    7
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        ReconcileSettings {
            policy: NegativeStockPolicy::default(),
            default_low_stock_threshold: default_threshold(),
            sales_lookback_days: default_lookback(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("stockline.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            enabled: true,
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        if self.enabled {
            CacheConfig::with_ttl(Duration::from_secs(self.ttl_secs))
        } else {
            CacheConfig::disabled()
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Stockline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StocklineConfig {
    #[serde(default)]
    pub tenant: TenantSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub reconcile: ReconcileSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

impl StocklineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockline.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.tenant.id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("tenant.id must not be empty".into()));
        }

        match self.source.mode {
            SourceMode::Live => {
                let url = Url::parse(&self.api.base_url)?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(SyncError::InvalidUrl(format!(
                        "API base URL must start with http:// or https://, got: {}",
                        self.api.base_url
                    )));
                }
                if self.api.token.trim().is_empty() {
                    return Err(SyncError::InvalidConfig(
                        "api.token is required in live mode".into(),
                    ));
                }
            }
            SourceMode::Fixture => {
                if self.source.fixture_dir.is_none() {
                    return Err(SyncError::InvalidConfig(
                        "source.fixture_dir is required in fixture mode".into(),
                    ));
                }
            }
        }

        if self.api.page_size == 0 {
            return Err(SyncError::InvalidConfig(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.api.max_attempts == 0 {
            return Err(SyncError::InvalidConfig(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.reconcile.default_low_stock_threshold <= 0 {
            return Err(SyncError::InvalidConfig(
                "default_low_stock_threshold must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("STOCKLINE_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.api.token = token;
        }

        if let Ok(url) = std::env::var("STOCKLINE_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(mode) = std::env::var("STOCKLINE_SOURCE_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding source mode from environment");
                    self.source.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown source mode in environment"),
            }
        }

        if let Ok(dir) = std::env::var("STOCKLINE_FIXTURE_DIR") {
            self.source.fixture_dir = Some(PathBuf::from(dir));
        }

        if let Ok(policy) = std::env::var("STOCKLINE_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.reconcile.policy = parsed,
                Err(_) => warn!(policy = %policy, "Unknown policy in environment"),
            }
        }

        if let Ok(path) = std::env::var("STOCKLINE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(id) = std::env::var("STOCKLINE_TENANT_ID") {
            self.tenant.id = id;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockline", "stockline")
            .map(|dirs| dirs.config_dir().join("stockline.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tenant_id(&self) -> &str {
        &self.tenant.id
    }

    pub fn is_fixture_mode(&self) -> bool {
        self.source.mode == SourceMode::Fixture
    }
}

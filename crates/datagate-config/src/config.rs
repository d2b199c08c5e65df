// crates/datagate-config/src/config.rs
// ============================================================================
// Module: Datagate Configuration
// Description: Configuration loading and validation for Datagate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: datagate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. The signed URL lifetime is
//! derived here from daily retention minus a safety margin, and validation
//! guarantees the result stays strictly inside both the retention window and
//! the signer's one-week ceiling: a capability URL must never outlive the
//! object it points to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use datagate_core::validate_object_key;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "datagate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DATAGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum allowed request body size in bytes.
pub(crate) const MIN_BODY_BYTES: usize = 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Minimum object-store connect timeout in milliseconds.
pub(crate) const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum object-store connect timeout in milliseconds.
pub(crate) const MAX_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum object-store operation timeout in milliseconds.
pub(crate) const MIN_OPERATION_TIMEOUT_MS: u64 = 500;
/// Maximum object-store operation timeout in milliseconds.
pub(crate) const MAX_OPERATION_TIMEOUT_MS: u64 = 30_000;
/// Minimum token state cache lifetime in seconds.
pub(crate) const MIN_CACHE_TTL_SECONDS: u64 = 5;
/// Maximum token state cache lifetime in seconds.
pub(crate) const MAX_CACHE_TTL_SECONDS: u64 = 600;
/// Minimum daily retention window in days.
pub(crate) const MIN_RETENTION_DAYS: u32 = 1;
/// Maximum daily retention window in days.
pub(crate) const MAX_RETENTION_DAYS: u32 = 30;
/// Minimum signed URL safety margin in seconds.
pub(crate) const MIN_SAFETY_MARGIN_SECONDS: u64 = 600;
/// Maximum signed URL safety margin in seconds.
pub(crate) const MAX_SAFETY_MARGIN_SECONDS: u64 = 86_400;
/// Signer ceiling for a signed URL lifetime in seconds.
pub(crate) const MAX_URL_TTL_SECONDS: u64 = 604_800;

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// Datagate service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatagateConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object-store backend configuration.
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    /// Token state configuration.
    #[serde(default)]
    pub tokens: TokensConfig,
    /// Download issuance configuration.
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

impl DatagateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then `DATAGATE_CONFIG`, then
    /// `datagate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.object_store.validate()?;
        self.tokens.validate()?;
        self.downloads.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let bind = self.bind.trim();
        if bind.is_empty() {
            return Err(ConfigError::Invalid("server.bind must be set".to_string()));
        }
        let _: SocketAddr = bind
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind must be a socket address".to_string()))?;
        if self.max_body_bytes < MIN_BODY_BYTES || self.max_body_bytes > MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be within [{MIN_BODY_BYTES}, {MAX_BODY_BYTES}]"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Object Store Configuration
// ============================================================================

/// Supported object-store providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStoreProvider {
    /// S3-compatible object storage (AWS S3 or Cloudflare R2 via its
    /// S3-compatible endpoint).
    S3,
    /// In-memory store for tests and local development.
    Memory,
}

/// Object-store backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    /// Provider selection, fixed at process start.
    #[serde(default = "default_provider")]
    pub provider: ObjectStoreProvider,
    /// Bucket name (required for the s3 provider).
    #[serde(default)]
    pub bucket: String,
    /// Optional region, defaulting to the environment.
    #[serde(default)]
    pub region: Option<String>,
    /// Optional S3-compatible endpoint, e.g. an R2 account endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Force path-style addressing (S3-compatible stores).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Connect timeout for store calls in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Per-operation timeout for store calls in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bucket: String::new(),
            region: None,
            endpoint: None,
            force_path_style: false,
            allow_http: false,
            connect_timeout_ms: default_connect_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl ObjectStoreConfig {
    /// Validates object-store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when object-store settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == ObjectStoreProvider::S3 {
            if self.bucket.trim().is_empty() {
                return Err(ConfigError::Invalid("object_store.bucket must be set".to_string()));
            }
            if let Some(endpoint) = &self.endpoint {
                let trimmed = endpoint.trim();
                if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                    return Err(ConfigError::Invalid(
                        "object_store.endpoint must include http:// or https://".to_string(),
                    ));
                }
                if trimmed.starts_with("http://") && !self.allow_http {
                    return Err(ConfigError::Invalid(
                        "object_store.endpoint uses http:// without allow_http".to_string(),
                    ));
                }
            }
        }
        validate_timeout_range(
            "object_store.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_CONNECT_TIMEOUT_MS,
            MAX_CONNECT_TIMEOUT_MS,
        )?;
        validate_timeout_range(
            "object_store.operation_timeout_ms",
            self.operation_timeout_ms,
            MIN_OPERATION_TIMEOUT_MS,
            MAX_OPERATION_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// Returns the connect timeout as a duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the per-operation timeout as a duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

// ============================================================================
// SECTION: Token Configuration
// ============================================================================

/// Token state configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TokensConfig {
    /// Object key of the rotating token state document.
    #[serde(default = "default_state_key")]
    pub state_key: String,
    /// Token state cache lifetime in seconds.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            state_key: default_state_key(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl TokensConfig {
    /// Validates token state configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_object_key(&self.state_key)
            .map_err(|err| ConfigError::Invalid(format!("tokens.state_key: {err}")))?;
        if self.cache_ttl_seconds < MIN_CACHE_TTL_SECONDS
            || self.cache_ttl_seconds > MAX_CACHE_TTL_SECONDS
        {
            return Err(ConfigError::Invalid(format!(
                "tokens.cache_ttl_seconds must be within [{MIN_CACHE_TTL_SECONDS}, \
                 {MAX_CACHE_TTL_SECONDS}]"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Download Configuration
// ============================================================================

/// Download link delivery modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Listings carry store-signed capability URLs (primary mode).
    SignedUrl,
    /// Listings carry service-relative proxy URLs; every byte transits the
    /// service and the bucket needs no public grant.
    Proxy,
}

/// Download issuance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadsConfig {
    /// Key prefix the tier name and `.json` suffix are appended to.
    #[serde(default = "default_index_key_prefix")]
    pub index_key_prefix: String,
    /// External daily retention window in days.
    #[serde(default = "default_retention_days")]
    pub daily_retention_days: u32,
    /// Safety margin subtracted from retention for the URL lifetime.
    #[serde(default = "default_safety_margin_seconds")]
    pub url_ttl_safety_margin_seconds: u64,
    /// Link delivery mode for listings.
    #[serde(default = "default_delivery")]
    pub delivery: DeliveryMode,
    /// Public base URL for proxy-mode links (required in proxy mode).
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            index_key_prefix: default_index_key_prefix(),
            daily_retention_days: default_retention_days(),
            url_ttl_safety_margin_seconds: default_safety_margin_seconds(),
            delivery: default_delivery(),
            public_base_url: None,
        }
    }
}

impl DownloadsConfig {
    /// Validates download issuance configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.index_key_prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "downloads.index_key_prefix must be set".to_string(),
            ));
        }
        if prefix.starts_with('/') || prefix.contains('\\') || prefix.contains("..") {
            return Err(ConfigError::Invalid(
                "downloads.index_key_prefix must be a relative key prefix".to_string(),
            ));
        }
        if prefix.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(
                "downloads.index_key_prefix exceeds length limit".to_string(),
            ));
        }
        if self.daily_retention_days < MIN_RETENTION_DAYS
            || self.daily_retention_days > MAX_RETENTION_DAYS
        {
            return Err(ConfigError::Invalid(format!(
                "downloads.daily_retention_days must be within [{MIN_RETENTION_DAYS}, \
                 {MAX_RETENTION_DAYS}]"
            )));
        }
        if self.url_ttl_safety_margin_seconds < MIN_SAFETY_MARGIN_SECONDS
            || self.url_ttl_safety_margin_seconds > MAX_SAFETY_MARGIN_SECONDS
        {
            return Err(ConfigError::Invalid(format!(
                "downloads.url_ttl_safety_margin_seconds must be within \
                 [{MIN_SAFETY_MARGIN_SECONDS}, {MAX_SAFETY_MARGIN_SECONDS}]"
            )));
        }
        let retention_seconds = u64::from(self.daily_retention_days) * 86_400;
        if self.url_ttl_safety_margin_seconds >= retention_seconds {
            return Err(ConfigError::Invalid(
                "downloads.url_ttl_safety_margin_seconds must be less than the retention window"
                    .to_string(),
            ));
        }
        if self.url_ttl_seconds() > MAX_URL_TTL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "signed URL lifetime exceeds the signer ceiling of {MAX_URL_TTL_SECONDS} seconds; \
                 lower daily_retention_days or raise the safety margin"
            )));
        }
        if self.delivery == DeliveryMode::Proxy {
            let base = self.public_base_url.as_deref().unwrap_or_default().trim();
            if base.is_empty() {
                return Err(ConfigError::Invalid(
                    "downloads.public_base_url is required in proxy delivery mode".to_string(),
                ));
            }
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "downloads.public_base_url must include http:// or https://".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Returns the signed URL lifetime in seconds.
    ///
    /// Derived as retention minus the safety margin; validation keeps this
    /// strictly positive and inside the signer ceiling.
    #[must_use]
    pub const fn url_ttl_seconds(&self) -> u64 {
        let retention_seconds = self.daily_retention_days as u64 * 86_400;
        retention_seconds.saturating_sub(self.url_ttl_safety_margin_seconds)
    }

    /// Returns the signed URL lifetime as a duration.
    #[must_use]
    pub const fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_seconds())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a timeout value against an inclusive range.
fn validate_timeout_range(
    field: &str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be within [{min}, {max}]")));
    }
    Ok(())
}

/// Returns the default bind address.
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Returns the default maximum request body size.
pub(crate) const fn default_max_body_bytes() -> usize {
    64 * 1024
}

/// Returns the default object-store provider.
pub(crate) const fn default_provider() -> ObjectStoreProvider {
    ObjectStoreProvider::S3
}

/// Returns the default connect timeout in milliseconds.
pub(crate) const fn default_connect_timeout_ms() -> u64 {
    3_000
}

/// Returns the default operation timeout in milliseconds.
pub(crate) const fn default_operation_timeout_ms() -> u64 {
    5_000
}

/// Returns the default token state key.
fn default_state_key() -> String {
    "config/tier_tokens.json".to_string()
}

/// Returns the default token state cache lifetime in seconds.
pub(crate) const fn default_cache_ttl_seconds() -> u64 {
    60
}

/// Returns the default index key prefix.
fn default_index_key_prefix() -> String {
    "config/download_index_".to_string()
}

/// Returns the default daily retention window in days.
pub(crate) const fn default_retention_days() -> u32 {
    7
}

/// Returns the default signed URL safety margin in seconds.
pub(crate) const fn default_safety_margin_seconds() -> u64 {
    14_400
}

/// Returns the default delivery mode.
pub(crate) const fn default_delivery() -> DeliveryMode {
    DeliveryMode::SignedUrl
}

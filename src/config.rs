use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1500;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 6000;
const DEFAULT_RETRY_MAX_JITTER_MS: u64 = 300;
const DEFAULT_SUBMIT_DELAY_MS: u64 = 250;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Remote tabular store endpoint (the script deployment URL)
    pub store_endpoint: String,

    /// Spreadsheet id used by column-scoped reads
    #[serde(default)]
    pub master_sheet_id: String,

    /// Drive folder receiving uploaded bill images
    #[serde(default)]
    pub upload_folder_id: String,

    /// Server host address
    pub host: String,

    /// Server port (1024-65535)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Per-request HTTP timeout towards the store, in seconds. Distinct
    /// from the retry backoff schedule.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry policy for store writes
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    #[serde(default = "default_retry_max_jitter_ms")]
    pub retry_max_jitter_ms: u64,

    /// Fixed delay between sequential line writes, in milliseconds
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}
fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}
fn default_retry_max_delay_ms() -> u64 {
    DEFAULT_RETRY_MAX_DELAY_MS
}
fn default_retry_max_jitter_ms() -> u64 {
    DEFAULT_RETRY_MAX_JITTER_MS
}
fn default_submit_delay_ms() -> u64 {
    DEFAULT_SUBMIT_DELAY_MS
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.cors_allow_any_origin || self.is_development()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn store_endpoint_url(&self) -> Result<Url, AppConfigError> {
        Url::parse(&self.store_endpoint).map_err(|e| {
            error!("Invalid store_endpoint '{}': {}", self.store_endpoint, e);
            AppConfigError::Invalid(format!("store_endpoint is not a valid URL: {e}"))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> crate::sheets::retry::RetryPolicy {
        crate::sheets::retry::RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            max_jitter: Duration::from_millis(self.retry_max_jitter_ms),
        }
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0:?}")]
    Validation(validator::ValidationErrors),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from `config/default.toml`, an environment-specific
/// file, and `APP__*` environment overrides, in that order.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // A missing store endpoint gets its own message; nothing works without it.
    if config.get_string("store_endpoint").is_err() {
        error!("Store endpoint is not configured. Set APP__STORE_ENDPOINT to the script deployment URL.");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "store_endpoint is required but not configured".into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;
    app_config.store_endpoint_url()?;

    Ok(app_config)
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("procure_api={level},tower_http=debug");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            store_endpoint: "https://example.com/exec".into(),
            master_sheet_id: String::new(),
            upload_folder_id: String::new(),
            host: "127.0.0.1".into(),
            port: 8080,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            request_timeout_secs: 30,
            retry_max_attempts: 3,
            retry_base_delay_ms: 1500,
            retry_max_delay_ms: 6000,
            retry_max_jitter_ms: 300,
            submit_delay_ms: 250,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
        }
    }

    #[test]
    fn development_defaults_to_permissive_cors() {
        assert!(base_config().should_allow_permissive_cors());
        let mut prod = base_config();
        prod.environment = "production".into();
        assert!(!prod.should_allow_permissive_cors());
    }

    #[test]
    fn retry_policy_reflects_settings() {
        let policy = base_config().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1500));
        assert_eq!(policy.max_delay, Duration::from_millis(6000));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let mut cfg = base_config();
        cfg.store_endpoint = "not a url".into();
        assert!(cfg.store_endpoint_url().is_err());
    }
}

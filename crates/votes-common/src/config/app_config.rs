//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use votes_core::value_objects::{
    DEFAULT_COUNTERS_TTL_HOURS, DEFAULT_INACTIVE_ROMANCE_TTL_DAYS,
    DEFAULT_MUTUAL_ROMANCE_TTL_DAYS, DEFAULT_ONE_SIDED_ROMANCE_TTL_DAYS,
    DEFAULT_VERSION_CONFLICT_RETRIES,
};
use votes_core::{RomanceRetention, VotingPolicy};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub voting: VotingConfig,
    pub messaging: MessagingConfig,
    pub worker: WorkerConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue("APP_ENV", s.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Vote processing knobs: conflict retries and retention windows
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    #[serde(default = "default_version_conflict_retries")]
    pub version_conflict_retries: u32,
    #[serde(default = "default_counters_ttl_hours")]
    pub counters_ttl_hours: u32,
    #[serde(default = "default_mutual_romance_ttl_days")]
    pub mutual_romance_ttl_days: u32,
    #[serde(default = "default_one_sided_romance_ttl_days")]
    pub one_sided_romance_ttl_days: u32,
    #[serde(default = "default_inactive_romance_ttl_days")]
    pub inactive_romance_ttl_days: u32,
}

impl VotingConfig {
    #[must_use]
    pub fn policy(&self) -> VotingPolicy {
        VotingPolicy {
            version_conflict_retries: self.version_conflict_retries,
            counters_ttl_hours: self.counters_ttl_hours,
            romance_retention: RomanceRetention::from_days(
                self.mutual_romance_ttl_days,
                self.one_sided_romance_ttl_days,
                self.inactive_romance_ttl_days,
            ),
        }
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            version_conflict_retries: default_version_conflict_retries(),
            counters_ttl_hours: default_counters_ttl_hours(),
            mutual_romance_ttl_days: default_mutual_romance_ttl_days(),
            one_sided_romance_ttl_days: default_one_sided_romance_ttl_days(),
            inactive_romance_ttl_days: default_inactive_romance_ttl_days(),
        }
    }
}

/// Message bus consumer settings
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,
    /// Unacknowledged deliveries become visible again after this many seconds
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,
    /// Deliveries before a message is dead-lettered
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            consumer_group: default_consumer_group(),
            consumer_name: default_consumer_name(),
            visibility_timeout_secs: default_visibility_timeout_secs(),
            max_deliveries: default_max_deliveries(),
            batch_size: default_batch_size(),
            block_ms: default_block_ms(),
        }
    }
}

/// Background worker settings
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
    #[serde(default = "default_purge_batch_size")]
    pub purge_batch_size: u32,
}

impl WorkerConfig {
    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "user-votes-storage".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

fn default_redis_max_connections() -> u32 {
    16
}

fn default_version_conflict_retries() -> u32 {
    DEFAULT_VERSION_CONFLICT_RETRIES
}

fn default_counters_ttl_hours() -> u32 {
    DEFAULT_COUNTERS_TTL_HOURS
}

fn default_mutual_romance_ttl_days() -> u32 {
    DEFAULT_MUTUAL_ROMANCE_TTL_DAYS
}

fn default_one_sided_romance_ttl_days() -> u32 {
    DEFAULT_ONE_SIDED_ROMANCE_TTL_DAYS
}

fn default_inactive_romance_ttl_days() -> u32 {
    DEFAULT_INACTIVE_ROMANCE_TTL_DAYS
}

fn default_consumer_group() -> String {
    "votes-worker".to_string()
}

fn default_consumer_name() -> String {
    "worker-1".to_string()
}

fn default_visibility_timeout_secs() -> u64 {
    90
}

fn default_max_deliveries() -> u32 {
    5
}

fn default_batch_size() -> usize {
    10
}

fn default_block_ms() -> u64 {
    1000
}

fn default_purge_interval_secs() -> u64 {
    3600
}

fn default_purge_batch_size() -> u32 {
    500
}

/// Read and parse an optional variable, falling back to `default` when unset
fn var_or<T: FromStr>(name: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
                port: var_or("SERVER_PORT", default_port)?,
                request_timeout_secs: var_or("REQUEST_TIMEOUT_SECS", default_request_timeout_secs)?,
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: var_or("DATABASE_RUN_MIGRATIONS", default_run_migrations)?,
            },
            redis: RedisConfig {
                url: required_var("REDIS_URL")?,
                max_connections: var_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            voting: VotingConfig {
                version_conflict_retries: var_or(
                    "VERSION_CONFLICT_RETRIES",
                    default_version_conflict_retries,
                )?,
                counters_ttl_hours: var_or("COUNTERS_TTL_HOURS", default_counters_ttl_hours)?,
                mutual_romance_ttl_days: var_or(
                    "MUTUAL_ROMANCE_TTL_DAYS",
                    default_mutual_romance_ttl_days,
                )?,
                one_sided_romance_ttl_days: var_or(
                    "ONE_SIDED_ROMANCE_TTL_DAYS",
                    default_one_sided_romance_ttl_days,
                )?,
                inactive_romance_ttl_days: var_or(
                    "INACTIVE_ROMANCE_TTL_DAYS",
                    default_inactive_romance_ttl_days,
                )?,
            },
            messaging: MessagingConfig {
                consumer_group: env::var("MESSAGING_CONSUMER_GROUP")
                    .unwrap_or_else(|_| default_consumer_group()),
                consumer_name: env::var("MESSAGING_CONSUMER_NAME")
                    .unwrap_or_else(|_| default_consumer_name()),
                visibility_timeout_secs: var_or(
                    "MESSAGING_VISIBILITY_TIMEOUT_SECS",
                    default_visibility_timeout_secs,
                )?,
                max_deliveries: var_or("MESSAGING_MAX_DELIVERIES", default_max_deliveries)?,
                batch_size: var_or("MESSAGING_BATCH_SIZE", default_batch_size)?,
                block_ms: var_or("MESSAGING_BLOCK_MS", default_block_ms)?,
            },
            worker: WorkerConfig {
                purge_interval_secs: var_or("PURGE_INTERVAL_SECS", default_purge_interval_secs)?,
                purge_batch_size: var_or("PURGE_BATCH_SIZE", default_purge_batch_size)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

//! Structured logging for the API server and the worker
//!
//! Production writes one JSON object per event; other environments write
//! human-readable lines. `RUST_LOG` replaces the computed filter when set.

use std::env;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Crates whose events pass the default filter at the configured level
const OWN_TARGETS: [&str; 7] = [
    "votes_api",
    "votes_worker",
    "votes_service",
    "votes_db",
    "votes_cache",
    "votes_core",
    "votes_common",
];

/// Output encoding of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for this workspace's crates
    pub level: Level,
    /// Level for everything else (sqlx, redis, hyper)
    pub dependency_level: Level,
    pub format: LogFormat,
    /// Log span open and close, useful to time the retry loop
    pub span_events: bool,
}

impl TracingConfig {
    /// Sensible defaults for an environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                dependency_level: Level::INFO,
                format: LogFormat::Pretty,
                span_events: false,
            },
            Environment::Staging => Self {
                level: Level::DEBUG,
                dependency_level: Level::WARN,
                format: LogFormat::Json,
                span_events: false,
            },
            Environment::Production => Self {
                level: Level::INFO,
                dependency_level: Level::WARN,
                format: LogFormat::Json,
                span_events: false,
            },
        }
    }

    /// Environment defaults from `APP_ENV`, adjusted by `LOG_LEVEL`, `LOG_FORMAT`
    /// and `LOG_SPAN_EVENTS`
    #[must_use]
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let mut config = Self::for_environment(app_env);

        if let Some(level) = env::var("LOG_LEVEL").ok().and_then(|s| s.parse().ok()) {
            config.level = level;
        }
        if let Some(format) = env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            config.format = format;
        }
        if let Some(span_events) = env::var("LOG_SPAN_EVENTS").ok().and_then(|s| s.parse().ok()) {
            config.span_events = span_events;
        }
        config
    }

    /// Filter directive used when `RUST_LOG` is absent
    pub fn filter_directive(&self) -> String {
        let mut directive = self.dependency_level.to_string().to_lowercase();
        for target in OWN_TARGETS {
            directive.push_str(&format!(",{target}={}", self.level.to_string().to_lowercase()));
        }
        directive
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

fn subscriber(config: &TracingConfig) -> impl SubscriberInitExt {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let json = (config.format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(config.fmt_span())
    });
    let pretty = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(config.fmt_span())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
}

/// Install the global subscriber configured from the environment
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(&TracingConfig::from_env())
}

pub fn try_init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    subscriber(config)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

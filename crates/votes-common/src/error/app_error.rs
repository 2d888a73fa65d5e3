//! Errors at the process level: startup, configuration and infrastructure
//!
//! Request handling works with `DomainError` and maps it to HTTP through
//! `domain_status_code`; `AppError` wraps it when a failure has to leave the
//! process entry points.

use votes_core::DomainError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status_code(e),
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) | Self::Config(_) => 500,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Status code for a domain error
///
/// Rule violations are client errors. Exhausted conflict retries mean the
/// pair is under heavy contention, which the client may retry later.
pub fn domain_status_code(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_validation() || e.is_rule_violation() {
        400
    } else if matches!(e, DomainError::VersionConflictExhausted { .. }) {
        503
    } else {
        500
    }
}

pub type AppResult<T> = Result<T, AppError>;

//! Application state
//!
//! Holds the shared state for the Axum application: the service context and
//! the backend pools probed by the readiness check.

use std::sync::Arc;

use votes_cache::RedisPool;
use votes_db::PgPool;
use votes_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// PostgreSQL pool, absent when romances live elsewhere
    database: Option<PgPool>,
    /// Redis pool, absent when counters and the bus live elsewhere
    redis: Option<Arc<RedisPool>>,
}

impl AppState {
    /// State without backend pools; readiness reports every check as healthy
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
            database: None,
            redis: None,
        }
    }

    /// Attach the pools used by the readiness check
    pub fn with_backends(mut self, database: PgPool, redis: Arc<RedisPool>) -> Self {
        self.database = Some(database);
        self.redis = Some(redis);
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("database", &self.database.is_some())
            .field("redis", &self.redis.is_some())
            .finish()
    }
}

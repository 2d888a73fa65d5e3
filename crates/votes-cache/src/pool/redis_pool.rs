//! Redis connections for counters and streams.
//!
//! Counter commands and stream acks borrow a pooled connection. Blocking
//! `XREADGROUP` calls open a dedicated connection so a parked reader never
//! holds a pool slot.

use deadpool_redis::{Config, Pool, Runtime};
use redis::aio::MultiplexedConnection;
use votes_core::DomainError;

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// e.g. `redis://:password@localhost:6379/0`
    pub url: String,
    pub max_connections: usize,
}

impl From<&votes_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &votes_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections.max(1) as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Invalid Redis configuration: {0}")]
    Config(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),
}

impl RedisPoolError {
    /// A failure of the counter store
    pub fn into_cache_error(self) -> DomainError {
        DomainError::CacheError(self.to_string())
    }

    /// A failure of the message bus
    pub fn into_messaging_error(self) -> DomainError {
        DomainError::MessagingError(self.to_string())
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Cheap to clone; clones share the pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    client: redis::Client,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .field("max_size", &status.max_size)
            .finish()
    }
}

/// Host part of a Redis URL, without credentials
fn redacted(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| RedisPoolError::Config(e.to_string()))?;
        let pool = Config::from_url(config.url.as_str())
            .builder()
            .map_err(|e| RedisPoolError::Config(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Config(e.to_string()))?;

        tracing::info!(
            host = %redacted(&config.url),
            max_connections = config.max_connections,
            "Redis pool ready"
        );
        Ok(Self { pool, client })
    }

    pub fn from_config(config: &votes_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// A connection outside the pool, for blocking reads
    pub async fn dedicated(&self) -> RedisResult<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// `PING` over a pooled connection
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

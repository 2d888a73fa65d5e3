//! # votes-cache
//!
//! Redis layer for vote counters and the stream message bus.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Counters**: Per-user counter hashes for lifetime and hourly buckets
//! - **Streams**: Consumer-group message bus with redelivery and dead-lettering
//!
//! ## Example
//!
//! ```ignore
//! use votes_cache::{RedisCounterRepository, RedisPool, StreamPublisher};
//!
//! let pool = RedisPool::from_config(&config.redis)?;
//! let counters = RedisCounterRepository::new(pool.clone(), chrono::Duration::hours(48));
//! let publisher = StreamPublisher::new(pool.clone());
//!
//! votes_core::publish(&publisher, &DeleteRomancesMessage::new(user_key)).await?;
//! ```

pub mod counters;
pub mod pool;
pub mod streams;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export counter types
pub use counters::{counters_key, RedisCounterRepository, COUNTERS_KEY_PREFIX};

// Re-export stream types
pub use streams::{
    dead_letter_key, stream_key, StreamConfig, StreamDelivery, StreamPublisher, StreamSubscriber,
    StreamSubscription, DEAD_LETTER_SUFFIX, PAYLOAD_FIELD, STREAM_KEY_PREFIX,
};

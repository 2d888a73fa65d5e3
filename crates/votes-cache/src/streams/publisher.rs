//! Publishes encoded messages with `XADD`.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, instrument};

use super::topics::{stream_key, PAYLOAD_FIELD};
use crate::pool::{RedisPool, RedisPoolError};
use votes_core::{MessagePublisher, MessagingResult};

/// Stream publisher
#[derive(Debug, Clone)]
pub struct StreamPublisher {
    pool: RedisPool,
}

impl StreamPublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessagePublisher for StreamPublisher {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> MessagingResult<String> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(RedisPoolError::into_messaging_error)?;

        let id: String = conn
            .xadd(stream_key(topic), "*", &[(PAYLOAD_FIELD, payload.as_slice())])
            .await
            .map_err(|e| RedisPoolError::from(e).into_messaging_error())?;

        debug!(id = %id, "Message published");
        Ok(id)
    }
}

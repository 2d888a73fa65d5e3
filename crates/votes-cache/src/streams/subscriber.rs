//! Consumer-group subscriptions over Redis Streams.
//!
//! A subscription reads new entries with `XREADGROUP`. Entries that stay
//! unacknowledged longer than the visibility timeout are claimed back with
//! `XCLAIM` and delivered again. An entry that already used all of its
//! deliveries is copied to the dead-letter stream and acknowledged.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{
    StreamClaimReply, StreamId, StreamPendingCountReply, StreamReadOptions, StreamReadReply,
};
use redis::AsyncCommands;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::config::StreamConfig;
use super::topics::{dead_letter_key, stream_key, PAYLOAD_FIELD};
use crate::pool::{RedisPool, RedisPoolError};
use votes_core::{
    Delivery, DomainError, MessageSubscriber, MessagingResult, Subscription,
};

fn bus_error(err: redis::RedisError) -> DomainError {
    RedisPoolError::from(err).into_messaging_error()
}

fn millis(duration: std::time::Duration) -> usize {
    usize::try_from(duration.as_millis()).unwrap_or(usize::MAX)
}

/// Opens consumer-group subscriptions
#[derive(Debug, Clone)]
pub struct StreamSubscriber {
    pool: RedisPool,
    config: StreamConfig,
}

impl StreamSubscriber {
    #[must_use]
    pub fn new(pool: RedisPool, config: StreamConfig) -> Self {
        Self { pool, config }
    }
}

#[async_trait]
impl MessageSubscriber for StreamSubscriber {
    #[instrument(skip(self), fields(group = %self.config.consumer_group, consumer = %self.config.consumer_name))]
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn Subscription>> {
        let mut conn = self
            .pool
            .dedicated()
            .await
            .map_err(RedisPoolError::into_messaging_error)?;

        let key = stream_key(topic);
        // Start from the beginning so entries published before the group existed are kept
        let created: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(&key, &self.config.consumer_group, "0")
            .await;
        match created {
            Ok(()) => info!(stream = %key, "Consumer group created"),
            Err(e) if e.code() == Some("BUSYGROUP") => {}
            Err(e) => return Err(bus_error(e)),
        }

        info!(stream = %key, "Subscribed");
        Ok(Box::new(StreamSubscription {
            conn,
            topic: topic.to_string(),
            key,
            config: self.config.clone(),
            buffer: VecDeque::new(),
            last_reclaim: None,
        }))
    }
}

/// An open consumer-group subscription on one stream
pub struct StreamSubscription {
    conn: MultiplexedConnection,
    topic: String,
    key: String,
    config: StreamConfig,
    buffer: VecDeque<StreamDelivery>,
    last_reclaim: Option<Instant>,
}

impl StreamSubscription {
    fn reclaim_due(&self) -> bool {
        self.last_reclaim
            .map_or(true, |at| at.elapsed() >= self.config.reclaim_interval())
    }

    fn delivery(&self, entry: &StreamId, attempt: u32) -> StreamDelivery {
        StreamDelivery {
            conn: self.conn.clone(),
            key: self.key.clone(),
            group: self.config.consumer_group.clone(),
            id: entry.id.clone(),
            payload: entry.get::<Vec<u8>>(PAYLOAD_FIELD).unwrap_or_default(),
            attempt,
        }
    }

    /// Claim entries idle past the visibility timeout
    async fn reclaim(&mut self) -> MessagingResult<()> {
        self.last_reclaim = Some(Instant::now());

        let pending: StreamPendingCountReply = self
            .conn
            .xpending_count(
                &self.key,
                &self.config.consumer_group,
                "-",
                "+",
                self.config.batch_size,
            )
            .await
            .map_err(bus_error)?;

        let min_idle = millis(self.config.visibility_timeout);
        let delivered: HashMap<String, usize> = pending
            .ids
            .into_iter()
            .filter(|entry| entry.last_delivered_ms >= min_idle)
            .map(|entry| (entry.id, entry.times_delivered))
            .collect();
        if delivered.is_empty() {
            return Ok(());
        }

        let ids: Vec<&String> = delivered.keys().collect();
        let claimed: StreamClaimReply = self
            .conn
            .xclaim(
                &self.key,
                &self.config.consumer_group,
                &self.config.consumer_name,
                min_idle,
                ids.as_slice(),
            )
            .await
            .map_err(bus_error)?;

        for entry in claimed.ids {
            let previous = delivered.get(&entry.id).copied().unwrap_or(0);
            let previous = u32::try_from(previous).unwrap_or(u32::MAX);
            if previous >= self.config.max_deliveries {
                self.dead_letter(&entry, previous).await?;
            } else {
                debug!(id = %entry.id, attempt = previous + 1, "Reclaimed pending entry");
                let delivery = self.delivery(&entry, previous + 1);
                self.buffer.push_back(delivery);
            }
        }
        Ok(())
    }

    async fn dead_letter(&mut self, entry: &StreamId, deliveries: u32) -> MessagingResult<()> {
        let payload = entry.get::<Vec<u8>>(PAYLOAD_FIELD).unwrap_or_default();
        let dead_letter = dead_letter_key(&self.topic);
        let deliveries = deliveries.to_string();

        let _: String = self
            .conn
            .xadd(
                &dead_letter,
                "*",
                &[
                    (PAYLOAD_FIELD, payload.as_slice()),
                    ("source_id", entry.id.as_bytes()),
                    ("deliveries", deliveries.as_bytes()),
                ],
            )
            .await
            .map_err(bus_error)?;
        let _: i64 = self
            .conn
            .xack(&self.key, &self.config.consumer_group, &[&entry.id])
            .await
            .map_err(bus_error)?;

        warn!(
            id = %entry.id,
            deliveries = %deliveries,
            dead_letter = %dead_letter,
            "Message exhausted its deliveries and was dead-lettered"
        );
        Ok(())
    }

    /// Read entries never delivered to this group
    async fn read_new(&mut self) -> MessagingResult<()> {
        let options = StreamReadOptions::default()
            .group(&self.config.consumer_group, &self.config.consumer_name)
            .count(self.config.batch_size)
            .block(millis(self.config.block));

        let reply: Option<StreamReadReply> = self
            .conn
            .xread_options(&[&self.key], &[">"], &options)
            .await
            .map_err(bus_error)?;

        let Some(reply) = reply else {
            return Ok(());
        };
        for stream in reply.keys {
            for entry in stream.ids {
                let delivery = self.delivery(&entry, 1);
                self.buffer.push_back(delivery);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Subscription for StreamSubscription {
    /// Blocks until an entry is available. Stream subscriptions never end on
    /// their own; they stop when closed.
    async fn next(&mut self) -> MessagingResult<Option<Box<dyn Delivery>>> {
        loop {
            if let Some(delivery) = self.buffer.pop_front() {
                return Ok(Some(Box::new(delivery)));
            }
            if self.reclaim_due() {
                self.reclaim().await?;
                if !self.buffer.is_empty() {
                    continue;
                }
            }
            self.read_new().await?;
        }
    }

    async fn close(self: Box<Self>) -> MessagingResult<()> {
        // Buffered entries stay pending and are reclaimed after the visibility timeout
        info!(
            stream = %self.key,
            unhandled = self.buffer.len(),
            "Subscription closed"
        );
        Ok(())
    }
}

/// One delivery of a stream entry
pub struct StreamDelivery {
    conn: MultiplexedConnection,
    key: String,
    group: String,
    id: String,
    payload: Vec<u8>,
    attempt: u32,
}

#[async_trait]
impl Delivery for StreamDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn delivery_id(&self) -> &str {
        &self.id
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    async fn ack(mut self: Box<Self>) -> MessagingResult<()> {
        let _: i64 = self
            .conn
            .xack(&self.key, &self.group, &[&self.id])
            .await
            .map_err(bus_error)?;
        Ok(())
    }

    async fn nack(self: Box<Self>) -> MessagingResult<()> {
        // Left pending; reclaim redelivers it once the visibility timeout passes
        debug!(id = %self.id, attempt = self.attempt, "Message returned for redelivery");
        Ok(())
    }
}

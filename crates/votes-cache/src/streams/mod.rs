//! Redis Streams message bus.
//!
//! Each topic is a stream. Consumers read through a consumer group, so every
//! message is handled by one worker of the group. Unacknowledged entries are
//! reclaimed after the visibility timeout and moved to a dead-letter stream
//! once they run out of deliveries.

mod config;
mod publisher;
mod subscriber;
mod topics;

pub use config::StreamConfig;
pub use publisher::StreamPublisher;
pub use subscriber::{StreamDelivery, StreamSubscriber, StreamSubscription};
pub use topics::{dead_letter_key, stream_key, DEAD_LETTER_SUFFIX, PAYLOAD_FIELD, STREAM_KEY_PREFIX};

use std::time::Duration;

/// Consumer-group settings for stream subscriptions
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub consumer_group: String,
    pub consumer_name: String,
    /// Idle time after which an unacknowledged entry is redelivered
    pub visibility_timeout: Duration,
    /// Deliveries before an entry is dead-lettered
    pub max_deliveries: u32,
    pub batch_size: usize,
    /// How long one read waits for new entries
    pub block: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::from(&votes_common::MessagingConfig::default())
    }
}

impl From<&votes_common::MessagingConfig> for StreamConfig {
    fn from(config: &votes_common::MessagingConfig) -> Self {
        Self {
            consumer_group: config.consumer_group.clone(),
            consumer_name: config.consumer_name.clone(),
            visibility_timeout: Duration::from_secs(config.visibility_timeout_secs),
            max_deliveries: config.max_deliveries.max(1),
            batch_size: config.batch_size.max(1),
            block: Duration::from_millis(config.block_ms),
        }
    }
}

impl StreamConfig {
    /// How often pending entries are scanned for reclaim
    pub fn reclaim_interval(&self) -> Duration {
        (self.visibility_timeout / 2).max(Duration::from_secs(1))
    }
}

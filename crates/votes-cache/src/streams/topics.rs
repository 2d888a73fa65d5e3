//! Stream naming conventions.

/// Key prefix for topic streams
pub const STREAM_KEY_PREFIX: &str = "stream:";
/// Suffix of the stream holding messages that exhausted their deliveries
pub const DEAD_LETTER_SUFFIX: &str = ":dead-letter";
/// Entry field carrying the encoded message
pub const PAYLOAD_FIELD: &str = "payload";

/// `stream:{topic}`
pub fn stream_key(topic: &str) -> String {
    format!("{STREAM_KEY_PREFIX}{topic}")
}

/// `stream:{topic}:dead-letter`
pub fn dead_letter_key(topic: &str) -> String {
    format!("{STREAM_KEY_PREFIX}{topic}{DEAD_LETTER_SUFFIX}")
}

//! Vote counters stored as Redis hashes.

mod counter_store;

pub use counter_store::{counters_key, RedisCounterRepository, COUNTERS_KEY_PREFIX};

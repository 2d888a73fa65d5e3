//! Domain entities - core business objects

mod counters_group;
mod romance;
mod vote;

pub use counters_group::CountersGroup;
pub use romance::Romance;
pub use vote::{to_storage_precision, Vote};

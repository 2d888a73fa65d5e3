//! # votes-core
//!
//! Domain layer containing entities, value objects, repository and messaging
//! traits, and bus messages.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{to_storage_precision, CountersGroup, Romance, Vote};
pub use error::DomainError;
pub use events::DeleteRomancesMessage;
pub use traits::{
    publish, CounterRepository, Delivery, Message, MessageHandler, MessagePublisher,
    MessageSubscriber, MessagingResult, RepoResult, RomanceRepository, Subscription,
};
pub use value_objects::{
    plan_increments, ActiveUserKey, CanonicalPairKey, CounterField, CounterIncrement,
    CounterUpdateGroup, CountryId, HourBucket, HourOffsets, PairSide, Polarity, RomanceCategory,
    RomanceRetention, VoteIdentity, VoteType, VotingPolicy,
};

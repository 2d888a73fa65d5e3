//! Value objects - immutable types that represent domain concepts

mod counter_update;
mod hour_bucket;
mod identity;
mod policy;
mod vote_type;

pub use counter_update::{
    plan_increments, CounterField, CounterIncrement, CounterUpdateGroup, Polarity,
};
pub use hour_bucket::{HourBucket, HourOffsets};
pub use identity::{ActiveUserKey, CanonicalPairKey, CountryId, PairSide, VoteIdentity};
pub use policy::{
    RomanceCategory, RomanceRetention, VotingPolicy, DEFAULT_COUNTERS_TTL_HOURS,
    DEFAULT_INACTIVE_ROMANCE_TTL_DAYS, DEFAULT_MUTUAL_ROMANCE_TTL_DAYS,
    DEFAULT_ONE_SIDED_ROMANCE_TTL_DAYS, DEFAULT_VERSION_CONFLICT_RETRIES,
};
pub use vote_type::{VoteType, VoteTypeParseError};

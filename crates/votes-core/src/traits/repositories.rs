//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{CountersGroup, Romance};
use crate::error::DomainError;
use crate::value_objects::{ActiveUserKey, CanonicalPairKey, CounterField, HourBucket, VoteIdentity};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Romance Repository
// ============================================================================

#[async_trait]
pub trait RomanceRepository: Send + Sync {
    /// Load the romance of a pair, oriented so `identity` is the active side.
    ///
    /// Fails with `RomanceNotFound` when no live row exists.
    async fn get(&self, identity: &VoteIdentity) -> RepoResult<Romance>;

    /// Write `romance` if the stored version still equals `expected_version`.
    ///
    /// `expected_version == 0` means the row must not exist yet. On success the
    /// stored version is `expected_version + 1` and the stored romance is
    /// returned. A romance with both sides `Empty` removes the row instead.
    /// Fails with `VersionConflict` when another writer got there first.
    async fn conditional_put(
        &self,
        romance: &Romance,
        expected_version: u32,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<Romance>;

    /// Delete a pair's row. Returns whether a row was removed.
    async fn delete(&self, key: &CanonicalPairKey) -> RepoResult<bool>;

    /// Keys of romances involving a user, from either side of the pair
    async fn find_keys_by_user(
        &self,
        user_key: &ActiveUserKey,
        limit: u32,
    ) -> RepoResult<Vec<CanonicalPairKey>>;

    /// Remove up to `limit` rows whose retention ended before `now`
    async fn purge_expired(&self, now: DateTime<Utc>, limit: u32) -> RepoResult<u64>;
}

// ============================================================================
// Counter Repository
// ============================================================================

#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Add one to a counter. Hourly rows expire after the configured window.
    async fn increment(
        &self,
        user_key: &ActiveUserKey,
        hour_bucket: HourBucket,
        field: CounterField,
    ) -> RepoResult<()>;

    /// Counters of one bucket; all zeros when the row does not exist
    async fn get(&self, user_key: &ActiveUserKey, hour_bucket: HourBucket) -> RepoResult<CountersGroup>;

    /// Counters of several buckets, in the order requested
    async fn get_many(
        &self,
        user_key: &ActiveUserKey,
        hour_buckets: &[HourBucket],
    ) -> RepoResult<Vec<CountersGroup>> {
        let mut groups = Vec::with_capacity(hour_buckets.len());
        for &bucket in hour_buckets {
            groups.push(self.get(user_key, bucket).await?);
        }
        Ok(groups)
    }
}

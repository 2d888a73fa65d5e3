//! In-memory romance store with compare-and-swap on `version`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use votes_core::traits::{RepoResult, RomanceRepository};
use votes_core::{ActiveUserKey, CanonicalPairKey, DomainError, PairSide, Romance, VoteIdentity};

#[derive(Debug, Clone)]
struct StoredRomance {
    /// Oriented from the low side of the pair
    romance: Romance,
    expires_at: DateTime<Utc>,
}

impl StoredRomance {
    fn live_version(&self, now: DateTime<Utc>) -> u32 {
        if self.expires_at > now {
            self.romance.version
        } else {
            0
        }
    }
}

fn orient(romance: Romance, side: PairSide) -> Romance {
    match side {
        PairSide::Low => romance,
        PairSide::High => romance.reversed(),
    }
}

/// Romance rows keyed by canonical pair, one entry lock per pair
#[derive(Debug, Default)]
pub struct MemoryRomanceRepository {
    rows: DashMap<CanonicalPairKey, StoredRomance>,
    conflicts: AtomicU32,
}

impl MemoryRomanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, expired ones included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn expires_at(&self, key: &CanonicalPairKey) -> Option<DateTime<Utc>> {
        self.rows.get(key).map(|row| row.expires_at)
    }

    /// Conditional writes rejected so far
    pub fn conflicts(&self) -> u32 {
        self.conflicts.load(Ordering::SeqCst)
    }

    fn conflict(&self) -> DomainError {
        self.conflicts.fetch_add(1, Ordering::SeqCst);
        DomainError::VersionConflict
    }
}

#[async_trait]
impl RomanceRepository for MemoryRomanceRepository {
    async fn get(&self, identity: &VoteIdentity) -> RepoResult<Romance> {
        let (key, side) = identity.pair_key();
        let now = Utc::now();
        let row = self
            .rows
            .get(&key)
            .filter(|row| row.expires_at > now)
            .ok_or(DomainError::RomanceNotFound)?;
        Ok(orient(row.romance.clone(), side))
    }

    async fn conditional_put(
        &self,
        romance: &Romance,
        expected_version: u32,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<Romance> {
        let (key, side) = romance.pair_key();
        let now = Utc::now();
        let mut stored = orient(romance.clone(), side);

        match self.rows.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().live_version(now) != expected_version {
                    return Err(self.conflict());
                }
                if romance.is_empty() {
                    entry.remove();
                    stored.version = 0;
                } else {
                    stored.version = expected_version + 1;
                    entry.insert(StoredRomance {
                        romance: stored.clone(),
                        expires_at,
                    });
                }
            }
            Entry::Vacant(entry) => {
                if expected_version != 0 {
                    return Err(self.conflict());
                }
                if romance.is_empty() {
                    stored.version = 0;
                } else {
                    stored.version = 1;
                    entry.insert(StoredRomance {
                        romance: stored.clone(),
                        expires_at,
                    });
                }
            }
        }

        Ok(orient(stored, side))
    }

    async fn delete(&self, key: &CanonicalPairKey) -> RepoResult<bool> {
        Ok(self.rows.remove(key).is_some())
    }

    async fn find_keys_by_user(
        &self,
        user_key: &ActiveUserKey,
        limit: u32,
    ) -> RepoResult<Vec<CanonicalPairKey>> {
        Ok(self
            .rows
            .iter()
            .map(|row| *row.key())
            .filter(|key| {
                key.country_id() == user_key.country_id && key.side_of(user_key.user_id).is_some()
            })
            .take(limit.max(1) as usize)
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>, limit: u32) -> RepoResult<u64> {
        let expired: Vec<CanonicalPairKey> = self
            .rows
            .iter()
            .filter(|row| row.expires_at <= now)
            .map(|row| *row.key())
            .take(limit.max(1) as usize)
            .collect();

        let mut purged = 0;
        for key in expired {
            if self.rows.remove(&key).is_some() {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

/// Wraps a store and rejects the first `n` conditional writes as conflicts
pub struct ContendedRomanceRepository {
    inner: Arc<dyn RomanceRepository>,
    remaining: AtomicU32,
    attempts: AtomicU32,
}

impl ContendedRomanceRepository {
    pub fn new(inner: Arc<dyn RomanceRepository>, conflicts: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(conflicts),
            attempts: AtomicU32::new(0),
        }
    }

    /// Conditional writes attempted so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RomanceRepository for ContendedRomanceRepository {
    async fn get(&self, identity: &VoteIdentity) -> RepoResult<Romance> {
        self.inner.get(identity).await
    }

    async fn conditional_put(
        &self,
        romance: &Romance,
        expected_version: u32,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<Romance> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DomainError::VersionConflict);
        }
        self.inner
            .conditional_put(romance, expected_version, expires_at)
            .await
    }

    async fn delete(&self, key: &CanonicalPairKey) -> RepoResult<bool> {
        self.inner.delete(key).await
    }

    async fn find_keys_by_user(
        &self,
        user_key: &ActiveUserKey,
        limit: u32,
    ) -> RepoResult<Vec<CanonicalPairKey>> {
        self.inner.find_keys_by_user(user_key, limit).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>, limit: u32) -> RepoResult<u64> {
        self.inner.purge_expired(now, limit).await
    }
}

//! Counter rows as Redis hashes.
//!
//! One hash per user and hour bucket, one field per counter. Hourly hashes
//! carry an absolute expiry at the end of the retention window; lifetime
//! hashes never expire.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::pool::RedisPool;
use votes_core::{
    ActiveUserKey, CounterField, CounterRepository, CountersGroup, HourBucket, RepoResult,
};

/// Key prefix for counter hashes
pub const COUNTERS_KEY_PREFIX: &str = "counters:";

/// `counters:{country}:{user}:{bucket}`
pub fn counters_key(user_key: &ActiveUserKey, hour_bucket: HourBucket) -> String {
    format!(
        "{COUNTERS_KEY_PREFIX}{}:{}:{}",
        user_key.country_id, user_key.user_id, hour_bucket
    )
}

/// Counter repository backed by Redis
#[derive(Debug, Clone)]
pub struct RedisCounterRepository {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisCounterRepository {
    /// `ttl` is how long an hourly row lives after its hour starts
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn group_from_hash(
        user_key: &ActiveUserKey,
        hour_bucket: HourBucket,
        values: HashMap<String, u32>,
    ) -> CountersGroup {
        let mut group = CountersGroup::empty(*user_key, hour_bucket);
        for (name, value) in values {
            if let Some(field) = CounterField::parse(&name) {
                group.set(field, value);
            }
        }
        group
    }
}

#[async_trait]
impl CounterRepository for RedisCounterRepository {
    #[instrument(skip(self, user_key), fields(user = %user_key, bucket = %hour_bucket, field = %field))]
    async fn increment(
        &self,
        user_key: &ActiveUserKey,
        hour_bucket: HourBucket,
        field: CounterField,
    ) -> RepoResult<()> {
        let key = counters_key(user_key, hour_bucket);
        let expires_at = hour_bucket.expires_at(self.ttl);

        if let Some(expires_at) = expires_at {
            if expires_at <= Utc::now() {
                debug!("Hour bucket already outside retention, skipping");
                return Ok(());
            }
        }

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HINCRBY")
            .arg(&key)
            .arg(field.as_str())
            .arg(1)
            .ignore();
        if let Some(expires_at) = expires_at {
            pipe.cmd("EXPIREAT")
                .arg(&key)
                .arg(expires_at.timestamp())
                .ignore();
        }

        let mut conn = self.pool.get().await.map_err(|e| e.into_cache_error())?;
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| crate::RedisPoolError::from(e).into_cache_error())?;
        Ok(())
    }

    #[instrument(skip(self, user_key), fields(user = %user_key, bucket = %hour_bucket))]
    async fn get(
        &self,
        user_key: &ActiveUserKey,
        hour_bucket: HourBucket,
    ) -> RepoResult<CountersGroup> {
        let mut conn = self.pool.get().await.map_err(|e| e.into_cache_error())?;
        let values: HashMap<String, u32> = conn
            .hgetall(counters_key(user_key, hour_bucket))
            .await
            .map_err(|e| crate::RedisPoolError::from(e).into_cache_error())?;
        Ok(Self::group_from_hash(user_key, hour_bucket, values))
    }

    #[instrument(skip(self, user_key, hour_buckets), fields(user = %user_key, buckets = hour_buckets.len()))]
    async fn get_many(
        &self,
        user_key: &ActiveUserKey,
        hour_buckets: &[HourBucket],
    ) -> RepoResult<Vec<CountersGroup>> {
        if hour_buckets.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for &bucket in hour_buckets {
            pipe.hgetall(counters_key(user_key, bucket));
        }

        let mut conn = self.pool.get().await.map_err(|e| e.into_cache_error())?;
        let hashes: Vec<HashMap<String, u32>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| crate::RedisPoolError::from(e).into_cache_error())?;

        Ok(hour_buckets
            .iter()
            .zip(hashes)
            .map(|(&bucket, values)| Self::group_from_hash(user_key, bucket, values))
            .collect())
    }
}

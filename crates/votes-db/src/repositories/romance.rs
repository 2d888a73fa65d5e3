//! PostgreSQL implementation of RomanceRepository
//!
//! Writes are compare-and-swap on `version`. Rows past `expires_at` are
//! invisible to reads and may be overwritten by a fresh insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};

use votes_core::entities::Romance;
use votes_core::traits::{RepoResult, RomanceRepository};
use votes_core::value_objects::{ActiveUserKey, CanonicalPairKey, VoteIdentity};
use votes_core::DomainError;

use crate::mappers::{country_id_to_db, pair_key_from_model, romance_from_model, RomanceWrite};
use crate::models::{PairKeyModel, RomanceModel};

use super::error::{conflict_if_untouched, map_db_error};

/// PostgreSQL implementation of RomanceRepository
#[derive(Clone)]
pub struct PgRomanceRepository {
    pool: PgPool,
}

impl PgRomanceRepository {
    /// Create a new PgRomanceRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, write: &RomanceWrite<'_>, expires_at: DateTime<Utc>) -> RepoResult<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO romances (
                country_id, low_user_id, high_user_id,
                low_vote_type, low_voted_at, low_created_at, low_updated_at,
                high_vote_type, high_voted_at, high_created_at, high_updated_at,
                version, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1, $12)
            ON CONFLICT (country_id, low_user_id, high_user_id) DO UPDATE SET
                low_vote_type = EXCLUDED.low_vote_type,
                low_voted_at = EXCLUDED.low_voted_at,
                low_created_at = EXCLUDED.low_created_at,
                low_updated_at = EXCLUDED.low_updated_at,
                high_vote_type = EXCLUDED.high_vote_type,
                high_voted_at = EXCLUDED.high_voted_at,
                high_created_at = EXCLUDED.high_created_at,
                high_updated_at = EXCLUDED.high_updated_at,
                version = 1,
                expires_at = EXCLUDED.expires_at
            WHERE romances.expires_at <= NOW()
            "#,
        );

        let result = bind_write(query, write)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        conflict_if_untouched(result.rows_affected())
    }

    async fn update(
        &self,
        write: &RomanceWrite<'_>,
        expected_version: u32,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let query = sqlx::query(
            r#"
            UPDATE romances SET
                low_vote_type = $4,
                low_voted_at = $5,
                low_created_at = $6,
                low_updated_at = $7,
                high_vote_type = $8,
                high_voted_at = $9,
                high_created_at = $10,
                high_updated_at = $11,
                version = version + 1,
                expires_at = $12
            WHERE country_id = $1 AND low_user_id = $2 AND high_user_id = $3
              AND version = $13
              AND expires_at > NOW()
            "#,
        );

        let result = bind_write(query, write)
            .bind(expires_at)
            .bind(i64::from(expected_version))
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        conflict_if_untouched(result.rows_affected())
    }

    async fn delete_versioned(&self, key: &CanonicalPairKey, expected_version: u32) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM romances
            WHERE country_id = $1 AND low_user_id = $2 AND high_user_id = $3
              AND version = $4
            "#,
        )
        .bind(country_id_to_db(key.country_id()))
        .bind(key.low_user_id())
        .bind(key.high_user_id())
        .bind(i64::from(expected_version))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        conflict_if_untouched(result.rows_affected())
    }
}

/// Bind key and vote columns as `$1..$11`
fn bind_write<'q>(
    query: Query<'q, Postgres, PgArguments>,
    write: &RomanceWrite<'_>,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(write.country_id())
        .bind(write.low_user_id())
        .bind(write.high_user_id())
        .bind(write.low_vote.vote_type.code())
        .bind(write.low_vote.voted_at)
        .bind(write.low_vote.created_at)
        .bind(write.low_vote.updated_at)
        .bind(write.high_vote.vote_type.code())
        .bind(write.high_vote.voted_at)
        .bind(write.high_vote.created_at)
        .bind(write.high_vote.updated_at)
}

#[async_trait]
impl RomanceRepository for PgRomanceRepository {
    #[instrument(skip(self, identity), fields(identity = %identity))]
    async fn get(&self, identity: &VoteIdentity) -> RepoResult<Romance> {
        let (key, _) = identity.pair_key();
        let model = sqlx::query_as::<_, RomanceModel>(
            r#"
            SELECT country_id, low_user_id, high_user_id,
                   low_vote_type, low_voted_at, low_created_at, low_updated_at,
                   high_vote_type, high_voted_at, high_created_at, high_updated_at,
                   version, expires_at
            FROM romances
            WHERE country_id = $1 AND low_user_id = $2 AND high_user_id = $3
              AND expires_at > NOW()
            "#,
        )
        .bind(country_id_to_db(key.country_id()))
        .bind(key.low_user_id())
        .bind(key.high_user_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::RomanceNotFound)?;

        romance_from_model(model, identity)
    }

    #[instrument(skip(self, romance), fields(identity = %romance.identity()))]
    async fn conditional_put(
        &self,
        romance: &Romance,
        expected_version: u32,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<Romance> {
        let write = RomanceWrite::new(romance);

        if romance.is_empty() {
            if expected_version > 0 {
                self.delete_versioned(&write.key, expected_version).await?;
                debug!(key = %write.key, "Romance emptied, row removed");
            }
            return Ok(Romance {
                version: 0,
                ..romance.clone()
            });
        }

        if expected_version == 0 {
            self.insert(&write, expires_at).await?;
        } else {
            self.update(&write, expected_version, expires_at).await?;
        }

        let version = expected_version
            .checked_add(1)
            .ok_or_else(|| DomainError::DatabaseError("romance version overflow".to_string()))?;

        Ok(Romance {
            version,
            ..romance.clone()
        })
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn delete(&self, key: &CanonicalPairKey) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM romances
            WHERE country_id = $1 AND low_user_id = $2 AND high_user_id = $3
            "#,
        )
        .bind(country_id_to_db(key.country_id()))
        .bind(key.low_user_id())
        .bind(key.high_user_id())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, user_key), fields(user = %user_key))]
    async fn find_keys_by_user(
        &self,
        user_key: &ActiveUserKey,
        limit: u32,
    ) -> RepoResult<Vec<CanonicalPairKey>> {
        // The primary key serves the low side, the secondary index the high side
        let models = sqlx::query_as::<_, PairKeyModel>(
            r#"
            (SELECT country_id, low_user_id, high_user_id
             FROM romances
             WHERE country_id = $1 AND low_user_id = $2)
            UNION ALL
            (SELECT country_id, low_user_id, high_user_id
             FROM romances
             WHERE country_id = $1 AND high_user_id = $2)
            LIMIT $3
            "#,
        )
        .bind(country_id_to_db(user_key.country_id))
        .bind(user_key.user_id)
        .bind(i64::from(limit.max(1)))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.iter().map(pair_key_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>, limit: u32) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM romances
            WHERE ctid IN (
                SELECT ctid FROM romances
                WHERE expires_at <= $1
                LIMIT $2
            )
            "#,
        )
        .bind(now)
        .bind(i64::from(limit.max(1)))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

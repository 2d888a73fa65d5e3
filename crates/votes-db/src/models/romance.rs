//! Romance database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the romances table
#[derive(Debug, Clone, FromRow)]
pub struct RomanceModel {
    pub country_id: i32,
    pub low_user_id: Uuid,
    pub high_user_id: Uuid,
    pub low_vote_type: i16,
    pub low_voted_at: Option<DateTime<Utc>>,
    pub low_created_at: Option<DateTime<Utc>>,
    pub low_updated_at: Option<DateTime<Utc>>,
    pub high_vote_type: i16,
    pub high_voted_at: Option<DateTime<Utc>>,
    pub high_created_at: Option<DateTime<Utc>>,
    pub high_updated_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub expires_at: DateTime<Utc>,
}

/// Primary key columns only (from lookups by user)
#[derive(Debug, Clone, FromRow)]
pub struct PairKeyModel {
    pub country_id: i32,
    pub low_user_id: Uuid,
    pub high_user_id: Uuid,
}

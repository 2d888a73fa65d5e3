//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use votes_core::{CountryId, VoteType};

// ============================================================================
// Vote Responses
// ============================================================================

/// One user's vote on a peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteResponse {
    pub country_id: CountryId,
    pub active_user_id: Uuid,
    pub peer_user_id: Uuid,
    pub vote_type: VoteType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Romance Responses
// ============================================================================

/// Both votes of a pair, seen from the requesting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RomanceResponse {
    pub active_user_vote: VoteResponse,
    pub peer_user_vote: VoteResponse,
    pub mutual: bool,
    /// `0` when the pair has never been stored
    pub version: u32,
}

/// Accepted request to delete every romance of a user
#[derive(Debug, Clone, Serialize)]
pub struct DeleteRomancesAcceptedResponse {
    pub request_id: Uuid,
    pub message_id: String,
}

// ============================================================================
// Counter Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountersResponse {
    pub country_id: CountryId,
    pub user_id: Uuid,
    /// Hours since the Unix epoch, `0` for lifetime totals
    pub hour_bucket: u32,
    pub incoming_yes: u32,
    pub incoming_no: u32,
    pub outgoing_yes: u32,
    pub outgoing_no: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyCountersEntry {
    /// Hours before the current hour
    pub offset: u8,
    pub counters: CountersResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyCountersResponse {
    pub current_hour_bucket: u32,
    pub buckets: Vec<HourlyCountersEntry>,
}

impl HourlyCountersResponse {
    /// Counters at `offset`, if it was requested and resolvable
    pub fn at(&self, offset: u8) -> Option<&CountersResponse> {
        self.buckets
            .iter()
            .find(|entry| entry.offset == offset)
            .map(|entry| &entry.counters)
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use votes_core::VoteType;

fn not_nil(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("nil_uuid").with_message("User id must not be nil".into()));
    }
    Ok(())
}

fn not_empty_vote(vote_type: &VoteType) -> Result<(), ValidationError> {
    if vote_type.is_empty() {
        return Err(ValidationError::new("empty_vote")
            .with_message("Vote type must not be empty".into()));
    }
    Ok(())
}

fn distinct_users(request: &AddVoteRequest) -> Result<(), ValidationError> {
    if request.active_user_id == request.peer_user_id {
        return Err(ValidationError::new("self_vote")
            .with_message("A user cannot vote on themselves".into()));
    }
    Ok(())
}

// ============================================================================
// Vote Requests
// ============================================================================

/// Cast a vote on a peer
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "distinct_users"))]
pub struct AddVoteRequest {
    #[validate(custom(function = "not_nil"))]
    pub active_user_id: Uuid,

    #[validate(custom(function = "not_nil"))]
    pub peer_user_id: Uuid,

    #[validate(custom(function = "not_empty_vote"))]
    pub vote_type: VoteType,

    /// When the vote was cast; defaults to the time of the request
    pub voted_at: Option<DateTime<Utc>>,
}

/// Escalate an existing vote
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeVoteRequest {
    #[validate(custom(function = "not_empty_vote"))]
    pub vote_type: VoteType,
}

// ============================================================================
// Counter Requests
// ============================================================================

/// Query string of the hourly counters endpoint, e.g. `?offsets=0,1,2`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HourlyCountersQuery {
    #[validate(length(min = 1, max = 512, message = "Offsets must be 1-512 characters"))]
    pub offsets: String,
}

impl HourlyCountersQuery {
    /// Comma separated hour offsets
    pub fn parse_offsets(&self) -> Result<Vec<u8>, String> {
        self.offsets
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>()
                    .map_err(|_| format!("Invalid hour offset: {part}"))
            })
            .collect()
    }
}

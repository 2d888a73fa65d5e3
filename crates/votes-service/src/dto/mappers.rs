//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use votes_core::entities::{CountersGroup, Romance, Vote};

use super::responses::{CountersResponse, RomanceResponse, VoteResponse};

impl From<&Vote> for VoteResponse {
    fn from(vote: &Vote) -> Self {
        Self {
            country_id: vote.identity.country_id(),
            active_user_id: vote.identity.active_user_id(),
            peer_user_id: vote.identity.peer_user_id(),
            vote_type: vote.vote_type,
            voted_at: vote.voted_at,
            created_at: vote.created_at,
            updated_at: vote.updated_at,
        }
    }
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self::from(&vote)
    }
}

impl From<&Romance> for RomanceResponse {
    fn from(romance: &Romance) -> Self {
        Self {
            active_user_vote: VoteResponse::from(&romance.active_user_vote),
            peer_user_vote: VoteResponse::from(&romance.peer_user_vote),
            mutual: romance.is_mutual(),
            version: romance.version,
        }
    }
}

impl From<Romance> for RomanceResponse {
    fn from(romance: Romance) -> Self {
        Self::from(&romance)
    }
}

impl From<&CountersGroup> for CountersResponse {
    fn from(group: &CountersGroup) -> Self {
        Self {
            country_id: group.user_key.country_id,
            user_id: group.user_key.user_id,
            hour_bucket: group.hour_bucket.into_inner(),
            incoming_yes: group.incoming_yes,
            incoming_no: group.incoming_no,
            outgoing_yes: group.outgoing_yes,
            outgoing_no: group.outgoing_no,
        }
    }
}

impl From<CountersGroup> for CountersResponse {
    fn from(group: CountersGroup) -> Self {
        Self::from(&group)
    }
}

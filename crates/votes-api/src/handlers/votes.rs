//! Vote handlers
//!
//! Endpoints for casting, reading, escalating and withdrawing votes.

use axum::{extract::State, Json};
use chrono::Utc;
use votes_core::VoteIdentity;
use votes_service::{AddVoteRequest, ChangeVoteRequest, VoteResponse, VoteService};

use crate::extractors::{ApiPath, CountryPath, PeerPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Cast a vote
///
/// POST /countries/{country_id}/votes
pub async fn add_vote(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<CountryPath>,
    ValidatedJson(request): ValidatedJson<AddVoteRequest>,
) -> ApiResult<Created<Json<VoteResponse>>> {
    let identity = VoteIdentity::new(
        path.country_id,
        request.active_user_id,
        request.peer_user_id,
    )?;
    let voted_at = request.voted_at.unwrap_or_else(Utc::now);

    let service = VoteService::new(state.service_context());
    let response = service
        .add_vote(identity, request.vote_type, voted_at)
        .await?;
    Ok(Created(Json(response)))
}

/// Get the caller's vote on a peer
///
/// GET /countries/{country_id}/users/{user_id}/votes/{peer_id}
pub async fn get_vote(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<PeerPath>,
) -> ApiResult<Json<VoteResponse>> {
    let service = VoteService::new(state.service_context());
    let response = service.get_vote(path.identity()?).await?;
    Ok(Json(response))
}

/// Change the type of an existing vote
///
/// PATCH /countries/{country_id}/users/{user_id}/votes/{peer_id}
pub async fn change_vote(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<PeerPath>,
    ValidatedJson(request): ValidatedJson<ChangeVoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let service = VoteService::new(state.service_context());
    let response = service
        .change_vote(path.identity()?, request.vote_type)
        .await?;
    Ok(Json(response))
}

/// Withdraw the caller's vote
///
/// DELETE /countries/{country_id}/users/{user_id}/votes/{peer_id}
pub async fn delete_vote(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<PeerPath>,
) -> ApiResult<NoContent> {
    let service = VoteService::new(state.service_context());
    service.delete_vote(path.identity()?).await?;
    Ok(NoContent)
}

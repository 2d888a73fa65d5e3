//! Romance handlers

use axum::{extract::State, Json};
use votes_service::{DeleteRomancesAcceptedResponse, RomanceResponse, RomanceService};

use crate::extractors::{ApiPath, PeerPath, UserPath};
use crate::response::{Accepted, ApiResult, NoContent};
use crate::state::AppState;

/// Get the romance between the caller and a peer
///
/// GET /countries/{country_id}/users/{user_id}/romances/{peer_id}
pub async fn get_romance(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<PeerPath>,
) -> ApiResult<Json<RomanceResponse>> {
    let service = RomanceService::new(state.service_context());
    let response = service.get_romance(path.identity()?).await?;
    Ok(Json(response))
}

/// Delete the romance between the caller and a peer
///
/// DELETE /countries/{country_id}/users/{user_id}/romances/{peer_id}
pub async fn delete_romance(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<PeerPath>,
) -> ApiResult<NoContent> {
    let service = RomanceService::new(state.service_context());
    service.delete_romance(path.identity()?).await?;
    Ok(NoContent)
}

/// Request deletion of every romance of a user
///
/// DELETE /countries/{country_id}/users/{user_id}/romances
pub async fn delete_user_romances(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
) -> ApiResult<Accepted<Json<DeleteRomancesAcceptedResponse>>> {
    let service = RomanceService::new(state.service_context());
    let response = service.request_delete_all(path.user_key()?).await?;
    Ok(Accepted(Json(response)))
}

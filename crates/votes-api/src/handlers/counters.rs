//! Counter handlers
//!
//! Read-only views of a user's lifetime and hourly vote counters.

use axum::{extract::State, Json};
use chrono::Utc;
use votes_service::{CounterService, CountersResponse, HourlyCountersQuery, HourlyCountersResponse};

use crate::extractors::{ApiPath, UserPath, ValidatedQuery};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Lifetime counters
///
/// GET /countries/{country_id}/users/{user_id}/counters/lifetime
pub async fn get_lifetime_counters(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
) -> ApiResult<Json<CountersResponse>> {
    let service = CounterService::new(state.service_context());
    let response = service.lifetime(&path.user_key()?).await?;
    Ok(Json(response))
}

/// Hourly counters for the requested offsets
///
/// GET /countries/{country_id}/users/{user_id}/counters/hourly?offsets=0,1,2
pub async fn get_hourly_counters(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
    ValidatedQuery(query): ValidatedQuery<HourlyCountersQuery>,
) -> ApiResult<Json<HourlyCountersResponse>> {
    let offsets = query.parse_offsets().map_err(ApiError::invalid_query)?;

    let service = CounterService::new(state.service_context());
    let response = service
        .hourly(&path.user_key()?, offsets, Utc::now())
        .await?;
    Ok(Json(response))
}

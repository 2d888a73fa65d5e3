//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{counters, health, romances, votes};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(vote_routes())
        .merge(romance_routes())
        .merge(counter_routes())
}

/// Vote routes
fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/countries/:country_id/votes", post(votes::add_vote))
        .route(
            "/countries/:country_id/users/:user_id/votes/:peer_id",
            get(votes::get_vote)
                .patch(votes::change_vote)
                .delete(votes::delete_vote),
        )
}

/// Romance routes
fn romance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/countries/:country_id/users/:user_id/romances",
            delete(romances::delete_user_romances),
        )
        .route(
            "/countries/:country_id/users/:user_id/romances/:peer_id",
            get(romances::get_romance).delete(romances::delete_romance),
        )
}

/// Counter routes
fn counter_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/countries/:country_id/users/:user_id/counters/lifetime",
            get(counters::get_lifetime_counters),
        )
        .route(
            "/countries/:country_id/users/:user_id/counters/hourly",
            get(counters::get_hourly_counters),
        )
}

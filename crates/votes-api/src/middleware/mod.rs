//! HTTP middleware: request ids, request tracing, timeouts and CORS
//!
//! Layers run outermost first: request id, trace, timeout, CORS, handler.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use votes_common::CorsConfig;

use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Span for one request, carrying the id so every log line inside it has one
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Request id, tracing and a timeout; used by tests and when CORS is not needed
pub fn apply_middleware(router: Router<AppState>) -> Router<AppState> {
    layered(router, DEFAULT_REQUEST_TIMEOUT, None)
}

/// Full stack with the configured timeout and CORS policy
pub fn apply_middleware_with_config(
    router: Router<AppState>,
    request_timeout: Duration,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    layered(
        router,
        request_timeout,
        Some(cors_layer(cors_config, is_production)),
    )
}

fn layered(
    router: Router<AppState>,
    request_timeout: Duration,
    cors: Option<CorsLayer>,
) -> Router<AppState> {
    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                request_timeout,
            )),
    )
}

/// CORS for the vote endpoints. Without configured origins, development
/// allows any origin and production allows none.
fn cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, request_id_header()])
        .expose_headers([request_id_header()]);

    if config.allowed_origins.is_empty() {
        if is_production {
            warn!("No CORS origins configured; browser requests will be rejected");
            return layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()));
        }
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    info!(count = origins.len(), "CORS origins configured");
    layer.allow_origin(AllowOrigin::list(origins))
}

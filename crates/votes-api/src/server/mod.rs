//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use votes_cache::{RedisCounterRepository, RedisPool, StreamPublisher};
use votes_common::{AppConfig, AppError};
use votes_db::{create_pool, run_migrations, PgRomanceRepository};
use votes_service::ServiceContextBuilder;

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::create_router;
use crate::state::AppState;

/// Build the application with the default middleware stack
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Build the application with configured timeout and CORS
pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let router = apply_middleware_with_config(
        create_router(),
        config.server.request_timeout(),
        &config.cors,
        config.app.env.is_production(),
    );
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = votes_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis)
        .map_err(|e| AppError::Cache(e.to_string()))?;
    let shared_redis = Arc::new(redis_pool.clone());
    info!("Redis connection established");

    let policy = config.voting.policy();

    let service_context = ServiceContextBuilder::new()
        .romance_repo(Arc::new(PgRomanceRepository::new(pool.clone())))
        .counter_repo(Arc::new(RedisCounterRepository::new(
            redis_pool.clone(),
            policy.counters_ttl(),
        )))
        .publisher(Arc::new(StreamPublisher::new(redis_pool)))
        .policy(policy)
        .build()?;

    Ok(AppState::new(service_context).with_backends(pool, shared_redis))
}

/// Run the HTTP server until Ctrl-C or SIGTERM
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config.server.address().parse().map_err(|e| {
        AppError::internal(anyhow::anyhow!(
            "Invalid server address {}: {e}",
            config.server.address()
        ))
    })?;

    let state = create_app_state(&config).await?;
    let app = create_app_with_config(state, &config);

    run_server(app, addr).await
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

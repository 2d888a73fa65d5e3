//! Worker setup and task supervision
//!
//! Builds the service context over PostgreSQL and Redis, then runs the
//! cascade-delete consumer and the purge loop until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use votes_cache::{RedisCounterRepository, RedisPool, StreamConfig, StreamPublisher, StreamSubscriber};
use votes_common::{AppConfig, AppError};
use votes_core::traits::MessageSubscriber;
use votes_core::DeleteRomancesMessage;
use votes_db::{create_pool, run_migrations, PgRomanceRepository};
use votes_service::{listen, DeleteRomancesHandler, ListenStats, ServiceContext, ServiceContextBuilder, ServiceResult};

use crate::purge::run_purge_loop;
use crate::shutdown::{shutdown_signal, Shutdown};

/// Everything the worker's tasks share
#[derive(Clone)]
pub struct WorkerState {
    pub service_context: ServiceContext,
    pub redis: RedisPool,
}

impl std::fmt::Debug for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerState")
            .field("service_context", &self.service_context)
            .field("redis", &self.redis)
            .finish()
    }
}

/// Connect to the backends and build the service context
pub async fn create_worker_state(config: &AppConfig) -> Result<WorkerState, AppError> {
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
    let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let policy = config.voting.policy();
    let service_context = ServiceContextBuilder::new()
        .romance_repo(Arc::new(PgRomanceRepository::new(pool)))
        .counter_repo(Arc::new(RedisCounterRepository::new(
            redis.clone(),
            policy.counters_ttl(),
        )))
        .publisher(Arc::new(StreamPublisher::new(redis.clone())))
        .policy(policy)
        .build()?;

    Ok(WorkerState {
        service_context,
        redis,
    })
}

/// Consume cascade-delete requests until `shutdown` flips
pub async fn run_consumer(
    subscriber: Arc<dyn MessageSubscriber>,
    ctx: ServiceContext,
    batch_size: u32,
    shutdown: watch::Receiver<bool>,
) -> ServiceResult<ListenStats> {
    let handler = DeleteRomancesHandler::new(ctx, batch_size);
    listen::<DeleteRomancesMessage>(subscriber.as_ref(), &handler, shutdown).await
}

/// Run the worker until Ctrl-C or SIGTERM
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_worker_state(&config).await?;
    let shutdown = Shutdown::new();

    let subscriber: Arc<dyn MessageSubscriber> = Arc::new(StreamSubscriber::new(
        state.redis.clone(),
        StreamConfig::from(&config.messaging),
    ));

    let consumer = tokio::spawn(run_consumer(
        subscriber,
        state.service_context.clone(),
        config.worker.purge_batch_size,
        shutdown.subscribe(),
    ));

    let purge = tokio::spawn(run_purge_loop(
        state.service_context.clone(),
        config.worker.purge_interval(),
        config.worker.purge_batch_size,
        shutdown.subscribe(),
    ));

    info!("Worker running");
    shutdown_signal().await;
    shutdown.trigger();

    let mut result = Ok(());

    match consumer.await {
        Ok(Ok(stats)) => info!(
            handled = stats.handled,
            failed = stats.failed,
            malformed = stats.malformed,
            "Consumer stopped"
        ),
        Ok(Err(e)) => {
            error!(error = %e, "Consumer failed");
            result = Err(AppError::from(e));
        }
        Err(e) => {
            error!(error = %e, "Consumer task panicked");
            result = Err(AppError::internal(e));
        }
    }

    match purge.await {
        Ok(total) => info!(total, "Purge stopped"),
        Err(e) => {
            error!(error = %e, "Purge task panicked");
            result = result.and(Err(AppError::internal(e)));
        }
    }

    info!("Worker stopped");
    result
}

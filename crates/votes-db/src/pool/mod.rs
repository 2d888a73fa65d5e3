//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, health_check, run_migrations, DatabaseConfig};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;

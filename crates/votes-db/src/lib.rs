//! # votes-db
//!
//! Database layer implementing `RomanceRepository` with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and schema bootstrap
//! - The `romances` row model with SQLx `FromRow`
//! - Romance ↔ row mappers (canonical low/high columns ↔ active/peer votes)
//! - `PgRomanceRepository` with compare-and-swap writes on `version`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use votes_db::{create_pool, run_migrations, DatabaseConfig, PgRomanceRepository};
//!
//! async fn example(config: &votes_common::DatabaseConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(&DatabaseConfig::from(config)).await?;
//!     run_migrations(&pool).await?;
//!     let romances = PgRomanceRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, health_check, run_migrations, DatabaseConfig, PgPool};
pub use repositories::PgRomanceRepository;

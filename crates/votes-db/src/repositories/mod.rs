//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in votes-core.

mod error;
mod romance;

pub use romance::PgRomanceRepository;

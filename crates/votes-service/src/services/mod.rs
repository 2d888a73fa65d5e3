//! Business logic services
//!
//! This module contains the service layer that validates, orchestrates and
//! logs the domain operations.

pub mod context;
pub mod counter;
pub mod error;
pub mod retry;
pub mod romance;
pub mod vote;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use counter::CounterService;
pub use error::{ServiceError, ServiceResult};
pub use retry::{load_romance, Mutation, OptimisticRetry, WriteKind};
pub use romance::RomanceService;
pub use vote::VoteService;

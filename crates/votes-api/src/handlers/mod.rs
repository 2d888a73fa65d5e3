//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod counters;
pub mod health;
pub mod romances;
pub mod votes;

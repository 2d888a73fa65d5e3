//! Database models - SQLx-compatible structs for PostgreSQL tables

mod romance;

pub use romance::{PairKeyModel, RomanceModel};

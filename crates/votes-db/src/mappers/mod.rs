//! Romance <-> model mappers
//!
//! Rows store votes by canonical slot (low/high user id). Domain romances are
//! oriented to a caller (active/peer). These mappers translate between the two.

mod romance;

pub use romance::{country_id_to_db, pair_key_from_model, romance_from_model, RomanceWrite};

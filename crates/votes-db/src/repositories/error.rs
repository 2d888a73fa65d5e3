//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use votes_core::error::DomainError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Map a write that matched no row to the conflict it signals
pub fn conflict_if_untouched(rows_affected: u64) -> Result<(), DomainError> {
    if rows_affected == 0 {
        Err(DomainError::VersionConflict)
    } else {
        Ok(())
    }
}

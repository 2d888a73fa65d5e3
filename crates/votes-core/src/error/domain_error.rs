//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::VoteType;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Vote not found")]
    VoteNotFound,

    #[error("Romance not found")]
    RomanceNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid vote identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid event time")]
    InvalidEventTime,

    #[error("Hour offset {offset} is out of range: max {max}")]
    InvalidHourOffset { offset: u8, max: u32 },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Illegal vote transition: {from} -> {to}")]
    IllegalVoteTransition { from: VoteType, to: VoteType },

    #[error("Duplicate vote: already {0}")]
    DuplicateVote(VoteType),

    // =========================================================================
    // Concurrency Errors
    // =========================================================================
    #[error("Version conflict")]
    VersionConflict,

    #[error("Version conflict not resolved after {attempts} attempts")]
    VersionConflictExhausted { attempts: u32 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Messaging error: {0}")]
    MessagingError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::VoteNotFound => "UNKNOWN_VOTE",
            Self::RomanceNotFound => "UNKNOWN_ROMANCE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidIdentity(_) => "INVALID_IDENTITY",
            Self::InvalidEventTime => "INVALID_EVENT_TIME",
            Self::InvalidHourOffset { .. } => "INVALID_HOUR_OFFSET",

            // Business Rules
            Self::IllegalVoteTransition { .. } => "ILLEGAL_VOTE_TRANSITION",
            Self::DuplicateVote(_) => "DUPLICATE_VOTE",

            // Concurrency
            Self::VersionConflict => "VERSION_CONFLICT",
            Self::VersionConflictExhausted { .. } => "VERSION_CONFLICT_EXHAUSTED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::MessagingError(_) => "MESSAGING_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VoteNotFound | Self::RomanceNotFound)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidIdentity(_)
                | Self::InvalidEventTime
                | Self::InvalidHourOffset { .. }
        )
    }

    /// Check if a vote was rejected by the transition rules
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::IllegalVoteTransition { .. } | Self::DuplicateVote(_)
        )
    }

    /// Check if retrying the same write may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::VersionConflict)
    }

    /// Check if this wraps a failure of an external system
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::CacheError(_)
                | Self::MessagingError(_)
                | Self::SerializationError(_)
                | Self::InternalError(_)
        )
    }
}

//! Vote type - the five-valued vote a user casts on a peer
//!
//! Votes only escalate:
//!
//! ```text
//! Empty      -> No, Yes, Crush, Compliment
//! No         -> Yes, Crush, Compliment
//! Yes        -> Crush, Compliment
//! Crush      -> (terminal)
//! Compliment -> (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Vote classification. `Empty` means "not voted yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[default]
    Empty,
    No,
    Yes,
    Crush,
    Compliment,
}

impl VoteType {
    pub const ALL: [VoteType; 5] = [
        VoteType::Empty,
        VoteType::No,
        VoteType::Yes,
        VoteType::Crush,
        VoteType::Compliment,
    ];

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Yes, Crush and Compliment count as "yes" for counters
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Yes | Self::Crush | Self::Compliment)
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::No)
    }

    /// Vote types reachable from this one in a single transition
    pub const fn reachable(self) -> &'static [VoteType] {
        match self {
            Self::Empty => &[Self::No, Self::Yes, Self::Crush, Self::Compliment],
            Self::No => &[Self::Yes, Self::Crush, Self::Compliment],
            Self::Yes => &[Self::Crush, Self::Compliment],
            Self::Crush | Self::Compliment => &[],
        }
    }

    pub fn can_transition(self, proposed: VoteType) -> bool {
        self.reachable().contains(&proposed)
    }

    #[inline]
    pub fn is_duplicate(self, proposed: VoteType) -> bool {
        self == proposed
    }

    /// Validate a transition, reporting duplicates separately from illegal moves
    pub fn check_transition(self, proposed: VoteType) -> Result<(), DomainError> {
        if self.is_duplicate(proposed) {
            return Err(DomainError::DuplicateVote(self));
        }
        if !self.can_transition(proposed) {
            return Err(DomainError::IllegalVoteTransition {
                from: self,
                to: proposed,
            });
        }
        Ok(())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::No => "no",
            Self::Yes => "yes",
            Self::Crush => "crush",
            Self::Compliment => "compliment",
        }
    }

    /// Storage code
    #[inline]
    pub const fn code(self) -> i16 {
        match self {
            Self::Empty => 0,
            Self::No => 1,
            Self::Yes => 2,
            Self::Crush => 3,
            Self::Compliment => 4,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, VoteTypeParseError> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::No),
            2 => Ok(Self::Yes),
            3 => Ok(Self::Crush),
            4 => Ok(Self::Compliment),
            other => Err(VoteTypeParseError::UnknownCode(other)),
        }
    }
}

/// Error when parsing a VoteType
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteTypeParseError {
    #[error("unknown vote type: {0}")]
    UnknownName(String),

    #[error("unknown vote type code: {0}")]
    UnknownCode(i16),
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoteType {
    type Err = VoteTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|vote_type| vote_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| VoteTypeParseError::UnknownName(s.to_string()))
    }
}

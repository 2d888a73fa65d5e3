//! Vote entity - one user's vote on a peer

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{VoteIdentity, VoteType};

/// Drop sub-microsecond digits; the romance store keeps microseconds
pub fn to_storage_precision(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub identity: VoteIdentity,
    pub vote_type: VoteType,
    pub voted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Vote {
    /// A vote that has not been cast yet
    pub fn empty(identity: VoteIdentity) -> Self {
        Self {
            identity,
            vote_type: VoteType::Empty,
            voted_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vote_type.is_empty()
    }

    /// Cast (or escalate) the vote
    pub fn cast(
        &self,
        vote_type: VoteType,
        voted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.vote_type.check_transition(vote_type)?;
        let now = to_storage_precision(now);
        Ok(Self {
            identity: self.identity,
            vote_type,
            voted_at: Some(to_storage_precision(voted_at)),
            created_at: self.created_at.or(Some(now)),
            updated_at: Some(now),
        })
    }

    /// Change the type of an existing vote, keeping when it was cast
    pub fn change_type(&self, vote_type: VoteType, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::VoteNotFound);
        }
        self.vote_type.check_transition(vote_type)?;
        Ok(Self {
            identity: self.identity,
            vote_type,
            voted_at: self.voted_at,
            created_at: self.created_at,
            updated_at: Some(to_storage_precision(now)),
        })
    }

    /// Withdraw the vote, returning the side to `Empty`
    pub fn retract(&self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::VoteNotFound);
        }
        Ok(Self::empty(self.identity))
    }
}

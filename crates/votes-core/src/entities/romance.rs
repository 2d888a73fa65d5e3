//! Romance entity - the shared aggregate of both votes of a user pair
//!
//! A romance is always viewed from one participant: `active_user_vote` is the
//! caller's vote, `peer_user_vote` the other side's. `version` is the
//! optimistic lock; `0` means the row has never been stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{
    CanonicalPairKey, PairSide, RomanceCategory, RomanceRetention, VoteIdentity, VoteType,
};

use super::Vote;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Romance {
    pub active_user_vote: Vote,
    pub peer_user_vote: Vote,
    pub version: u32,
}

impl Romance {
    /// Romance with no votes on either side, not yet stored
    pub fn empty(identity: VoteIdentity) -> Self {
        Self {
            active_user_vote: Vote::empty(identity),
            peer_user_vote: Vote::empty(identity.reversed()),
            version: 0,
        }
    }

    #[inline]
    pub fn identity(&self) -> &VoteIdentity {
        &self.active_user_vote.identity
    }

    #[inline]
    pub fn pair_key(&self) -> (CanonicalPairKey, PairSide) {
        self.identity().pair_key()
    }

    /// Never written to storage
    #[inline]
    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    pub fn is_empty(&self) -> bool {
        self.active_user_vote.is_empty() && self.peer_user_vote.is_empty()
    }

    pub fn is_mutual(&self) -> bool {
        self.active_user_vote.vote_type.is_positive() && self.peer_user_vote.vote_type.is_positive()
    }

    /// Same romance seen from the peer
    pub fn reversed(self) -> Self {
        Self {
            active_user_vote: self.peer_user_vote,
            peer_user_vote: self.active_user_vote,
            version: self.version,
        }
    }

    fn with_active_vote(&self, active_user_vote: Vote) -> Self {
        Self {
            active_user_vote,
            peer_user_vote: self.peer_user_vote.clone(),
            version: self.version,
        }
    }

    pub fn add_active_vote(
        &self,
        vote_type: VoteType,
        voted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let vote = self.active_user_vote.cast(vote_type, voted_at, now)?;
        Ok(self.with_active_vote(vote))
    }

    pub fn change_active_vote_type(
        &self,
        vote_type: VoteType,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let vote = self.active_user_vote.change_type(vote_type, now)?;
        Ok(self.with_active_vote(vote))
    }

    pub fn delete_active_vote(&self) -> Result<Self, DomainError> {
        let vote = self.active_user_vote.retract()?;
        Ok(self.with_active_vote(vote))
    }

    /// Retention category after a write; `retracted` marks a vote deletion
    pub fn category(&self, retracted: bool) -> RomanceCategory {
        if self.is_mutual() {
            RomanceCategory::Mutual
        } else if retracted {
            RomanceCategory::Inactive
        } else {
            RomanceCategory::OneSided
        }
    }

    pub fn expires_at(
        &self,
        now: DateTime<Utc>,
        retention: &RomanceRetention,
        retracted: bool,
    ) -> DateTime<Utc> {
        now + retention.ttl(self.category(retracted))
    }
}

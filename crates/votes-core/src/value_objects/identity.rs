//! Vote identity and the keys derived from it
//!
//! A `VoteIdentity` is directional: it names the vote `active_user_id` cast on
//! `peer_user_id`. Both directions of a pair resolve to one `CanonicalPairKey`,
//! which orders the two ids so the smaller one is always stored first.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::DomainError;

/// Country partition of all keys
pub type CountryId = u16;

// ============================================================================
// VoteIdentity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteIdentity {
    country_id: CountryId,
    active_user_id: Uuid,
    peer_user_id: Uuid,
}

impl VoteIdentity {
    /// Create an identity, rejecting self-votes and nil ids
    pub fn new(
        country_id: CountryId,
        active_user_id: Uuid,
        peer_user_id: Uuid,
    ) -> Result<Self, DomainError> {
        if active_user_id.is_nil() || peer_user_id.is_nil() {
            return Err(DomainError::InvalidIdentity(
                "user ids must not be nil".to_string(),
            ));
        }
        if active_user_id == peer_user_id {
            return Err(DomainError::InvalidIdentity(
                "a user cannot vote on themselves".to_string(),
            ));
        }
        Ok(Self {
            country_id,
            active_user_id,
            peer_user_id,
        })
    }

    #[inline]
    pub const fn country_id(&self) -> CountryId {
        self.country_id
    }

    #[inline]
    pub const fn active_user_id(&self) -> Uuid {
        self.active_user_id
    }

    #[inline]
    pub const fn peer_user_id(&self) -> Uuid {
        self.peer_user_id
    }

    /// The peer's identity for the same pair
    #[inline]
    pub const fn reversed(&self) -> Self {
        Self {
            country_id: self.country_id,
            active_user_id: self.peer_user_id,
            peer_user_id: self.active_user_id,
        }
    }

    pub const fn active_user_key(&self) -> ActiveUserKey {
        ActiveUserKey {
            country_id: self.country_id,
            user_id: self.active_user_id,
        }
    }

    pub const fn peer_user_key(&self) -> ActiveUserKey {
        ActiveUserKey {
            country_id: self.country_id,
            user_id: self.peer_user_id,
        }
    }

    /// Storage key of the pair plus the side this identity's active user occupies
    pub fn pair_key(&self) -> (CanonicalPairKey, PairSide) {
        if self.active_user_id < self.peer_user_id {
            (
                CanonicalPairKey {
                    country_id: self.country_id,
                    low_user_id: self.active_user_id,
                    high_user_id: self.peer_user_id,
                },
                PairSide::Low,
            )
        } else {
            (
                CanonicalPairKey {
                    country_id: self.country_id,
                    low_user_id: self.peer_user_id,
                    high_user_id: self.active_user_id,
                },
                PairSide::High,
            )
        }
    }
}

impl fmt::Display for VoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.country_id, self.active_user_id, self.peer_user_id
        )
    }
}

// ============================================================================
// ActiveUserKey
// ============================================================================

/// A user's counter stream and the scope of cascade deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActiveUserKey {
    pub country_id: CountryId,
    pub user_id: Uuid,
}

impl ActiveUserKey {
    pub fn new(country_id: CountryId, user_id: Uuid) -> Result<Self, DomainError> {
        if user_id.is_nil() {
            return Err(DomainError::InvalidIdentity(
                "user id must not be nil".to_string(),
            ));
        }
        Ok(Self {
            country_id,
            user_id,
        })
    }
}

impl fmt::Display for ActiveUserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.country_id, self.user_id)
    }
}

// ============================================================================
// CanonicalPairKey
// ============================================================================

/// Which stored slot of a pair a user occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    Low,
    High,
}

impl PairSide {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Order-independent storage key of a user pair (`low_user_id < high_user_id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPairKey {
    country_id: CountryId,
    low_user_id: Uuid,
    high_user_id: Uuid,
}

impl CanonicalPairKey {
    /// Rebuild a key from stored columns, validating the ordering
    pub fn from_parts(
        country_id: CountryId,
        low_user_id: Uuid,
        high_user_id: Uuid,
    ) -> Result<Self, DomainError> {
        if low_user_id >= high_user_id {
            return Err(DomainError::InvalidIdentity(format!(
                "pair key is not ordered: {low_user_id} >= {high_user_id}"
            )));
        }
        Ok(Self {
            country_id,
            low_user_id,
            high_user_id,
        })
    }

    #[inline]
    pub const fn country_id(&self) -> CountryId {
        self.country_id
    }

    #[inline]
    pub const fn low_user_id(&self) -> Uuid {
        self.low_user_id
    }

    #[inline]
    pub const fn high_user_id(&self) -> Uuid {
        self.high_user_id
    }

    pub const fn user_on(&self, side: PairSide) -> Uuid {
        match side {
            PairSide::Low => self.low_user_id,
            PairSide::High => self.high_user_id,
        }
    }

    pub fn side_of(&self, user_id: Uuid) -> Option<PairSide> {
        if user_id == self.low_user_id {
            Some(PairSide::Low)
        } else if user_id == self.high_user_id {
            Some(PairSide::High)
        } else {
            None
        }
    }

    /// Identity of the vote cast by the user on `side`
    pub const fn identity_for(&self, side: PairSide) -> VoteIdentity {
        VoteIdentity {
            country_id: self.country_id,
            active_user_id: self.user_on(side),
            peer_user_id: self.user_on(side.opposite()),
        }
    }
}

impl fmt::Display for CanonicalPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.country_id, self.low_user_id, self.high_user_id
        )
    }
}

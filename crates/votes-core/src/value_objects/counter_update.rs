//! Counter update planning
//!
//! Given the old and new vote type of one successful vote mutation, decide
//! which counters move. Yes counters move only when the vote enters positive
//! polarity, No counters only when it enters negative polarity. The voter's
//! outgoing and the peer's incoming counters both move, in the lifetime row and
//! in the event's hour bucket.

use serde::{Deserialize, Serialize};
use std::fmt;

use chrono::{DateTime, Utc};

use super::hour_bucket::HourBucket;
use super::identity::{ActiveUserKey, VoteIdentity};
use super::vote_type::VoteType;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    IncomingYes,
    IncomingNo,
    OutgoingYes,
    OutgoingNo,
}

impl CounterField {
    pub const ALL: [CounterField; 4] = [
        CounterField::IncomingYes,
        CounterField::IncomingNo,
        CounterField::OutgoingYes,
        CounterField::OutgoingNo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncomingYes => "incoming_yes",
            Self::IncomingNo => "incoming_no",
            Self::OutgoingYes => "outgoing_yes",
            Self::OutgoingNo => "outgoing_no",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == s)
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polarity a vote newly entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Yes,
    No,
}

impl Polarity {
    /// `None` unless `new` holds a polarity `old` did not
    pub fn entered(old: VoteType, new: VoteType) -> Option<Self> {
        if new.is_positive() && !old.is_positive() {
            Some(Self::Yes)
        } else if new.is_negative() && !old.is_negative() {
            Some(Self::No)
        } else {
            None
        }
    }

    const fn outgoing(self) -> CounterField {
        match self {
            Self::Yes => CounterField::OutgoingYes,
            Self::No => CounterField::OutgoingNo,
        }
    }

    const fn incoming(self) -> CounterField {
        match self {
            Self::Yes => CounterField::IncomingYes,
            Self::No => CounterField::IncomingNo,
        }
    }
}

/// Hour bucket a counter update lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterUpdateGroup {
    hour_bucket: HourBucket,
}

impl CounterUpdateGroup {
    pub fn new(event_time: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            hour_bucket: HourBucket::from_event_time(event_time)?,
        })
    }

    #[inline]
    pub const fn hour_bucket(&self) -> HourBucket {
        self.hour_bucket
    }
}

/// One `+1` on one counter row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterIncrement {
    pub user_key: ActiveUserKey,
    pub hour_bucket: HourBucket,
    pub field: CounterField,
}

/// Increments caused by `identity`'s vote moving from `old` to `new`
pub fn plan_increments(
    identity: &VoteIdentity,
    old: VoteType,
    new: VoteType,
    group: CounterUpdateGroup,
) -> Vec<CounterIncrement> {
    let Some(polarity) = Polarity::entered(old, new) else {
        return Vec::new();
    };

    let voter = identity.active_user_key();
    let peer = identity.peer_user_key();

    [HourBucket::LIFETIME, group.hour_bucket()]
        .into_iter()
        .flat_map(|hour_bucket| {
            [
                CounterIncrement {
                    user_key: voter,
                    hour_bucket,
                    field: polarity.outgoing(),
                },
                CounterIncrement {
                    user_key: peer,
                    hour_bucket,
                    field: polarity.incoming(),
                },
            ]
        })
        .collect()
}

//! Hour buckets - counters are grouped per hour since the Unix epoch
//!
//! Bucket `0` is reserved for lifetime totals. Event times inside the first
//! epoch hour would collide with it and are rejected.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::DomainError;

const SECONDS_PER_HOUR: i64 = 3600;

/// Hours since the Unix epoch, or `0` for lifetime totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourBucket(u32);

impl HourBucket {
    pub const LIFETIME: HourBucket = HourBucket(0);

    #[inline]
    pub const fn new(hour: u32) -> Self {
        Self(hour)
    }

    #[inline]
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_lifetime(&self) -> bool {
        self.0 == 0
    }

    /// Bucket containing `event_time`
    pub fn from_event_time(event_time: DateTime<Utc>) -> Result<Self, DomainError> {
        let seconds = event_time.timestamp();
        if seconds <= 0 {
            return Err(DomainError::InvalidEventTime);
        }
        let hour = u32::try_from(seconds / SECONDS_PER_HOUR)
            .map_err(|_| DomainError::InvalidEventTime)?;
        if hour == 0 {
            return Err(DomainError::InvalidEventTime);
        }
        Ok(Self(hour))
    }

    /// Bucket `hours` before this one; `None` when it would reach the lifetime slot
    pub fn hours_before(self, hours: u8) -> Option<Self> {
        match self.0.checked_sub(u32::from(hours)) {
            Some(hour) if hour > 0 => Some(Self(hour)),
            _ => None,
        }
    }

    /// Start of the hour, `None` for the lifetime bucket
    pub fn start_time(self) -> Option<DateTime<Utc>> {
        if self.is_lifetime() {
            return None;
        }
        Utc.timestamp_opt(i64::from(self.0) * SECONDS_PER_HOUR, 0).single()
    }

    /// When rows of this bucket stop being retained. Lifetime rows never expire.
    pub fn expires_at(self, retention: Duration) -> Option<DateTime<Utc>> {
        self.start_time().map(|start| start + retention)
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// HourOffsets
// ============================================================================

/// A validated set of "hours ago" offsets for hourly counter queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourOffsets(BTreeSet<u8>);

impl HourOffsets {
    /// Offsets must fall inside the retention window (`offset < retention_hours`)
    pub fn new(
        offsets: impl IntoIterator<Item = u8>,
        retention_hours: u32,
    ) -> Result<Self, DomainError> {
        let offsets: BTreeSet<u8> = offsets.into_iter().collect();
        if offsets.is_empty() {
            return Err(DomainError::ValidationError(
                "at least one hour offset is required".to_string(),
            ));
        }
        if let Some(&offset) = offsets
            .iter()
            .find(|&&offset| u32::from(offset) >= retention_hours)
        {
            return Err(DomainError::InvalidHourOffset {
                offset,
                max: retention_hours.saturating_sub(1),
            });
        }
        Ok(Self(offsets))
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve each offset against the current bucket
    pub fn resolve(&self, current: HourBucket) -> Vec<(u8, HourBucket)> {
        self.iter()
            .filter_map(|offset| current.hours_before(offset).map(|bucket| (offset, bucket)))
            .collect()
    }
}

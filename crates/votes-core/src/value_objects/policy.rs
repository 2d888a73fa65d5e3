//! Voting policy - retry bound and retention windows
//!
//! Built once from configuration and handed to each component at construction.

use chrono::Duration;

/// Default number of extra attempts after a version conflict
pub const DEFAULT_VERSION_CONFLICT_RETRIES: u32 = 3;
/// Default lifetime of hourly counter rows
pub const DEFAULT_COUNTERS_TTL_HOURS: u32 = 48;
pub const DEFAULT_MUTUAL_ROMANCE_TTL_DAYS: u32 = 546;
pub const DEFAULT_ONE_SIDED_ROMANCE_TTL_DAYS: u32 = 180;
pub const DEFAULT_INACTIVE_ROMANCE_TTL_DAYS: u32 = 90;

/// Relationship category that decides how long a romance row is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomanceCategory {
    /// Both sides voted positively
    Mutual,
    /// At least one side voted, not mutual
    OneSided,
    /// The last write retracted a vote
    Inactive,
}

/// Retention window per romance category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomanceRetention {
    pub mutual: Duration,
    pub one_sided: Duration,
    pub inactive: Duration,
}

impl RomanceRetention {
    pub fn from_days(mutual: u32, one_sided: u32, inactive: u32) -> Self {
        Self {
            mutual: Duration::days(i64::from(mutual)),
            one_sided: Duration::days(i64::from(one_sided)),
            inactive: Duration::days(i64::from(inactive)),
        }
    }

    pub fn ttl(&self, category: RomanceCategory) -> Duration {
        match category {
            RomanceCategory::Mutual => self.mutual,
            RomanceCategory::OneSided => self.one_sided,
            RomanceCategory::Inactive => self.inactive,
        }
    }
}

impl Default for RomanceRetention {
    fn default() -> Self {
        Self::from_days(
            DEFAULT_MUTUAL_ROMANCE_TTL_DAYS,
            DEFAULT_ONE_SIDED_ROMANCE_TTL_DAYS,
            DEFAULT_INACTIVE_ROMANCE_TTL_DAYS,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingPolicy {
    /// Extra attempts after the first conditional write loses a race
    pub version_conflict_retries: u32,
    /// Retention of hourly counter rows, in hours
    pub counters_ttl_hours: u32,
    pub romance_retention: RomanceRetention,
}

impl VotingPolicy {
    #[inline]
    pub fn counters_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.counters_ttl_hours))
    }

    /// Total conditional-write attempts, first try included
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.version_conflict_retries.saturating_add(1)
    }
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            version_conflict_retries: DEFAULT_VERSION_CONFLICT_RETRIES,
            counters_ttl_hours: DEFAULT_COUNTERS_TTL_HOURS,
            romance_retention: RomanceRetention::default(),
        }
    }
}

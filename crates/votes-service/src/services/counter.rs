//! Counter service
//!
//! Records counter increments for successful vote writes and reads lifetime
//! and hourly counters.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use votes_core::{
    plan_increments, ActiveUserKey, CounterUpdateGroup, HourBucket, HourOffsets, VoteIdentity,
    VoteType,
};

use crate::dto::{CountersResponse, HourlyCountersEntry, HourlyCountersResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Counter service
pub struct CounterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CounterService<'a> {
    /// Create a new CounterService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply the counter rule to a vote going from `old` to `new`.
    ///
    /// Increments run on a detached task so the vote never waits on them;
    /// failures are logged and dropped.
    pub fn record(
        &self,
        identity: &VoteIdentity,
        old: VoteType,
        new: VoteType,
        group: CounterUpdateGroup,
    ) {
        let increments = plan_increments(identity, old, new, group);
        if increments.is_empty() {
            debug!(identity = %identity, %old, %new, "No counters to update");
            return;
        }

        let repo = self.ctx.counter_repo_handle();
        tokio::spawn(async move {
            for increment in increments {
                if let Err(e) = repo
                    .increment(&increment.user_key, increment.hour_bucket, increment.field)
                    .await
                {
                    warn!(
                        error = %e,
                        user = %increment.user_key,
                        bucket = %increment.hour_bucket,
                        field = %increment.field,
                        "Counter increment failed"
                    );
                }
            }
        });
    }

    /// Lifetime counters of a user, zeros when none were recorded
    #[instrument(skip(self, user_key), fields(user = %user_key))]
    pub async fn lifetime(&self, user_key: &ActiveUserKey) -> ServiceResult<CountersResponse> {
        let group = self
            .ctx
            .counter_repo()
            .get(user_key, HourBucket::LIFETIME)
            .await?;
        Ok(group.into())
    }

    /// Hourly counters for each offset, where offset `k` is `k` hours before `now`
    #[instrument(skip(self, user_key), fields(user = %user_key))]
    pub async fn hourly(
        &self,
        user_key: &ActiveUserKey,
        offsets: Vec<u8>,
        now: DateTime<Utc>,
    ) -> ServiceResult<HourlyCountersResponse> {
        let offsets = HourOffsets::new(offsets, self.ctx.policy().counters_ttl_hours)?;
        let current = HourBucket::from_event_time(now)?;
        let resolved = offsets.resolve(current);

        let buckets: Vec<HourBucket> = resolved.iter().map(|&(_, bucket)| bucket).collect();
        let groups = self.ctx.counter_repo().get_many(user_key, &buckets).await?;

        Ok(HourlyCountersResponse {
            current_hour_bucket: current.into_inner(),
            buckets: resolved
                .into_iter()
                .zip(groups)
                .map(|((offset, _), group)| HourlyCountersEntry {
                    offset,
                    counters: group.into(),
                })
                .collect(),
        })
    }
}

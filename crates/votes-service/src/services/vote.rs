//! Vote service
//!
//! Adds, reads, changes and deletes one user's vote on a peer. Every write
//! goes through the optimistic retry loop on the pair's romance.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use votes_core::{CounterUpdateGroup, DomainError, HourBucket, VoteIdentity, VoteType};

use crate::dto::VoteResponse;

use super::context::ServiceContext;
use super::counter::CounterService;
use super::error::ServiceResult;
use super::retry::{load_romance, OptimisticRetry, WriteKind};

/// Vote service
pub struct VoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VoteService<'a> {
    /// Create a new VoteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn retry(&self) -> OptimisticRetry<'a> {
        OptimisticRetry::new(self.ctx.romance_repo(), self.ctx.policy())
    }

    /// Cast a vote, or escalate an existing one.
    ///
    /// `voted_at` is kept on the vote; counters use the current hour.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn add_vote(
        &self,
        identity: VoteIdentity,
        vote_type: VoteType,
        voted_at: DateTime<Utc>,
    ) -> ServiceResult<VoteResponse> {
        // Reject bad event times before anything is written
        HourBucket::from_event_time(voted_at)?;

        // Counters are bucketed when the vote is processed; voted_at is only stored
        let now = Utc::now();
        let group = CounterUpdateGroup::new(now)?;

        let mutation = self
            .retry()
            .run(&identity, WriteKind::Vote, |romance| {
                romance.add_active_vote(vote_type, voted_at, now)
            })
            .await?;

        let old = mutation.before.active_user_vote.vote_type;
        CounterService::new(self.ctx).record(&identity, old, vote_type, group);

        info!(
            vote_type = %vote_type,
            version = mutation.after.version,
            "Vote added"
        );
        Ok(VoteResponse::from(&mutation.after.active_user_vote))
    }

    /// The caller's own vote; `VoteNotFound` if they have not voted
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_vote(&self, identity: VoteIdentity) -> ServiceResult<VoteResponse> {
        let romance = load_romance(self.ctx.romance_repo(), &identity).await?;
        if romance.active_user_vote.is_empty() {
            return Err(DomainError::VoteNotFound.into());
        }
        Ok(VoteResponse::from(&romance.active_user_vote))
    }

    /// Change the type of an existing vote.
    ///
    /// Counters follow the same polarity rule as adds, bucketed at the time
    /// of the change.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn change_vote(
        &self,
        identity: VoteIdentity,
        vote_type: VoteType,
    ) -> ServiceResult<VoteResponse> {
        let changed_at = Utc::now();
        let group = CounterUpdateGroup::new(changed_at)?;

        let mutation = self
            .retry()
            .run(&identity, WriteKind::Vote, |romance| {
                romance.change_active_vote_type(vote_type, changed_at)
            })
            .await?;

        let old = mutation.before.active_user_vote.vote_type;
        CounterService::new(self.ctx).record(&identity, old, vote_type, group);

        info!(
            from = %old,
            to = %vote_type,
            version = mutation.after.version,
            "Vote changed"
        );
        Ok(VoteResponse::from(&mutation.after.active_user_vote))
    }

    /// Withdraw the caller's vote. Counters are left as they are.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn delete_vote(&self, identity: VoteIdentity) -> ServiceResult<()> {
        let mutation = self
            .retry()
            .run(&identity, WriteKind::Retract, |romance| {
                romance.delete_active_vote()
            })
            .await?;

        info!(
            removed = %mutation.before.active_user_vote.vote_type,
            romance_removed = mutation.after.is_empty(),
            "Vote deleted"
        );
        Ok(())
    }
}

//! Optimistic concurrency for romance writes
//!
//! Every romance mutation reads the current row, computes the new state and
//! writes it back only if the stored version is unchanged. A lost race
//! re-reads and tries again, immediately and up to the configured bound.
//! Transition errors abort at once and nothing is written.

use chrono::Utc;
use tracing::{debug, warn};

use votes_core::traits::RomanceRepository;
use votes_core::{DomainError, Romance, VoteIdentity, VotingPolicy};

/// Whether a write retracts a vote, which selects the shorter retention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Vote,
    Retract,
}

/// The romance before and after a successful write
#[derive(Debug, Clone)]
pub struct Mutation {
    pub before: Romance,
    pub after: Romance,
    pub attempts: u32,
}

/// Load a romance from `identity`'s side, or an empty unsaved one if absent
pub async fn load_romance(
    repo: &dyn RomanceRepository,
    identity: &VoteIdentity,
) -> Result<Romance, DomainError> {
    match repo.get(identity).await {
        Ok(romance) => Ok(romance),
        Err(DomainError::RomanceNotFound) => Ok(Romance::empty(*identity)),
        Err(e) => Err(e),
    }
}

/// Bounded read-modify-write loop over one romance
pub struct OptimisticRetry<'a> {
    repo: &'a dyn RomanceRepository,
    policy: &'a VotingPolicy,
}

impl<'a> OptimisticRetry<'a> {
    pub fn new(repo: &'a dyn RomanceRepository, policy: &'a VotingPolicy) -> Self {
        Self { repo, policy }
    }

    /// Apply `mutate` to the current romance until the conditional write lands
    pub async fn run<F>(
        &self,
        identity: &VoteIdentity,
        kind: WriteKind,
        mut mutate: F,
    ) -> Result<Mutation, DomainError>
    where
        F: FnMut(&Romance) -> Result<Romance, DomainError> + Send,
    {
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            let before = load_romance(self.repo, identity).await?;
            let intent = mutate(&before)?;

            let now = Utc::now();
            let expires_at = intent.expires_at(
                now,
                &self.policy.romance_retention,
                kind == WriteKind::Retract,
            );

            match self
                .repo
                .conditional_put(&intent, before.version, expires_at)
                .await
            {
                Ok(after) => {
                    debug!(
                        identity = %identity,
                        version = after.version,
                        attempt,
                        "Romance written"
                    );
                    return Ok(Mutation {
                        before,
                        after,
                        attempts: attempt,
                    });
                }
                Err(DomainError::VersionConflict) => {
                    debug!(
                        identity = %identity,
                        expected_version = before.version,
                        attempt,
                        "Version conflict, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(identity = %identity, attempts = max_attempts, "Version conflict retries exhausted");
        Err(DomainError::VersionConflictExhausted {
            attempts: max_attempts,
        })
    }
}

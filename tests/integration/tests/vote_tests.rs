//! Vote and romance scenarios over the in-memory stores
//!
//! Run with: cargo test -p integration-tests --test vote_tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use integration_tests::{
    identity, time_in_hour, user_id, ContendedRomanceRepository, MemoryRomanceRepository,
    TestBackends,
};
use votes_core::traits::RomanceRepository;
use votes_core::{DomainError, Romance, VoteType, VotingPolicy};
use votes_service::{load_romance, RomanceService, ServiceError, VoteService};

fn domain(err: ServiceError) -> DomainError {
    err.into_domain()
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn test_written_romance_reads_back_identically() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let voted_at = time_in_hour(480_000);

    let added = VoteService::new(&backends.ctx)
        .add_vote(identity(a, b), VoteType::Yes, voted_at)
        .await
        .unwrap();

    let stored = backends.romances.get(&identity(a, b)).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.active_user_vote.vote_type, VoteType::Yes);
    assert_eq!(stored.active_user_vote.voted_at, Some(voted_at));
    assert_eq!(stored.active_user_vote.created_at, added.created_at);
    assert_eq!(stored.active_user_vote.updated_at, added.updated_at);
    assert!(stored.peer_user_vote.is_empty());

    let fetched = VoteService::new(&backends.ctx)
        .get_vote(identity(a, b))
        .await
        .unwrap();
    assert_eq!(fetched, added);
}

#[tokio::test]
async fn test_romance_is_seen_from_either_side() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let now = Utc::now();

    let votes = VoteService::new(&backends.ctx);
    votes.add_vote(identity(a, b), VoteType::Yes, now).await.unwrap();
    votes.add_vote(identity(b, a), VoteType::Crush, now).await.unwrap();

    let romances = RomanceService::new(&backends.ctx);
    let from_a = romances.get_romance(identity(a, b)).await.unwrap();
    let from_b = romances.get_romance(identity(b, a)).await.unwrap();

    assert_eq!(backends.romances.len(), 1);
    assert_eq!(from_a.version, 2);
    assert!(from_a.mutual);
    assert_eq!(from_a.active_user_vote.vote_type, VoteType::Yes);
    assert_eq!(from_a.peer_user_vote.vote_type, VoteType::Crush);
    assert_eq!(from_b.active_user_vote, from_a.peer_user_vote);
    assert_eq!(from_b.peer_user_vote, from_a.active_user_vote);
}

#[tokio::test]
async fn test_absent_romance_reads_as_empty() {
    let backends = TestBackends::new();
    let romance = RomanceService::new(&backends.ctx)
        .get_romance(identity(user_id(), user_id()))
        .await
        .unwrap();

    assert_eq!(romance.version, 0);
    assert!(!romance.mutual);
    assert_eq!(romance.active_user_vote.vote_type, VoteType::Empty);
    assert_eq!(romance.peer_user_vote.vote_type, VoteType::Empty);
}

// ============================================================================
// Transition rules
// ============================================================================

#[tokio::test]
async fn test_rule_violations_abort_without_writing() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);
    let now = Utc::now();

    votes.add_vote(identity(a, b), VoteType::Crush, now).await.unwrap();

    let duplicate = votes
        .add_vote(identity(a, b), VoteType::Crush, now)
        .await
        .unwrap_err();
    assert!(matches!(domain(duplicate), DomainError::DuplicateVote(VoteType::Crush)));

    let illegal = votes
        .change_vote(identity(a, b), VoteType::Yes)
        .await
        .unwrap_err();
    assert!(matches!(
        domain(illegal),
        DomainError::IllegalVoteTransition {
            from: VoteType::Crush,
            to: VoteType::Yes
        }
    ));

    let stored = backends.romances.get(&identity(a, b)).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.active_user_vote.vote_type, VoteType::Crush);
    assert_eq!(backends.romances.conflicts(), 0);
}

#[tokio::test]
async fn test_change_requires_existing_vote() {
    let backends = TestBackends::new();
    let err = VoteService::new(&backends.ctx)
        .change_vote(identity(user_id(), user_id()), VoteType::Yes)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::VoteNotFound));
    assert!(backends.romances.is_empty());
}

#[tokio::test]
async fn test_bad_event_time_is_rejected_before_writing() {
    let backends = TestBackends::new();
    let epoch = chrono::DateTime::<Utc>::UNIX_EPOCH;
    let err = VoteService::new(&backends.ctx)
        .add_vote(identity(user_id(), user_id()), VoteType::Yes, epoch)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidEventTime));
    assert!(backends.romances.is_empty());
}

// ============================================================================
// Delete vote / delete romance
// ============================================================================

#[tokio::test]
async fn test_deleting_last_vote_removes_the_row() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);
    let now = Utc::now();

    votes.add_vote(identity(a, b), VoteType::No, now).await.unwrap();
    votes.add_vote(identity(b, a), VoteType::Yes, now).await.unwrap();

    votes.delete_vote(identity(a, b)).await.unwrap();
    let remaining = backends.romances.get(&identity(b, a)).await.unwrap();
    assert_eq!(remaining.version, 3);
    assert_eq!(remaining.active_user_vote.vote_type, VoteType::Yes);
    assert!(remaining.peer_user_vote.is_empty());

    votes.delete_vote(identity(b, a)).await.unwrap();
    assert!(backends.romances.is_empty());

    let err = votes.get_vote(identity(b, a)).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::VoteNotFound));
    let err = votes.delete_vote(identity(b, a)).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::VoteNotFound));
}

#[tokio::test]
async fn test_delete_romance_is_idempotent() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    VoteService::new(&backends.ctx)
        .add_vote(identity(a, b), VoteType::Yes, Utc::now())
        .await
        .unwrap();

    let romances = RomanceService::new(&backends.ctx);
    assert!(romances.delete_romance(identity(b, a)).await.unwrap());
    assert!(!romances.delete_romance(identity(a, b)).await.unwrap());
    assert!(backends.romances.is_empty());
}

// ============================================================================
// Retention
// ============================================================================

#[tokio::test]
async fn test_retention_follows_relationship_category() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);
    let (key, _) = identity(a, b).pair_key();
    let slack = Duration::minutes(1);

    let before = Utc::now();
    votes.add_vote(identity(a, b), VoteType::Yes, before).await.unwrap();
    let one_sided = backends.romances.expires_at(&key).unwrap();
    assert!(one_sided >= before + Duration::days(180));
    assert!(one_sided <= Utc::now() + Duration::days(180) + slack);

    votes.add_vote(identity(b, a), VoteType::Compliment, Utc::now()).await.unwrap();
    let mutual = backends.romances.expires_at(&key).unwrap();
    assert!(mutual >= before + Duration::days(546));

    votes.delete_vote(identity(a, b)).await.unwrap();
    let inactive = backends.romances.expires_at(&key).unwrap();
    assert!(inactive >= before + Duration::days(90));
    assert!(inactive <= Utc::now() + Duration::days(90) + slack);
}

// ============================================================================
// Optimistic concurrency
// ============================================================================

#[tokio::test]
async fn test_one_conditional_write_wins_per_version() {
    let repo = Arc::new(MemoryRomanceRepository::new());
    let (a, b) = (user_id(), user_id());
    let now = Utc::now();
    let expires_at = now + Duration::days(1);

    let base = Romance::empty(identity(a, b))
        .add_active_vote(VoteType::No, now, now)
        .unwrap();
    let stored = repo.conditional_put(&base, 0, expires_at).await.unwrap();
    assert_eq!(stored.version, 1);

    let mut tasks = Vec::new();
    for vote_type in [VoteType::Yes, VoteType::Crush, VoteType::Compliment] {
        let repo = Arc::clone(&repo);
        let candidate = stored.add_active_vote(vote_type, now, now).unwrap();
        tasks.push(tokio::spawn(async move {
            repo.conditional_put(&candidate, 1, expires_at).await
        }));
    }

    let mut won = 0;
    let mut conflicted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(romance) => {
                assert_eq!(romance.version, 2);
                won += 1;
            }
            Err(DomainError::VersionConflict) => conflicted += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(conflicted, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_on_one_pair_all_land() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let now = Utc::now();

    let ctx_a = backends.ctx.clone();
    let ctx_b = backends.ctx.clone();
    let first = tokio::spawn(async move {
        VoteService::new(&ctx_a)
            .add_vote(identity(a, b), VoteType::Yes, now)
            .await
    });
    let second = tokio::spawn(async move {
        VoteService::new(&ctx_b)
            .add_vote(identity(b, a), VoteType::No, now)
            .await
    });
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let romance = load_romance(backends.romances.as_ref(), &identity(a, b))
        .await
        .unwrap();
    assert_eq!(romance.version, 2);
    assert_eq!(romance.active_user_vote.vote_type, VoteType::Yes);
    assert_eq!(romance.peer_user_vote.vote_type, VoteType::No);
}

#[tokio::test]
async fn test_conflicts_within_the_bound_are_retried() {
    let romances = Arc::new(MemoryRomanceRepository::new());
    let contended = Arc::new(ContendedRomanceRepository::new(Arc::<MemoryRomanceRepository>::clone(&romances), 3));
    let backends = TestBackends::build(contended.clone(), romances, VotingPolicy::default());

    let vote = VoteService::new(&backends.ctx)
        .add_vote(identity(user_id(), user_id()), VoteType::Yes, Utc::now())
        .await
        .unwrap();

    assert_eq!(vote.vote_type, VoteType::Yes);
    assert_eq!(contended.attempts(), 4);
    assert_eq!(backends.romances.len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_surface_distinct_error() {
    let romances = Arc::new(MemoryRomanceRepository::new());
    let contended = Arc::new(ContendedRomanceRepository::new(Arc::<MemoryRomanceRepository>::clone(&romances), 100));
    let backends = TestBackends::build(contended.clone(), romances, VotingPolicy::default());

    let err = VoteService::new(&backends.ctx)
        .add_vote(identity(user_id(), user_id()), VoteType::Yes, Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 503);
    assert!(matches!(
        domain(err),
        DomainError::VersionConflictExhausted { attempts: 4 }
    ));
    assert_eq!(contended.attempts(), 4);
    assert!(backends.romances.is_empty());
}

#[tokio::test]
async fn test_retry_bound_follows_policy() {
    let romances = Arc::new(MemoryRomanceRepository::new());
    let contended = Arc::new(ContendedRomanceRepository::new(Arc::<MemoryRomanceRepository>::clone(&romances), 100));
    let policy = VotingPolicy {
        version_conflict_retries: 0,
        ..VotingPolicy::default()
    };
    let backends = TestBackends::build(contended.clone(), romances, policy);

    let err = VoteService::new(&backends.ctx)
        .add_vote(identity(user_id(), user_id()), VoteType::No, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(
        domain(err),
        DomainError::VersionConflictExhausted { attempts: 1 }
    ));
    assert_eq!(contended.attempts(), 1);
}

//! Counter aggregation scenarios
//!
//! Counter updates run detached from the vote, so assertions poll with
//! `eventually` before checking that nothing else moved.

use std::time::Duration;

use chrono::Utc;
use integration_tests::{
    current_bucket, eventually, identity, time_in_hour, user_id, user_key, TestBackends,
};
use votes_core::{CountersGroup, DomainError, HourBucket, VoteType};
use votes_service::{CounterService, VoteService};

const WAIT: Duration = Duration::from_secs(2);

fn totals(group: &CountersGroup) -> (u32, u32, u32, u32) {
    (
        group.incoming_yes,
        group.incoming_no,
        group.outgoing_yes,
        group.outgoing_no,
    )
}

async fn wait_for_increments(backends: &TestBackends, expected: usize) {
    let counters = backends.counters.clone();
    assert!(
        eventually(WAIT, || {
            let counters = counters.clone();
            async move { counters.increments() >= expected }
        })
        .await,
        "expected {expected} increments, saw {}",
        backends.counters.increments()
    );
    // Give any unexpected extra increment a chance to land
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Hour buckets current while `run` executed, one or two if the hour turned
async fn during<F, Fut>(run: F) -> Vec<HourBucket>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let before = current_bucket();
    run().await;
    let after = current_bucket();
    if before == after {
        vec![before]
    } else {
        vec![before, after]
    }
}

fn hourly_total(
    backends: &TestBackends,
    user: uuid::Uuid,
    buckets: &[HourBucket],
) -> (u32, u32, u32, u32) {
    buckets
        .iter()
        .map(|&bucket| totals(&backends.counters.snapshot(&user_key(user), bucket)))
        .fold((0, 0, 0, 0), |acc, t| (acc.0 + t.0, acc.1 + t.1, acc.2 + t.2, acc.3 + t.3))
}

#[tokio::test]
async fn test_yes_vote_counts_for_voter_and_peer_in_both_buckets() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());

    let ctx = &backends.ctx;
    let buckets = during(|| async move {
        VoteService::new(ctx)
            .add_vote(identity(a, b), VoteType::Yes, Utc::now())
            .await
            .unwrap();
    })
    .await;
    wait_for_increments(&backends, 4).await;
    assert_eq!(backends.counters.increments(), 4);

    let voter = backends.counters.snapshot(&user_key(a), HourBucket::LIFETIME);
    let peer = backends.counters.snapshot(&user_key(b), HourBucket::LIFETIME);
    assert_eq!(totals(&voter), (0, 0, 1, 0));
    assert_eq!(totals(&peer), (1, 0, 0, 0));

    assert_eq!(hourly_total(&backends, a, &buckets), (0, 0, 1, 0));
    assert_eq!(hourly_total(&backends, b, &buckets), (1, 0, 0, 0));
}

#[tokio::test]
async fn test_backdated_vote_counts_in_the_current_hour() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let month_ago = Utc::now() - chrono::Duration::days(30);

    let vote = VoteService::new(&backends.ctx)
        .add_vote(identity(a, b), VoteType::Yes, month_ago)
        .await
        .unwrap();
    wait_for_increments(&backends, 4).await;
    assert_eq!(vote.voted_at, Some(votes_core::to_storage_precision(month_ago)));

    let offsets: Vec<u8> = (0..48).collect();
    let hourly = CounterService::new(&backends.ctx)
        .hourly(&user_key(a), offsets, Utc::now())
        .await
        .unwrap();
    let outgoing_yes: u32 = hourly.buckets.iter().map(|e| e.counters.outgoing_yes).sum();
    assert_eq!(outgoing_yes, 1);

    let lifetime = CounterService::new(&backends.ctx)
        .lifetime(&user_key(a))
        .await
        .unwrap();
    assert_eq!(lifetime.outgoing_yes, 1);

    // Nothing lands in the bucket the client claimed
    let claimed = HourBucket::from_event_time(month_ago).unwrap();
    assert_eq!(totals(&backends.counters.snapshot(&user_key(a), claimed)), (0, 0, 0, 0));
}

#[tokio::test]
async fn test_future_dated_vote_counts_in_the_current_hour() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let hour = 9_000_000;

    let ctx = &backends.ctx;
    let buckets = during(|| async move {
        VoteService::new(ctx)
            .add_vote(identity(a, b), VoteType::No, time_in_hour(hour))
            .await
            .unwrap();
    })
    .await;
    wait_for_increments(&backends, 4).await;

    assert_eq!(hourly_total(&backends, a, &buckets), (0, 0, 0, 1));
    assert_eq!(
        totals(&backends.counters.snapshot(&user_key(a), HourBucket::new(hour))),
        (0, 0, 0, 0)
    );
}

#[tokio::test]
async fn test_escalation_within_positive_does_not_recount() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);

    votes
        .add_vote(identity(a, b), VoteType::Yes, Utc::now())
        .await
        .unwrap();
    wait_for_increments(&backends, 4).await;

    votes
        .change_vote(identity(a, b), VoteType::Crush)
        .await
        .unwrap();
    votes
        .add_vote(identity(a, b), VoteType::Compliment, Utc::now())
        .await
        .unwrap_err();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(backends.counters.increments(), 4);
    let voter = backends.counters.snapshot(&user_key(a), HourBucket::LIFETIME);
    let peer = backends.counters.snapshot(&user_key(b), HourBucket::LIFETIME);
    assert_eq!(voter.outgoing_yes, 1);
    assert_eq!(peer.incoming_yes, 1);
}

#[tokio::test]
async fn test_change_across_polarity_counts_once() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);

    votes
        .add_vote(identity(a, b), VoteType::No, Utc::now())
        .await
        .unwrap();
    wait_for_increments(&backends, 4).await;

    votes
        .change_vote(identity(a, b), VoteType::Yes)
        .await
        .unwrap();
    wait_for_increments(&backends, 8).await;
    assert_eq!(backends.counters.increments(), 8);

    let voter = backends.counters.snapshot(&user_key(a), HourBucket::LIFETIME);
    let peer = backends.counters.snapshot(&user_key(b), HourBucket::LIFETIME);
    assert_eq!(totals(&voter), (0, 0, 1, 1));
    assert_eq!(totals(&peer), (1, 1, 0, 0));

    // Changes are bucketed at the time of the change
    let hourly = backends.counters.snapshot(&user_key(a), current_bucket());
    assert_eq!(hourly.outgoing_yes, 1);
}

#[tokio::test]
async fn test_delete_vote_leaves_counters_alone() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    let votes = VoteService::new(&backends.ctx);

    votes
        .add_vote(identity(a, b), VoteType::Yes, Utc::now())
        .await
        .unwrap();
    wait_for_increments(&backends, 4).await;

    votes.delete_vote(identity(a, b)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(backends.counters.increments(), 4);
    let voter = backends.counters.snapshot(&user_key(a), HourBucket::LIFETIME);
    assert_eq!(voter.outgoing_yes, 1);
}

#[tokio::test]
async fn test_counter_failures_do_not_fail_the_vote() {
    let backends = TestBackends::new();
    backends.counters.fail_increments(true);
    let (a, b) = (user_id(), user_id());

    let vote = VoteService::new(&backends.ctx)
        .add_vote(identity(a, b), VoteType::Yes, Utc::now())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(vote.vote_type, VoteType::Yes);
    assert_eq!(backends.counters.increments(), 0);
    assert_eq!(backends.romances.len(), 1);
}

#[tokio::test]
async fn test_reads_default_to_zero() {
    let backends = TestBackends::new();
    let key = user_key(user_id());
    let counters = CounterService::new(&backends.ctx);

    let lifetime = counters.lifetime(&key).await.unwrap();
    assert_eq!(lifetime.hour_bucket, 0);
    assert_eq!(lifetime.incoming_yes + lifetime.outgoing_no, 0);

    let hourly = counters.hourly(&key, vec![0, 5], Utc::now()).await.unwrap();
    assert_eq!(hourly.buckets.len(), 2);
    assert_eq!(
        hourly.at(5).unwrap().hour_bucket,
        hourly.current_hour_bucket - 5
    );
    assert_eq!(hourly.at(0).unwrap().outgoing_yes, 0);
}

#[tokio::test]
async fn test_hourly_reads_resolve_offsets_from_now() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());

    let ctx = &backends.ctx;
    let buckets = during(|| async move {
        VoteService::new(ctx)
            .add_vote(identity(a, b), VoteType::No, Utc::now())
            .await
            .unwrap();
    })
    .await;
    wait_for_increments(&backends, 4).await;

    // Read as if two hours have passed since the vote
    let later = buckets[0].start_time().unwrap() + chrono::Duration::hours(2);
    let hourly = CounterService::new(&backends.ctx)
        .hourly(&user_key(a), vec![0, 1, 2], later)
        .await
        .unwrap();
    assert_eq!(hourly.current_hour_bucket, buckets[0].into_inner() + 2);
    assert_eq!(hourly.at(0).unwrap().outgoing_no, 0);
    assert_eq!(
        hourly.at(1).unwrap().outgoing_no + hourly.at(2).unwrap().outgoing_no,
        1
    );
    if buckets.len() == 1 {
        assert_eq!(hourly.at(2).unwrap().outgoing_no, 1);
    }
}

#[tokio::test]
async fn test_offsets_outside_retention_are_rejected() {
    let backends = TestBackends::new();
    let err = CounterService::new(&backends.ctx)
        .hourly(&user_key(user_id()), vec![0, 48], Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(
        err.into_domain(),
        DomainError::InvalidHourOffset { offset: 48, max: 47 }
    ));
}

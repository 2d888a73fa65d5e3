//! Cascade delete and retention purge scenarios
//!
//! Consumers run on the in-memory bus; each test stops them through the same
//! watch channel the worker binary uses.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use integration_tests::{eventually, identity, user_id, user_key, MemoryBus, TestBackends};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;
use votes_core::traits::MessageSubscriber;
use votes_core::{
    DeleteRomancesMessage, Message, MessagePublisher, RomanceRetention, VoteType, VotingPolicy,
};
use votes_service::{ListenStats, RomanceService, ServiceResult, VoteService};
use votes_worker::{run_consumer, run_purge_loop, Shutdown};

const WAIT: Duration = Duration::from_secs(2);

fn spawn_consumer(
    backends: &TestBackends,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<ServiceResult<ListenStats>> {
    let subscriber: Arc<dyn MessageSubscriber> = Arc::new(backends.bus.clone());
    let ctx = backends.ctx.clone();
    tokio::spawn(async move { run_consumer(subscriber, ctx, 10, shutdown).await })
}

async fn wait_for(bus: &MemoryBus, check: impl Fn(&MemoryBus) -> bool) {
    let bus = bus.clone();
    let check = &check;
    assert!(
        eventually(WAIT, || {
            let bus = bus.clone();
            async move { check(&bus) }
        })
        .await,
        "bus never reached the expected state"
    );
}

async fn vote(backends: &TestBackends, active: Uuid, peer: Uuid) {
    VoteService::new(&backends.ctx)
        .add_vote(identity(active, peer), VoteType::Yes, Utc::now())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cascade_removes_every_romance_of_the_user() {
    let backends = TestBackends::new();
    let (a, b, c) = (user_id(), user_id(), user_id());
    let (d, e) = (user_id(), user_id());
    vote(&backends, a, b).await;
    vote(&backends, c, a).await;
    vote(&backends, d, e).await;
    assert_eq!(backends.romances.len(), 3);

    let accepted = RomanceService::new(&backends.ctx)
        .request_delete_all(user_key(a))
        .await
        .unwrap();
    assert!(!accepted.message_id.is_empty());
    // Publishing alone deletes nothing
    assert_eq!(backends.romances.len(), 3);

    let shutdown = Shutdown::new();
    let consumer = spawn_consumer(&backends, shutdown.subscribe());
    wait_for(&backends.bus, |bus| bus.acked().len() == 1).await;
    shutdown.trigger();

    let stats = consumer.await.unwrap().unwrap();
    assert_eq!(
        stats,
        ListenStats {
            handled: 1,
            failed: 0,
            malformed: 0
        }
    );
    assert_eq!(backends.romances.len(), 1);
    assert_eq!(backends.bus.closed_subscriptions(), 1);
}

#[tokio::test]
async fn test_repeated_cascade_is_harmless() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    vote(&backends, a, b).await;
    let romances = RomanceService::new(&backends.ctx);

    romances.request_delete_all(user_key(a)).await.unwrap();
    let first = Shutdown::new();
    let consumer = spawn_consumer(&backends, first.subscribe());
    wait_for(&backends.bus, |bus| bus.acked().len() == 1).await;
    first.trigger();
    consumer.await.unwrap().unwrap();
    assert!(backends.romances.is_empty());

    // A second request for the same user finds nothing and still acks
    romances.request_delete_all(user_key(a)).await.unwrap();
    let second = Shutdown::new();
    let consumer = spawn_consumer(&backends, second.subscribe());
    wait_for(&backends.bus, |bus| bus.acked().len() == 2).await;
    second.trigger();

    let stats = consumer.await.unwrap().unwrap();
    assert_eq!(stats.handled, 1);
    assert_eq!(stats.failed, 0);
    assert!(backends.romances.is_empty());
    assert!(backends.bus.dead_letters().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_dead_lettered() {
    let backends = TestBackends::new();
    backends
        .bus
        .publish_raw(DeleteRomancesMessage::TOPIC, b"{\"id\": 42".to_vec())
        .await
        .unwrap();

    let shutdown = Shutdown::new();
    let consumer = spawn_consumer(&backends, shutdown.subscribe());
    wait_for(&backends.bus, |bus| bus.dead_letters().len() == 1).await;
    shutdown.trigger();

    let stats = consumer.await.unwrap().unwrap();
    assert_eq!(stats.malformed, 3);
    assert_eq!(stats.handled, 0);
    assert_eq!(backends.bus.nacked(), 3);
    assert!(backends.bus.acked().is_empty());

    let dead = &backends.bus.dead_letters()[0];
    assert_eq!(dead.topic, DeleteRomancesMessage::TOPIC);
    assert_eq!(dead.deliveries, 3);
    assert_eq!(backends.bus.closed_subscriptions(), 1);
}

#[tokio::test]
async fn test_failing_handler_nacks_until_dead_lettered() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    vote(&backends, a, b).await;

    // Decodes fine but names no valid user
    let message = DeleteRomancesMessage {
        id: Uuid::new_v4(),
        active_user_id: Uuid::nil(),
        country_id: 5,
    };
    backends
        .bus
        .publish_raw(DeleteRomancesMessage::TOPIC, message.encode().unwrap())
        .await
        .unwrap();

    let shutdown = Shutdown::new();
    let consumer = spawn_consumer(&backends, shutdown.subscribe());
    wait_for(&backends.bus, |bus| bus.dead_letters().len() == 1).await;
    shutdown.trigger();

    let stats = consumer.await.unwrap().unwrap();
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.malformed, 0);
    assert_eq!(backends.romances.len(), 1);
}

#[tokio::test]
async fn test_consumer_keeps_going_after_a_bad_message() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    vote(&backends, a, b).await;

    backends
        .bus
        .publish_raw(DeleteRomancesMessage::TOPIC, b"nope".to_vec())
        .await
        .unwrap();
    RomanceService::new(&backends.ctx)
        .request_delete_all(user_key(b))
        .await
        .unwrap();

    let shutdown = Shutdown::new();
    let consumer = spawn_consumer(&backends, shutdown.subscribe());
    wait_for(&backends.bus, |bus| {
        bus.acked().len() == 1 && bus.dead_letters().len() == 1
    })
    .await;
    shutdown.trigger();

    let stats = consumer.await.unwrap().unwrap();
    assert_eq!(stats.handled, 1);
    assert_eq!(stats.malformed, 3);
    assert!(backends.romances.is_empty());
}

#[tokio::test]
async fn test_purge_loop_removes_expired_romances() {
    let expired = chrono::Duration::seconds(-1);
    let policy = VotingPolicy {
        romance_retention: RomanceRetention {
            mutual: expired,
            one_sided: expired,
            inactive: expired,
        },
        ..VotingPolicy::default()
    };
    let backends = TestBackends::with_policy(policy);
    for _ in 0..5 {
        vote(&backends, user_id(), user_id()).await;
    }
    assert_eq!(backends.romances.len(), 5);

    let shutdown = Shutdown::new();
    let ctx = backends.ctx.clone();
    let purge = tokio::spawn(run_purge_loop(
        ctx,
        Duration::from_secs(3600),
        2,
        shutdown.subscribe(),
    ));

    let romances = backends.romances.clone();
    assert!(
        eventually(WAIT, || {
            let romances = romances.clone();
            async move { romances.is_empty() }
        })
        .await
    );
    shutdown.trigger();

    assert_eq!(purge.await.unwrap(), 5);
}

#[tokio::test]
async fn test_purge_keeps_live_romances() {
    let backends = TestBackends::new();
    let (a, b) = (user_id(), user_id());
    vote(&backends, a, b).await;

    let romances = RomanceService::new(&backends.ctx);
    assert_eq!(romances.purge_expired(Utc::now(), 10).await.unwrap(), 0);
    assert_eq!(backends.romances.len(), 1);

    // One-sided rows are kept for 180 days
    let later = Utc::now() + chrono::Duration::days(181);
    assert_eq!(romances.purge_expired(later, 10).await.unwrap(), 1);
    assert!(backends.romances.is_empty());
}

#[tokio::test]
async fn test_purge_loop_stops_on_shutdown() {
    let backends = TestBackends::new();
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let purged = run_purge_loop(
        backends.ctx.clone(),
        Duration::from_millis(10),
        10,
        shutdown.subscribe(),
    )
    .await;
    assert_eq!(purged, 0);
}

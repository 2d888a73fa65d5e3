//! Generic listen loop over a subscription
//!
//! Each delivery is decoded into `M` and handed to the handler. Success acks,
//! a handler error or an undecodable payload nacks; the loop keeps going in
//! both cases. A shutdown signal stops the loop between deliveries and the
//! subscription is closed before returning.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use votes_core::traits::{Delivery, Message, MessageHandler, MessageSubscriber};

use crate::services::ServiceResult;

/// Pause after a failed receive before trying again
pub const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// What a listen loop did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenStats {
    pub handled: u64,
    pub failed: u64,
    pub malformed: u64,
}

enum Outcome {
    Handled,
    Failed,
    Malformed,
}

/// Consume `M::TOPIC` until `shutdown` changes or its sender is dropped
pub async fn listen<M: Message>(
    subscriber: &dyn MessageSubscriber,
    handler: &dyn MessageHandler<M>,
    mut shutdown: watch::Receiver<bool>,
) -> ServiceResult<ListenStats> {
    let mut subscription = subscriber.subscribe(M::TOPIC).await?;
    let mut stats = ListenStats::default();
    info!(topic = M::TOPIC, "Listening");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let next = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            next = subscription.next() => next,
        };

        match next {
            Ok(Some(delivery)) => match process(handler, delivery).await {
                Outcome::Handled => stats.handled += 1,
                Outcome::Failed => stats.failed += 1,
                Outcome::Malformed => stats.malformed += 1,
            },
            Ok(None) => {
                info!(topic = M::TOPIC, "Subscription ended");
                break;
            }
            Err(e) => {
                error!(topic = M::TOPIC, error = %e, "Receive failed");
                tokio::select! {
                    _ = shutdown.changed() => break,
                    () = tokio::time::sleep(RECEIVE_ERROR_BACKOFF) => {}
                }
            }
        }
    }

    if let Err(e) = subscription.close().await {
        warn!(topic = M::TOPIC, error = %e, "Failed to close subscription");
    }
    info!(
        topic = M::TOPIC,
        handled = stats.handled,
        failed = stats.failed,
        malformed = stats.malformed,
        "Listener stopped"
    );
    Ok(stats)
}

async fn process<M: Message>(
    handler: &dyn MessageHandler<M>,
    delivery: Box<dyn Delivery>,
) -> Outcome {
    let delivery_id = delivery.delivery_id().to_string();
    let attempt = delivery.attempt();

    let message = match M::decode(delivery.payload()) {
        Ok(message) => message,
        Err(e) => {
            warn!(delivery_id = %delivery_id, attempt, error = %e, "Undecodable message");
            if let Err(e) = delivery.nack().await {
                error!(delivery_id = %delivery_id, error = %e, "Nack failed");
            }
            return Outcome::Malformed;
        }
    };

    let message_id = message.message_id();
    match handler.handle(message).await {
        Ok(()) => {
            if let Err(e) = delivery.ack().await {
                // Redelivered later; handlers are idempotent
                error!(delivery_id = %delivery_id, error = %e, "Ack failed");
            }
            debug!(delivery_id = %delivery_id, message_id = %message_id, attempt, "Message handled");
            Outcome::Handled
        }
        Err(e) => {
            error!(
                delivery_id = %delivery_id,
                message_id = %message_id,
                attempt,
                error = %e,
                "Message handler failed"
            );
            if let Err(e) = delivery.nack().await {
                error!(delivery_id = %delivery_id, error = %e, "Nack failed");
            }
            Outcome::Failed
        }
    }
}

//! In-memory message bus with ack, nack, redelivery and dead-lettering
//!
//! A nacked delivery is queued again immediately; once it has been delivered
//! `max_deliveries` times it moves to the dead-letter list instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use votes_core::traits::{
    Delivery, MessagePublisher, MessageSubscriber, MessagingResult, Subscription,
};
use votes_core::DomainError;

#[derive(Debug, Clone)]
struct Envelope {
    id: String,
    topic: String,
    payload: Vec<u8>,
    deliveries: u32,
}

/// A message that exhausted its deliveries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub id: String,
    pub topic: String,
    pub payload: Vec<u8>,
    pub deliveries: u32,
}

struct Topic {
    tx: mpsc::UnboundedSender<Envelope>,
    rx: Option<mpsc::UnboundedReceiver<Envelope>>,
}

struct BusInner {
    topics: Mutex<HashMap<String, Topic>>,
    max_deliveries: u32,
    next_id: AtomicU64,
    acked: Mutex<Vec<String>>,
    nacked: AtomicUsize,
    dead_letters: Mutex<Vec<DeadLetter>>,
    closed: AtomicUsize,
}

impl BusInner {
    fn sender(&self, topic: &str) -> mpsc::UnboundedSender<Envelope> {
        let mut topics = self.topics.lock();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                Topic { tx, rx: Some(rx) }
            })
            .tx
            .clone()
    }

    fn take_receiver(&self, topic: &str) -> Option<mpsc::UnboundedReceiver<Envelope>> {
        self.sender(topic);
        self.topics.lock().get_mut(topic).and_then(|t| t.rx.take())
    }

    fn return_receiver(&self, topic: &str, rx: mpsc::UnboundedReceiver<Envelope>) {
        if let Some(t) = self.topics.lock().get_mut(topic) {
            t.rx = Some(rx);
        }
    }
}

/// Cloneable handle; every clone shares the same topics
#[derive(Clone)]
pub struct MemoryBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for MemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBus")
            .field("max_deliveries", &self.inner.max_deliveries)
            .finish()
    }
}

impl MemoryBus {
    pub fn new(max_deliveries: u32) -> Self {
        Self {
            inner: Arc::new(BusInner {
                topics: Mutex::new(HashMap::new()),
                max_deliveries: max_deliveries.max(1),
                next_id: AtomicU64::new(1),
                acked: Mutex::new(Vec::new()),
                nacked: AtomicUsize::new(0),
                dead_letters: Mutex::new(Vec::new()),
                closed: AtomicUsize::new(0),
            }),
        }
    }

    /// Ids of acknowledged messages, in ack order
    pub fn acked(&self) -> Vec<String> {
        self.inner.acked.lock().clone()
    }

    pub fn nacked(&self) -> usize {
        self.inner.nacked.load(Ordering::SeqCst)
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.inner.dead_letters.lock().clone()
    }

    /// Subscriptions closed so far
    pub fn closed_subscriptions(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl MessagePublisher for MemoryBus {
    async fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> MessagingResult<String> {
        let id = format!("{}-0", self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner
            .sender(topic)
            .send(Envelope {
                id: id.clone(),
                topic: topic.to_string(),
                payload,
                deliveries: 0,
            })
            .map_err(|e| DomainError::MessagingError(e.to_string()))?;
        Ok(id)
    }
}

#[async_trait]
impl MessageSubscriber for MemoryBus {
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn Subscription>> {
        let rx = self.inner.take_receiver(topic).ok_or_else(|| {
            DomainError::MessagingError(format!("topic {topic} already has a subscriber"))
        })?;
        Ok(Box::new(MemorySubscription {
            inner: Arc::clone(&self.inner),
            topic: topic.to_string(),
            rx,
        }))
    }
}

struct MemorySubscription {
    inner: Arc<BusInner>,
    topic: String,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next(&mut self) -> MessagingResult<Option<Box<dyn Delivery>>> {
        let Some(mut envelope) = self.rx.recv().await else {
            return Ok(None);
        };
        envelope.deliveries += 1;
        Ok(Some(Box::new(MemoryDelivery {
            inner: Arc::clone(&self.inner),
            envelope,
        })))
    }

    async fn close(self: Box<Self>) -> MessagingResult<()> {
        let this = *self;
        this.inner.return_receiver(&this.topic, this.rx);
        this.inner.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryDelivery {
    inner: Arc<BusInner>,
    envelope: Envelope,
}

#[async_trait]
impl Delivery for MemoryDelivery {
    fn payload(&self) -> &[u8] {
        &self.envelope.payload
    }

    fn delivery_id(&self) -> &str {
        &self.envelope.id
    }

    fn attempt(&self) -> u32 {
        self.envelope.deliveries
    }

    async fn ack(self: Box<Self>) -> MessagingResult<()> {
        self.inner.acked.lock().push(self.envelope.id.clone());
        Ok(())
    }

    async fn nack(self: Box<Self>) -> MessagingResult<()> {
        let MemoryDelivery { inner, envelope } = *self;
        inner.nacked.fetch_add(1, Ordering::SeqCst);
        if envelope.deliveries >= inner.max_deliveries {
            inner.dead_letters.lock().push(DeadLetter {
                id: envelope.id,
                topic: envelope.topic,
                payload: envelope.payload,
                deliveries: envelope.deliveries,
            });
            return Ok(());
        }
        inner
            .sender(&envelope.topic)
            .send(envelope)
            .map_err(|e| DomainError::MessagingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nack_redelivers_then_dead_letters() {
        let bus = MemoryBus::new(2);
        bus.publish_raw("t", b"x".to_vec()).await.unwrap();
        let mut sub = bus.subscribe("t").await.unwrap();

        let first = sub.next().await.unwrap().unwrap();
        assert_eq!(first.attempt(), 1);
        first.nack().await.unwrap();

        let second = sub.next().await.unwrap().unwrap();
        assert_eq!(second.attempt(), 2);
        second.nack().await.unwrap();

        assert_eq!(bus.dead_letters().len(), 1);
        assert_eq!(bus.dead_letters()[0].deliveries, 2);
        sub.close().await.unwrap();
        assert_eq!(bus.closed_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_second_subscriber_rejected_until_close() {
        let bus = MemoryBus::default();
        let sub = bus.subscribe("t").await.unwrap();
        assert!(bus.subscribe("t").await.is_err());
        sub.close().await.unwrap();
        assert!(bus.subscribe("t").await.is_ok());
    }
}

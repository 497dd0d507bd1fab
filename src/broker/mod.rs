//! Fan-out of freshly sampled points to live subscribers.
//!
//! Each subscriber (one per realtime connection) owns a bounded delivery
//! queue and a point-id filter set. Publishing walks subscribers in
//! registration order and `try_send`s to every matching queue; a full or
//! closed queue drops that one delivery with a warning. The sampling
//! loop therefore never blocks on a slow consumer, and a failure on one
//! handle never affects another.

use crate::point::TelemetryPoint;
use std::collections::HashSet;
use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;


/// Opaque subscriber handle, owned by the transport layer.
pub type SubscriberId = Uuid;

struct Subscriber {
    id: SubscriberId,
    filter: HashSet<String>,
    tx: mpsc::Sender<TelemetryPoint>,
}

pub struct Broker {
    /// Subscribers in registration order; publish order follows it.
    subscribers: RwLock<Vec<Subscriber>>,
    queue_depth: usize,
}

impl Broker {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            queue_depth,
        }
    }

    /// Register a connection and hand back its delivery queue. A second
    /// registration for the same id replaces the first.
    pub fn register(&self, id: SubscriberId) -> mpsc::Receiver<TelemetryPoint> {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let mut subscribers = self.subscribers.write().unwrap();
        subscribers.retain(|s| s.id != id);
        subscribers.push(Subscriber {
            id,
            filter: HashSet::new(),
            tx,
        });
        rx
    }

    /// Drop a connection's registration entirely.
    pub fn remove(&self, id: SubscriberId) {
        self.subscribers.write().unwrap().retain(|s| s.id != id);
    }

    /// Add one point id to a subscriber's filter. Idempotent: subscribing
    /// twice leaves exactly one active subscription.
    pub fn subscribe(&self, id: SubscriberId, point_id: &str) {
        let mut subscribers = self.subscribers.write().unwrap();
        if let Some(sub) = subscribers.iter_mut().find(|s| s.id == id) {
            sub.filter.insert(point_id.to_string());
            debug!(subscriber = %id, point_id = %point_id, "Subscribed");
        }
    }

    /// Remove one point id from a subscriber's filter. Unsubscribing an
    /// absent entry is a no-op.
    pub fn unsubscribe(&self, id: SubscriberId, point_id: &str) {
        let mut subscribers = self.subscribers.write().unwrap();
        if let Some(sub) = subscribers.iter_mut().find(|s| s.id == id) {
            sub.filter.remove(point_id);
            debug!(subscriber = %id, point_id = %point_id, "Unsubscribed");
        }
    }

    /// Deliver one point to every subscriber whose filter matches its id,
    /// in registration order. Never blocks; never fails the tick.
    pub fn publish(&self, point: &TelemetryPoint) {
        let subscribers = self.subscribers.read().unwrap();
        for sub in subscribers.iter() {
            if !sub.filter.contains(&point.id) {
                continue;
            }
            if let Err(e) = sub.tx.try_send(point.clone()) {
                // Slow or gone consumer: drop this delivery, keep going.
                warn!(subscriber = %sub.id, point_id = %point.id, error = %e,
                      "Dropped delivery to subscriber");
            }
        }
    }

    /// Number of registered connections (diagnostics).
    pub fn connection_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }
}

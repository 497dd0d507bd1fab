//! The periodic sampling loop.
//!
//! One tick: refresh every enabled entity's state from the value source
//! (all per-field fetches settle before anything downstream runs), then
//! encode each flattened field into telemetry points and append/publish
//! every point. Ticks never overlap: the tick body is awaited in the
//! loop and missed timer fires are skipped, so each EntityState sees a
//! single writer per tick.

use crate::broker::Broker;
use crate::codec;
use crate::config::EntityConfig;
use crate::history::HistoryLedger;
use crate::point::now_ms;
use crate::state::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};


pub struct Sampler {
    store: Arc<StateStore>,
    ledger: Arc<HistoryLedger>,
    broker: Arc<Broker>,
    entities: Vec<EntityConfig>,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        store: Arc<StateStore>,
        ledger: Arc<HistoryLedger>,
        broker: Arc<Broker>,
        entities: Vec<EntityConfig>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            broker,
            entities,
            interval,
        }
    }

    /// Run the loop until the shutdown signal flips. Stopping prevents
    /// future ticks; appends already made stay intact (each append is
    /// atomic at point granularity).
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            entities = self.entities.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Sampler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Sampler stopped");
                        break;
                    }
                }
            }
        }
    }

    /// One full sampling pass over all enabled entities. Public so tests
    /// can drive ticks without the timer.
    pub async fn tick_once(&self) {
        let timestamp = now_ms();
        for entity in &self.entities {
            // Disabled entities are skipped entirely: no refresh, no
            // telemetry, no history appends.
            if !entity.enabled {
                continue;
            }
            self.sample_entity(&entity.name, timestamp).await;
        }
    }

    /// Refresh then encode one entity. A failure here never prevents the
    /// other entities in the same tick.
    async fn sample_entity(&self, entity: &str, timestamp: i64) {
        if let Err(e) = self.store.refresh(entity).await {
            // Soft error: encode still runs over the last known values.
            warn!(entity = %entity, error = %e, "Refresh failed, sampling stale state");
        }

        for (point_id, raw) in self.store.snapshot(entity) {
            for point in codec::encode_at(entity, &point_id, &raw, timestamp) {
                self.ledger.append(point.clone());
                self.broker.publish(&point);
            }
        }
    }
}

//! Current-value tables, one per tracked entity.
//!
//! The store owns the flattened field-key → raw-value map for every
//! entity and drives the per-tick refresh against the value source. The
//! sampler is the single writer: it never runs two refresh or encode
//! passes over the same entity concurrently.

use crate::config::{EntityConfig, FieldSpec};
use crate::source::{SourceError, ValueSource};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

struct EntityState {
    /// Namespace of this entity in the backing value store
    index: String,
    /// Flattened field key → last known raw value. BTreeMap keeps
    /// snapshot order stable across ticks.
    values: BTreeMap<String, String>,
}

pub struct StateStore {
    source: Arc<dyn ValueSource>,
    entities: DashMap<String, EntityState>,
}

impl StateStore {
    /// Build one EntityState per configured entity, seeded with the
    /// FieldSpec defaults. Every entity tracks the same field table.
    pub fn new(
        source: Arc<dyn ValueSource>,
        entities: &[EntityConfig],
        fields: &[FieldSpec],
    ) -> Self {
        let table = DashMap::new();
        for entity in entities {
            let mut values = BTreeMap::new();
            for field in fields {
                for key in field.state_keys() {
                    values.insert(key, field.default.clone());
                }
            }
            table.insert(
                entity.name.clone(),
                EntityState {
                    index: entity.index.clone(),
                    values,
                },
            );
        }
        Self {
            source,
            entities: table,
        }
    }

    /// Refresh every field of one entity from the value source.
    ///
    /// All per-field fetches run concurrently and the call returns only
    /// after every one of them settles. A failed fetch keeps the stale
    /// value and is logged as a soft error; `Err` is returned only when
    /// every single fetch failed (the entity is effectively unreachable
    /// this tick).
    pub async fn refresh(&self, entity: &str) -> Result<(), SourceError> {
        let (index, keys) = match self.entities.get(entity) {
            Some(state) => (
                state.index.clone(),
                state.values.keys().cloned().collect::<Vec<_>>(),
            ),
            None => {
                return Err(SourceError::Transport(format!(
                    "unknown entity '{}'",
                    entity
                )))
            }
        };

        let fetches = keys.iter().map(|key| self.source.fetch(&index, key));
        let results = futures::future::join_all(fetches).await;

        let mut last_error = None;
        let mut failures = 0usize;
        // Fetches have settled; write back under the lock without awaits.
        if let Some(mut state) = self.entities.get_mut(entity) {
            for (key, result) in keys.into_iter().zip(results) {
                match result {
                    Ok(raw) => {
                        state.values.insert(key, raw);
                    }
                    Err(e) => {
                        warn!(entity = %entity, field = %key, error = %e,
                              "Field fetch failed, keeping stale value");
                        failures += 1;
                        last_error = Some(e);
                    }
                }
            }
        }

        match last_error {
            Some(e) if failures > 0 && self.field_count(entity) == failures => Err(e),
            _ => Ok(()),
        }
    }

    /// Last known raw value of one flattened field key.
    pub fn current_value(&self, entity: &str, key: &str) -> Option<String> {
        self.entities
            .get(entity)?
            .values
            .get(key)
            .cloned()
    }

    /// All flattened keys of one entity paired with their current raw
    /// values, as `(point_id, raw)` with the entity-tag prefix applied,
    /// in stable sorted order.
    pub fn snapshot(&self, entity: &str) -> Vec<(String, String)> {
        match self.entities.get(entity) {
            Some(state) => state
                .values
                .iter()
                .map(|(key, raw)| (format!("{}_{}", entity, key), raw.clone()))
                .collect(),
            None => Vec::new(),
        }
    }

    fn field_count(&self, entity: &str) -> usize {
        self.entities
            .get(entity)
            .map(|state| state.values.len())
            .unwrap_or(0)
    }
}

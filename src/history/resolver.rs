//! Range-query entry point backed by the external value store.
//!
//! A requested point id may be a derived axis component
//! (`follower_x_adcs.mag`) that never exists in the store itself. The
//! resolver recovers the underlying source field, issues one range query
//! for it, and re-applies the live normalization rules to every returned
//! value, extracting just the requested axis when applicable. Every
//! output point carries the id that was asked for, not the underlying
//! field id.

use crate::codec::{self, AxisSelector};
use crate::config::EntityConfig;
use crate::point::{PointValue, TelemetryPoint};
use crate::source::{SourceError, ValueSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct RangeResolver {
    source: Arc<dyn ValueSource>,
    /// Entity tag → value-store namespace
    indexes: HashMap<String, String>,
}

impl RangeResolver {
    pub fn new(source: Arc<dyn ValueSource>, entities: &[EntityConfig]) -> Self {
        let indexes = entities
            .iter()
            .map(|e| (e.name.clone(), e.index.clone()))
            .collect();
        Self { source, indexes }
    }

    /// Resolve `[start_ms, end_ms]` history for one point id. Ids whose
    /// entity tag is not configured yield an empty result.
    pub async fn resolve(
        &self,
        point_id: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<TelemetryPoint>, SourceError> {
        let axis = AxisSelector::detect(point_id);
        let underlying = match &axis {
            Some(selector) => selector.source_id.as_str(),
            None => point_id,
        };

        let Some((tag, field)) = underlying.split_once('_') else {
            return Ok(Vec::new());
        };
        let Some(index) = self.indexes.get(tag) else {
            debug!(point_id = %point_id, "Range query for unconfigured entity");
            return Ok(Vec::new());
        };

        let values = self
            .source
            .fetch_range(index, field, start_ms, end_ms)
            .await?;

        let points = values
            .into_iter()
            .map(|timed| match &axis {
                Some(selector) => TelemetryPoint::new(
                    point_id,
                    timed.timestamp,
                    PointValue::Text(selector.select(&timed.value).to_string()),
                ),
                None => {
                    // First encoded point is always the one carrying the
                    // requested id (raw vector point or normalized scalar).
                    let mut encoded =
                        codec::encode_at(tag, point_id, &timed.value, timed.timestamp);
                    encoded.swap_remove(0)
                }
            })
            .collect();

        Ok(points)
    }
}

//! In-memory telemetry history.
//!
//! One append-only, timestamp-ordered sequence per point id. Buckets are
//! created lazily on first append, so derived axis points that only ever
//! appear at runtime are queryable without pre-declaration. History
//! grows for the life of the process; eviction is out of scope.

use crate::point::TelemetryPoint;
use dashmap::DashMap;

pub mod resolver;

#[cfg(test)]
mod tests;

pub use resolver::RangeResolver;

#[derive(Default)]
pub struct HistoryLedger {
    buckets: DashMap<String, Vec<TelemetryPoint>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Append one point to its bucket. Amortized O(1), never fails.
    /// Timestamps within a bucket are non-decreasing because the sampler
    /// is the single writer and stamps each tick monotonically; ties keep
    /// insertion order.
    pub fn append(&self, point: TelemetryPoint) {
        self.buckets.entry(point.id.clone()).or_default().push(point);
    }

    /// The contiguous sub-sequence with `start_ms <= timestamp <= end_ms`,
    /// inclusive, in stored order. Unknown point ids yield an empty
    /// result, not an error.
    pub fn query(&self, point_id: &str, start_ms: i64, end_ms: i64) -> Vec<TelemetryPoint> {
        match self.buckets.get(point_id) {
            Some(bucket) => {
                let points = bucket.value();
                let lo = points.partition_point(|p| p.timestamp < start_ms);
                let hi = points.partition_point(|p| p.timestamp <= end_ms);
                points[lo..hi].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Number of points retained for one id (diagnostics).
    pub fn len(&self, point_id: &str) -> usize {
        self.buckets.get(point_id).map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

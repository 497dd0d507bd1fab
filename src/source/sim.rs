//! Simulated spacecraft value source.
//!
//! Stands in for the ground-station search service when no real store is
//! reachable: battery level decays toward zero, boot counters climb, and
//! numeric fields (including comma-delimited vectors and quaternions)
//! drift with a little noise on every poll.

use super::{SourceError, TimedValue, ValueSource};
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

const COUNTER_CAP: i64 = 4_294_967_295;

pub struct SimSource {
    values: Mutex<HashMap<String, String>>,
}

impl SimSource {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Seed one field with its initial raw value.
    pub fn with_field(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        {
            let mut values = self.values.lock().unwrap();
            values.insert(field.into(), value.into());
        }
        self
    }

    /// Advance one field's value by one simulation step.
    fn step(field: &str, current: &str) -> String {
        if field.contains("batt.lvl") {
            if let Ok(level) = current.parse::<i64>() {
                return (level - 1).max(0).to_string();
            }
        }
        if field.contains("counter") {
            if let Ok(count) = current.parse::<i64>() {
                return (count + 1).min(COUNTER_CAP).to_string();
            }
        }
        if current == "true" || current == "false" {
            return current.to_string();
        }
        if current.contains(',') {
            let jittered: Vec<String> = current.split(',').map(Self::jitter).collect();
            return jittered.join(",");
        }
        Self::jitter(current)
    }

    fn jitter(component: &str) -> String {
        match component.parse::<f64>() {
            Ok(v) => {
                let noise: f64 = rand::thread_rng().gen_range(-0.05..0.05);
                format!("{:.3}", v + noise)
            }
            Err(_) => component.to_string(),
        }
    }
}

impl Default for SimSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueSource for SimSource {
    async fn fetch(&self, _index: &str, field: &str) -> Result<String, SourceError> {
        let mut values = self.values.lock().unwrap();
        match values.get(field).cloned() {
            Some(current) => {
                let next = Self::step(field, &current);
                values.insert(field.to_string(), next.clone());
                Ok(next)
            }
            None => Err(SourceError::Transport(format!(
                "no simulated field '{}'",
                field
            ))),
        }
    }

    async fn fetch_range(
        &self,
        _index: &str,
        _field: &str,
        _start_ms: i64,
        _end_ms: i64,
    ) -> Result<Vec<TimedValue>, SourceError> {
        // Simulated deployments serve history from the in-memory ledger.
        Ok(Vec::new())
    }
}

use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// TelemetryPoint is one normalized sample of one telemetry field.
///
/// `id` is a dotted path unique within one entity's namespace, prefixed
/// by the entity tag (e.g. "follower_gomspace.vbatt"). Points are
/// immutable once created; the ledger and broker only ever move them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    /// Unix epoch milliseconds at sample time
    pub timestamp: i64,

    /// Fully-qualified, entity-tag-prefixed point identifier
    pub id: String,

    /// Normalized primitive value
    pub value: PointValue,
}

impl TelemetryPoint {
    pub fn new(id: impl Into<String>, timestamp: i64, value: PointValue) -> Self {
        Self {
            timestamp,
            id: id.into(),
            value,
        }
    }
}

/// Primitive value carried by a telemetry point.
///
/// Serialized untagged so the wire shape stays
/// `{"timestamp": number, "id": string, "value": number|string}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl PointValue {
    /// Numeric pass-through: integers first, then floats, anything else
    /// stays text. Raw values arrive from the value store as strings, so
    /// "76" becomes the JSON number 76 while "1,2,3,4" stays a string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return PointValue::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return PointValue::Number(f);
        }
        PointValue::Text(raw.to_string())
    }
}

impl From<&str> for PointValue {
    fn from(s: &str) -> Self {
        PointValue::Text(s.to_string())
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

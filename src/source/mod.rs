use async_trait::async_trait;
use std::fmt;

mod http;
mod sim;

pub use http::HttpValueSource;
pub use sim::SimSource;

/// One timestamped raw value returned by a range query.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedValue {
    /// Unix epoch milliseconds
    pub timestamp: i64,
    /// Raw value as stored, uninterpreted
    pub value: String,
}

/// Errors talking to the value store. All of these are recoverable: the
/// sampling loop keeps the stale value and tries again next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Non-success HTTP status from the value store
    Status(u16),
    /// Connection / DNS / protocol failure
    Transport(String),
    /// Request exceeded its deadline
    Timeout,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Status(code) => write!(f, "value store returned status {}", code),
            SourceError::Transport(msg) => write!(f, "value store unreachable: {}", msg),
            SourceError::Timeout => write!(f, "value store request timed out"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Abstraction over "get the current value of field F for entity index I".
///
/// `index` names the entity's namespace in the backing store (e.g.
/// "statefield_report_123"); `field` is the dotted source field path
/// without any entity prefix.
#[async_trait]
pub trait ValueSource: Send + Sync {
    /// Most recent value of `field`, as raw text.
    async fn fetch(&self, index: &str, field: &str) -> Result<String, SourceError>;

    /// All values of `field` in `[start_ms, end_ms]`, oldest first.
    async fn fetch_range(
        &self,
        index: &str,
        field: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<TimedValue>, SourceError>;
}

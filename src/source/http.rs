//! HTTP value source backed by the ground-station search service.
//!
//! `/search-es` answers point-in-time lookups with the raw value as the
//! plain-text response body. `/time-search-es` answers range lookups
//! with a JSON array of `{timestamp, value}` documents, ISO-8601 bounds.

use super::{SourceError, TimedValue, ValueSource};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Wire shape of one range-query document.
#[derive(Deserialize)]
struct RangeDoc {
    timestamp: i64,
    value: Value,
}

pub struct HttpValueSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpValueSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build value store HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn map_err(err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Transport(err.to_string())
        }
    }

    /// The store serializes values as whatever JSON type was indexed;
    /// the engine treats them all as raw text.
    fn value_to_raw(value: Value) -> String {
        match value {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl ValueSource for HttpValueSource {
    async fn fetch(&self, index: &str, field: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(format!("{}/search-es", self.base_url))
            .query(&[("index", index), ("field", field)])
            .send()
            .await
            .map_err(Self::map_err)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        response.text().await.map_err(Self::map_err)
    }

    async fn fetch_range(
        &self,
        index: &str,
        field: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<TimedValue>, SourceError> {
        let start = Utc
            .timestamp_millis_opt(start_ms)
            .single()
            .unwrap_or(chrono::DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339();
        let end = Utc
            .timestamp_millis_opt(end_ms)
            .single()
            .unwrap_or(chrono::DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339();

        let response = self
            .client
            .get(format!("{}/time-search-es", self.base_url))
            .query(&[
                ("index", index),
                ("field", field),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()
            .await
            .map_err(Self::map_err)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let docs: Vec<RangeDoc> = response.json().await.map_err(Self::map_err)?;

        // The store paginates newest-first; callers expect oldest-first.
        let mut values: Vec<TimedValue> = docs
            .into_iter()
            .map(|doc| TimedValue {
                timestamp: doc.timestamp,
                value: Self::value_to_raw(doc.value),
            })
            .collect();
        values.sort_by_key(|v| v.timestamp);
        Ok(values)
    }
}

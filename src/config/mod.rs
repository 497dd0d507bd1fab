use serde::Deserialize;
use std::fmt;

#[cfg(test)]
mod tests;

/// Complete downlink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownlinkConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityConfig>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldSpec>,
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Which source to construct
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// Base URL of the search service (http mode)
    #[serde(default = "default_source_url")]
    pub url: String,
    /// Per-request deadline in milliseconds
    #[serde(default = "default_source_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sim,
    Http,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Sim
}

fn default_source_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_source_timeout() -> u64 {
    3000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            url: default_source_url(),
            timeout_ms: default_source_timeout(),
        }
    }
}

/// Sampling loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Tick period override. When absent the period follows the
    /// deployment shape: 1000 ms for a single entity, 5000 ms for
    /// multi-entity (leader/follower) configurations.
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Per-subscriber delivery queue depth
    #[serde(default = "default_queue_depth")]
    pub subscriber_queue_depth: usize,
    /// Which store answers /history range queries
    #[serde(default = "default_history_backend")]
    pub history_backend: HistoryBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// In-memory ledger populated by the sampling loop
    Ledger,
    /// Range queries resolved against the external value store
    Source,
}

fn default_queue_depth() -> usize {
    64
}

fn default_history_backend() -> HistoryBackend {
    HistoryBackend::Ledger
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: None,
            subscriber_queue_depth: default_queue_depth(),
            history_backend: default_history_backend(),
        }
    }
}

/// One tracked telemetry-producing entity (e.g. "leader", "follower")
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    /// Entity tag used as the point-id prefix
    pub name: String,
    /// Namespace of this entity in the backing value store
    /// (e.g. "statefield_report_<imei>")
    pub index: String,
    /// Disabled entities are skipped entirely: no refresh, no telemetry,
    /// no history appends
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Static declaration of one telemetry field, shared by all entities.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Dotted source field path (no entity prefix)
    pub name: String,
    /// Resolved once at load; no per-tick shape inspection
    #[serde(default = "default_shape")]
    pub shape: FieldShape,
    /// Initial raw value before the first successful fetch
    #[serde(default)]
    pub default: String,
    /// Leaf keys for nested fields; each leaf is fetched independently
    /// as `<name>.<leaf>`
    #[serde(default)]
    pub leaves: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    Scalar,
    Vector3,
    Quaternion4,
    Nested,
}

fn default_shape() -> FieldShape {
    FieldShape::Scalar
}

impl FieldSpec {
    /// Flattened state keys this field contributes to an entity's table.
    pub fn state_keys(&self) -> Vec<String> {
        match self.shape {
            FieldShape::Nested => self
                .leaves
                .iter()
                .map(|leaf| format!("{}.{}", self.name, leaf))
                .collect(),
            _ => vec![self.name.clone()],
        }
    }
}

/// Fatal configuration errors. The process must not start with a
/// malformed entity or field table.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoEntities,
    DuplicateEntity(String),
    EmptyEntityName,
    EmptyFieldName,
    NestedWithoutLeaves(String),
    LeavesOnFlatField(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoEntities => write!(f, "no entities configured"),
            ConfigError::DuplicateEntity(name) => {
                write!(f, "duplicate entity '{}'", name)
            }
            ConfigError::EmptyEntityName => write!(f, "entity with empty name"),
            ConfigError::EmptyFieldName => write!(f, "field with empty name"),
            ConfigError::NestedWithoutLeaves(name) => {
                write!(f, "nested field '{}' declares no leaves", name)
            }
            ConfigError::LeavesOnFlatField(name) => {
                write!(f, "non-nested field '{}' declares leaves", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl DownlinkConfig {
    /// Startup validation; any error here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entities.is_empty() {
            return Err(ConfigError::NoEntities);
        }
        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            if entity.name.is_empty() {
                return Err(ConfigError::EmptyEntityName);
            }
            if !seen.insert(entity.name.as_str()) {
                return Err(ConfigError::DuplicateEntity(entity.name.clone()));
            }
        }
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(ConfigError::EmptyFieldName);
            }
            match field.shape {
                FieldShape::Nested if field.leaves.is_empty() => {
                    return Err(ConfigError::NestedWithoutLeaves(field.name.clone()));
                }
                FieldShape::Nested => {}
                _ if !field.leaves.is_empty() => {
                    return Err(ConfigError::LeavesOnFlatField(field.name.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Tick period: explicit override, else 1 s for single-entity
    /// deployments and 5 s for leader/follower-style multi-entity ones.
    pub fn tick_interval(&self) -> std::time::Duration {
        let ms = match self.sampling.interval_ms {
            Some(ms) => ms,
            None if self.entities.len() > 1 => 5000,
            None => 1000,
        };
        std::time::Duration::from_millis(ms)
    }
}

/// Load configuration from a TOML file and validate it.
pub fn load_config(path: &str) -> anyhow::Result<DownlinkConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: DownlinkConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

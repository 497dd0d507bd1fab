// Telemetry point model
pub mod point;

// Raw value → telemetry point normalization
pub mod codec;

// Value-source abstraction (HTTP search service, simulator)
pub mod source;

// Current-value tables and per-tick refresh
pub mod state;

// In-memory history and range resolution
pub mod history;

// Subscriber registry and fan-out
pub mod broker;

// Periodic sampling loop
pub mod scheduler;

// Realtime connection management
pub mod subscription;

// HTTP and WebSocket surfaces
pub mod api;

// Configuration loading and validation
pub mod config;

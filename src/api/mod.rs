// HTTP and WebSocket surfaces

pub mod history;
pub mod realtime;

pub use history::{create_history_router, HistoryAppState};
pub use realtime::{create_realtime_router, RealtimeAppState};

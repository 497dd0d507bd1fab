use crate::broker::Broker;
use crate::subscription::ConnectionManager;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Shared state for the realtime subscription surface
#[derive(Clone)]
pub struct RealtimeAppState {
    pub broker: Arc<Broker>,
}

/// Create the realtime WebSocket router
pub fn create_realtime_router(state: Arc<RealtimeAppState>) -> Router {
    Router::new()
        .route("/realtime", get(realtime_handler))
        .with_state(state)
}

/// GET /realtime - WebSocket upgrade for the subscription protocol
async fn realtime_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RealtimeAppState>>,
) -> Response {
    info!("Realtime upgrade request received");
    let broker = Arc::clone(&state.broker);
    ws.on_upgrade(move |socket| ConnectionManager::new(broker).handle(socket))
}

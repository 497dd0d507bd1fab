use crate::config::HistoryBackend;
use crate::history::{HistoryLedger, RangeResolver};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;


/// Shared state for the historical query surface
pub struct HistoryAppState {
    pub ledger: Arc<HistoryLedger>,
    pub resolver: RangeResolver,
    pub backend: HistoryBackend,
}

/// Query parameters: epoch-millisecond range bounds, both required
#[derive(Deserialize)]
pub struct HistoryParams {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the history API router
pub fn create_history_router(state: Arc<HistoryAppState>) -> Router {
    Router::new()
        .route("/history/:point_id", get(get_history))
        .with_state(state)
}

/// GET /history/:point_id?start=<epochMs>&end=<epochMs>
///
/// Returns the JSON array of telemetry points for the id over the
/// inclusive range. An id with no history is an empty array, not an
/// error. The backend is deployment-shaped: the in-memory ledger for
/// simulated sources, the external value store otherwise.
async fn get_history(
    State(state): State<Arc<HistoryAppState>>,
    Path(point_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let (Some(start), Some(end)) = (params.start, params.end) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "start and end query parameters are required".to_string(),
            }),
        )
            .into_response();
    };
    if start > end {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "start must not exceed end".to_string(),
            }),
        )
            .into_response();
    }

    match state.backend {
        HistoryBackend::Ledger => {
            Json(state.ledger.query(&point_id, start, end)).into_response()
        }
        HistoryBackend::Source => match state.resolver.resolve(&point_id, start, end).await {
            Ok(points) => Json(points).into_response(),
            Err(e) => {
                warn!(point_id = %point_id, error = %e, "Range resolution failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: "value store unavailable".to_string(),
                    }),
                )
                    .into_response()
            }
        },
    }
}

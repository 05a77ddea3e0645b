use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::{ApiError, AppState, FilterParams};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/readings", get(handler))
}

/// Same filters as `/api/figures`, returning the table itself.
async fn handler(
    Query(params): Query<FilterParams>,
    State((fetcher, config)): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let filter = params.into_filter()?;
    info!("GET /api/readings - {:?}", filter);

    let table = fetcher
        .fetch(&filter)
        .await
        .map_err(|e| ApiError::Fetch(e, config.dev_mode))?;

    info!("Returning {} readings", table.len());
    Ok(Json(table))
}

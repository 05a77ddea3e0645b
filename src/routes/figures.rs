//! `GET /api/figures`: the dashboard's reactive callback.
//!
//! Each change to the sensor dropdown or either date input calls this route
//! once. It re-runs the query and returns both charts, so the page never
//! holds data between interactions.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{debug, info};

use super::{ApiError, AppState, FilterParams};
use crate::Figures;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/figures", get(handler))
}

async fn handler(
    Query(params): Query<FilterParams>,
    State((fetcher, config)): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    debug!("GET /api/figures - {:?}", params);
    let filter = params.into_filter()?;

    let table = fetcher
        .fetch(&filter)
        .await
        .map_err(|e| ApiError::Fetch(e, config.dev_mode))?;
    if table.is_empty() {
        debug!("No readings match {:?}; rendering empty charts", filter);
    }

    let figures = Figures::render(&table).map_err(ApiError::Render)?;
    info!("Rendered charts from {} readings", figures.rows);

    Ok(Json(figures))
}

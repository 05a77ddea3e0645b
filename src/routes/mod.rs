use axum::{http::StatusCode, response::IntoResponse, response::Response, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{Config, DataFetcher, FetchError, QueryFilter};

mod dashboard;
mod figures;
mod health;
mod readings;

// ---

pub type AppState = (DataFetcher, Config);

pub fn router(fetcher: DataFetcher, config: Config) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(figures::router())
        .merge(readings::router())
        .merge(health::router())
        .with_state((fetcher, config))
}

// ---

/// Raw filter parameters as sent by the dashboard page. Empty strings mean
/// "no filter", same as a missing parameter.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    sensor_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl FilterParams {
    // ---
    pub fn into_filter(self) -> Result<QueryFilter, ApiError> {
        // ---
        Ok(QueryFilter {
            sensor_id: non_empty(self.sensor_id),
            start_date: non_empty(self.start_date)
                .map(|s| parse_bound(&s))
                .transpose()?,
            end_date: non_empty(self.end_date)
                .map(|s| parse_bound(&s))
                .transpose()?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_bound(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    // ---
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date '{raw}'")))
}

// ---

/// Error responses shared by the JSON endpoints.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// `bool`: include the underlying error text in the body (dev mode).
    Fetch(FetchError, bool),
    Render(serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Fetch(e, verbose) => {
                error!("Failed to fetch sensor data: {}", e);
                let msg = if verbose {
                    e.to_string()
                } else {
                    "Failed to fetch data".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Render(e) => {
                error!("Failed to render charts: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to render charts" })),
                )
                    .into_response()
            }
        }
    }
}

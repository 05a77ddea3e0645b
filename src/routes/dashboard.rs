//! `GET /`: the single-page dashboard.
//!
//! The page is static apart from the dropdown choices and the timezone label.
//! All chart data comes from `/api/figures`.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use super::AppState;
use crate::Config;

// ---

const TEMPLATE: &str = include_str!("dashboard.html");

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/", get(handler))
}

async fn handler(State((_, config)): State<AppState>) -> impl IntoResponse {
    // ---
    let cache = if config.dev_mode {
        "no-store"
    } else {
        "public, max-age=300"
    };
    ([(header::CACHE_CONTROL, cache)], Html(render_page(&config)))
}

pub fn render_page(config: &Config) -> String {
    // ---
    let options: String = config
        .sensor_ids
        .iter()
        .map(|id| {
            let id = escape_html(id);
            format!("      <option value=\"{id}\">Sensor {id}</option>\n")
        })
        .collect();

    TEMPLATE
        .replace("{{SENSOR_OPTIONS}}\n", &options)
        .replace("{{DISPLAY_TZ}}", &escape_html(config.display_tz.name()))
}

fn escape_html(raw: &str) -> String {
    // ---
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

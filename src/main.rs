//! Application entry point for the `sensor-dashboard` service.
//!
//! This binary runs the startup sequence for the sensor dashboard:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the per-request `DataFetcher` (no pool; one connection per fetch)
//! - Mounting the UI and API routes via the `routes` gateway
//! - Binding the Axum HTTP server on all interfaces and serving requests
//!
//! # Environment Variables
//! - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD` – database
//! - `ENV` (optional) – `dev` enables verbose logging and error details
//! - `DISPLAY_TZ` (optional) – chart timezone (default: `US/Central`)
//! - `PORT` (optional) – listen port (default: 8050)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `info`, `debug` in dev)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod charts;
mod config;
mod fetcher;
mod models;
mod routes;

pub use charts::Figures;
pub use config::Config;
pub use fetcher::{DataFetcher, FetchError};

// Re-exported so routes/*.rs and the other modules only depend on the crate
// root, not on each other's paths.
pub use models::{QueryFilter, ResultTable, SensorReading};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    // Connections are opened per request, so an unreachable database does not
    // stop startup; it surfaces on the first fetch.
    let fetcher = DataFetcher::from_config(&cfg);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let app: Router = routes::router(fetcher, cfg);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, then `AXUM_LOG_LEVEL`, then `ENV`
///
/// Must run once, before any logging macro is invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default_filter(
            env::var("AXUM_LOG_LEVEL").ok().as_deref(),
            config::is_dev_mode(),
        ))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

/// Filter directive used when `RUST_LOG` is unset.
fn default_filter(log_level: Option<&str>, dev_mode: bool) -> String {
    // ---
    let level = match log_level {
        Some(l @ ("trace" | "debug" | "info" | "warn" | "error")) => l,
        _ if dev_mode => "debug",
        _ => "info",
    };
    let sql_level = if dev_mode { "debug" } else { "warn" };
    format!("{level},sqlx::query={sql_level}")
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(None, false), "info,sqlx::query=warn");
        assert_eq!(default_filter(None, true), "debug,sqlx::query=debug");
        assert_eq!(default_filter(Some("warn"), true), "warn,sqlx::query=debug");
        assert_eq!(default_filter(Some("loud"), false), "info,sqlx::query=warn");
    }
}

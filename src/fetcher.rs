//! Read-only access to the `sensor_data` table.
//!
//! Every call to [`DataFetcher::fetch`] opens its own connection, runs one
//! filtered `SELECT`, and closes the connection again whether the read
//! succeeded or not. There is no pool and no retry.

use chrono_tz::Tz;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Config, QueryFilter, ResultTable, SensorReading};

// ---

pub const SENSOR_TABLE: &str = "sensor_data";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("sensor query failed: {0}")]
    Query(#[source] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct DataFetcher {
    // ---
    connect_options: PgConnectOptions,
    display_tz: Tz,
}

impl DataFetcher {
    // ---
    pub fn new(connect_options: PgConnectOptions, display_tz: Tz) -> Self {
        Self {
            connect_options,
            display_tz,
        }
    }

    /// Build a fetcher from the loaded configuration. Unset connection
    /// parameters keep the libpq defaults picked up by [`PgConnectOptions::new`].
    pub fn from_config(cfg: &Config) -> Self {
        // ---
        let mut opts = PgConnectOptions::new().port(cfg.db_port);
        if let Some(host) = &cfg.db_host {
            opts = opts.host(host);
        }
        if let Some(name) = &cfg.db_name {
            opts = opts.database(name);
        }
        if let Some(user) = &cfg.db_user {
            opts = opts.username(user);
        }
        if let Some(password) = &cfg.db_password {
            opts = opts.password(password);
        }

        Self::new(opts, cfg.display_tz)
    }

    /// Run the filtered query on a fresh connection and derive the display
    /// columns.
    ///
    /// Connection failures are returned as [`FetchError::Connect`]. Rows that
    /// cannot be decoded yield an empty table rather than an error.
    #[tracing::instrument(skip(self), fields(rows = tracing::field::Empty))]
    pub async fn fetch(&self, filter: &QueryFilter) -> Result<ResultTable, FetchError> {
        // ---
        let mut conn = PgConnection::connect_with(&self.connect_options)
            .await
            .map_err(FetchError::Connect)?;

        let mut query = build_query(filter);
        debug!("Executing: {}", query.sql());

        let result = query
            .build_query_as::<SensorReading>()
            .fetch_all(&mut conn)
            .await;

        // Released on both paths before the result is inspected.
        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection cleanly: {}", e);
        }

        let readings = match result {
            Ok(readings) => readings,
            Err(e) if is_malformed_result(&e) => {
                warn!("Discarding malformed result set: {}", e);
                return Ok(ResultTable::empty());
            }
            Err(e) => return Err(FetchError::Query(e)),
        };

        tracing::Span::current().record("rows", readings.len());
        Ok(ResultTable::from_readings(&readings, self.display_tz))
    }
}

/// Build the filter query. Casts keep the row shape stable when the table
/// stores `sensor_id` as an integer or the measurements as `REAL`/`NUMERIC`.
pub fn build_query(filter: &QueryFilter) -> QueryBuilder<'static, Postgres> {
    // ---
    let mut query = QueryBuilder::new(format!(
        "SELECT sensor_id::text AS sensor_id, \"time\"::timestamptz AS \"time\", \
         temperature::float8 AS temperature, humidity::float8 AS humidity \
         FROM {SENSOR_TABLE} WHERE 1=1"
    ));

    if let Some(sensor_id) = &filter.sensor_id {
        query.push(" AND sensor_id::text = ").push_bind(sensor_id.clone());
    }
    if let Some(start) = filter.start_date {
        query.push(" AND \"time\" >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query.push(" AND \"time\" <= ").push_bind(end);
    }

    query.push(" ORDER BY \"time\", sensor_id");
    query
}

fn is_malformed_result(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
    )
}

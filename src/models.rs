//! Data models for the sensor dashboard.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

// ---

/// One row of the `sensor_data` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SensorReading {
    // ---
    pub sensor_id: String,
    pub time: DateTime<Utc>,
    /// Celsius
    pub temperature: f64,
    /// Percent
    pub humidity: f64,
}

/// Per-request filter. Every field is optional; `None` leaves that
/// dimension unconstrained. An inverted date range is passed through as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    // ---
    pub sensor_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A reading with its derived columns, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct DisplayReading {
    // ---
    pub sensor_id: String,
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub temperature_fahrenheit: f64,
    pub time_local: DateTime<Tz>,
}

/// Result of one fetch, in query order. Built per request and dropped after
/// rendering.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<DisplayReading>,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

impl SensorReading {
    // ---
    pub fn to_display(&self, display_tz: Tz) -> DisplayReading {
        // ---
        DisplayReading {
            sensor_id: self.sensor_id.clone(),
            time: self.time,
            temperature: self.temperature,
            humidity: self.humidity,
            temperature_fahrenheit: celsius_to_fahrenheit(self.temperature),
            time_local: self.time.with_timezone(&display_tz),
        }
    }
}

impl ResultTable {
    // ---
    pub fn from_readings(readings: &[SensorReading], display_tz: Tz) -> Self {
        Self {
            rows: readings.iter().map(|r| r.to_display(display_tz)).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[DisplayReading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn reading(sensor_id: &str, temperature: f64) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: sensor_id.to_string(),
            time: Utc.with_ymd_and_hms(2024, 1, 15, 18, 45, 0).unwrap(),
            temperature,
            humidity: 40.5,
        }
    }

    #[test]
    fn test_temperature_conversion_fixed_points() {
        // ---
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
    }

    #[test]
    fn test_every_row_gets_fahrenheit() {
        // ---
        let readings: Vec<_> = [-40.0, -12.5, 0.0, 21.3, 100.0]
            .iter()
            .map(|&c| reading("1", c))
            .collect();
        let table = ResultTable::from_readings(&readings, chrono_tz::US::Central);

        for row in table.rows() {
            assert_eq!(row.temperature_fahrenheit, row.temperature * 9.0 / 5.0 + 32.0);
        }
    }

    #[test]
    fn test_timezone_conversion_preserves_instant() {
        // ---
        let raw = reading("1", 20.0);
        let display = raw.to_display(chrono_tz::US::Central);

        // January: CST is UTC-6, so 18:45 UTC is 12:45 local
        assert_eq!(display.time_local.hour(), 12);
        assert_eq!(display.time_local.with_timezone(&Utc), raw.time);
        assert_eq!(display.time_local, raw.time);
    }

    #[test]
    fn test_timezone_conversion_follows_dst() {
        // ---
        let mut raw = reading("1", 20.0);
        raw.time = Utc.with_ymd_and_hms(2024, 7, 1, 18, 45, 0).unwrap();
        let display = raw.to_display(chrono_tz::US::Central);

        // July: CDT is UTC-5
        assert_eq!(display.time_local.hour(), 13);
        assert_eq!(display.time_local.with_timezone(&Utc), raw.time);
    }

    #[test]
    fn test_data_preservation() {
        // ---
        let readings = vec![reading("1", 20.0), reading("2", 22.0), reading("1", 19.0)];
        let table = ResultTable::from_readings(&readings, chrono_tz::UTC);

        assert_eq!(table.len(), readings.len());
        for (row, raw) in table.rows().iter().zip(&readings) {
            assert_eq!(row.sensor_id, raw.sensor_id);
            assert_eq!(row.time, raw.time);
            assert_eq!(row.temperature, raw.temperature);
            assert_eq!(row.humidity, raw.humidity);
        }
    }

    #[test]
    fn test_table_serializes_as_array() {
        // ---
        let table = ResultTable::from_readings(&[reading("2", 0.0)], chrono_tz::US::Central);
        let json = serde_json::to_value(&table).unwrap();

        let rows = json.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["sensor_id"], "2");
        assert_eq!(rows[0]["temperature_fahrenheit"], 32.0);
        assert_eq!(rows[0]["time_local"], "2024-01-15T12:45:00-06:00");

        let empty = serde_json::to_value(ResultTable::empty()).unwrap();
        assert_eq!(empty, serde_json::json!([]));
    }
}

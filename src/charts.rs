//! Chart building for the dashboard.
//!
//! [`chart_data`] is the pure part: it turns a [`ResultTable`] into the two
//! series sets the UI draws. [`Figures::render`] wraps those series in plotly
//! figures that the page script hands straight to `Plotly.react`.

use std::collections::BTreeMap;

use plotly::{
    common::{Mode, Title},
    layout::Axis,
    Configuration, Layout, Plot, Scatter,
};
use serde::Serialize;

use crate::ResultTable;

// ---

pub const TEMPERATURE_TITLE: &str = "Temperature Over Time";
pub const HUMIDITY_TITLE: &str = "Humidity Over Time";

/// Naive wall clock time in the display timezone; plotly.js ignores offsets.
const X_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line on a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Fahrenheit against local time, one series per sensor
    pub temperature: Vec<Series>,
    /// Percent against local time, one series per sensor
    pub humidity: Vec<Series>,
}

/// Split the table into per-sensor series, keeping row order within each
/// sensor. Sensors come out sorted by id. An empty table gives no series.
pub fn chart_data(table: &ResultTable) -> ChartData {
    // ---
    let mut by_sensor: BTreeMap<&str, (Vec<String>, Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for row in table.rows() {
        let (x, temp, hum) = by_sensor.entry(row.sensor_id.as_str()).or_default();
        x.push(row.time_local.format(X_FORMAT).to_string());
        temp.push(row.temperature_fahrenheit);
        hum.push(row.humidity);
    }

    let mut temperature = Vec::with_capacity(by_sensor.len());
    let mut humidity = Vec::with_capacity(by_sensor.len());
    for (sensor_id, (x, temp, hum)) in by_sensor {
        let name = format!("Sensor {sensor_id}");
        temperature.push(Series {
            name: name.clone(),
            x: x.clone(),
            y: temp,
        });
        humidity.push(Series { name, x, y: hum });
    }

    ChartData {
        temperature,
        humidity,
    }
}

/// The two rendered figures, serialized as plotly JSON
#[derive(Debug, Serialize)]
pub struct Figures {
    pub rows: usize,
    pub temperature: serde_json::Value,
    pub humidity: serde_json::Value,
}

impl Figures {
    // ---
    pub fn render(table: &ResultTable) -> Result<Self, serde_json::Error> {
        // ---
        let data = chart_data(table);
        let temperature = line_chart(TEMPERATURE_TITLE, "Temperature (°F)", &data.temperature);
        let humidity = line_chart(HUMIDITY_TITLE, "Humidity (%)", &data.humidity);

        Ok(Self {
            rows: table.len(),
            temperature: serde_json::from_str(&temperature.to_json())?,
            humidity: serde_json::from_str(&humidity.to_json())?,
        })
    }
}

fn line_chart(title: &str, y_label: &str, series: &[Series]) -> Plot {
    // ---
    let mut plot = Plot::new();
    for s in series {
        let trace = Scatter::new(s.x.clone(), s.y.clone())
            .mode(Mode::Lines)
            .name(s.name.as_str());
        plot.add_trace(trace);
    }

    plot.set_configuration(Configuration::default().display_logo(false));
    plot.set_layout(
        Layout::new()
            .title(Title::new(title))
            .x_axis(Axis::new().title(Title::new("Time")))
            .y_axis(Axis::new().title(Title::new(y_label))),
    );
    plot
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::SensorReading;
    use chrono::{TimeZone, Utc};

    fn table(rows: &[(&str, u32, f64, f64)]) -> ResultTable {
        // ---
        let readings: Vec<_> = rows
            .iter()
            .map(|&(sensor_id, hour, temperature, humidity)| SensorReading {
                sensor_id: sensor_id.to_string(),
                time: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
                temperature,
                humidity,
            })
            .collect();
        ResultTable::from_readings(&readings, chrono_tz::US::Central)
    }

    #[test]
    fn test_empty_table_gives_empty_charts() {
        // ---
        let data = chart_data(&ResultTable::empty());
        assert!(data.temperature.is_empty());
        assert!(data.humidity.is_empty());
    }

    #[test]
    fn test_series_use_fahrenheit_and_local_time() {
        // ---
        let data = chart_data(&table(&[("1", 18, 0.0, 55.0), ("1", 19, 100.0, 60.0)]));

        assert_eq!(data.temperature.len(), 1);
        let temp = &data.temperature[0];
        assert_eq!(temp.name, "Sensor 1");
        assert_eq!(temp.x, vec!["2024-01-15 12:00:00", "2024-01-15 13:00:00"]);
        assert_eq!(temp.y, vec![32.0, 212.0]);

        let hum = &data.humidity[0];
        assert_eq!(hum.x, temp.x);
        assert_eq!(hum.y, vec![55.0, 60.0]);
    }

    #[test]
    fn test_one_series_per_sensor_in_row_order() {
        // ---
        let data = chart_data(&table(&[
            ("2", 10, 20.0, 40.0),
            ("1", 11, 21.0, 41.0),
            ("2", 12, 22.0, 42.0),
        ]));

        let names: Vec<_> = data.temperature.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sensor 1", "Sensor 2"]);
        assert_eq!(data.humidity[1].y, vec![40.0, 42.0]);
    }

    #[test]
    fn test_render_tolerates_zero_rows() {
        // ---
        let figures = Figures::render(&ResultTable::empty()).expect("render empty");
        assert_eq!(figures.rows, 0);
        assert!(figures.temperature.to_string().contains(TEMPERATURE_TITLE));
        assert!(figures.humidity.to_string().contains(HUMIDITY_TITLE));
    }

    #[test]
    fn test_render_carries_points() {
        // ---
        let figures = Figures::render(&table(&[("1", 18, 25.0, 50.0)])).expect("render");
        assert_eq!(figures.rows, 1);

        let json = figures.temperature.to_string();
        assert!(json.contains("2024-01-15 12:00:00"));
        assert!(json.contains("77.0"));
    }
}

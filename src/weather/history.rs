use crate::charts::LineSeries;
use crate::weather::reading::WeatherReading;
use polars::prelude::*;

/// Per-session series of readings, unique by `time_utc` and ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHistory {
    readings: Vec<WeatherReading>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `reading` in time order. A reading whose `time_utc` is already present is
    /// dropped and the existing entry kept. Returns whether the history grew.
    pub fn merge(&mut self, reading: WeatherReading) -> bool {
        match self
            .readings
            .binary_search_by_key(&reading.time_utc, |r| r.time_utc)
        {
            Ok(_) => false,
            Err(position) => {
                self.readings.insert(position, reading);
                true
            }
        }
    }

    pub fn readings(&self) -> &[WeatherReading] {
        &self.readings
    }

    pub fn latest(&self) -> Option<&WeatherReading> {
        self.readings.last()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Table of the history: `time_utc`, `time_local`, `temperature`, `wind`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let utc: Vec<String> = self
            .readings
            .iter()
            .map(|r| r.time_utc.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .collect();
        let local: Vec<String> = self.local_labels("%Y-%m-%d %H:%M:%S %Z");
        let temperature: Vec<f64> = self.readings.iter().map(|r| r.temperature).collect();
        let wind: Vec<f64> = self.readings.iter().map(|r| r.wind_speed).collect();

        df!(
            "time_utc" => utc,
            "time_local" => local,
            "temperature" => temperature,
            "wind" => wind,
        )
    }

    /// Local timestamps formatted with `format`, in history order.
    pub fn local_labels(&self, format: &str) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.time_local.format(format).to_string())
            .collect()
    }

    /// Temperature and wind series for the line chart.
    pub fn chart_series(&self) -> Vec<LineSeries> {
        vec![
            LineSeries {
                name: "temperature".to_string(),
                values: self.readings.iter().map(|r| r.temperature).collect(),
            },
            LineSeries {
                name: "wind".to_string(),
                values: self.readings.iter().map(|r| r.wind_speed).collect(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Denver;

    fn reading_at(minute: u32, temperature: f64) -> WeatherReading {
        let time = Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap();
        WeatherReading::new(time, Denver, temperature, 5.0)
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut history = SessionHistory::new();
        assert!(history.merge(reading_at(0, 20.0)));
        assert!(!history.merge(reading_at(0, 20.0)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_existing_entry() {
        let mut history = SessionHistory::new();
        history.merge(reading_at(15, 20.0));
        history.merge(reading_at(15, 99.0));
        assert_eq!(history.readings()[0].temperature, 20.0);
    }

    #[test]
    fn test_out_of_order_merges_stay_sorted() {
        let mut history = SessionHistory::new();
        for minute in [30, 0, 45, 15, 0, 30] {
            history.merge(reading_at(minute, minute as f64));
        }
        let minutes: Vec<f64> = history.readings().iter().map(|r| r.temperature).collect();
        assert_eq!(minutes, [0.0, 15.0, 30.0, 45.0]);
        assert!(history
            .readings()
            .windows(2)
            .all(|pair| pair[0].time_utc < pair[1].time_utc));
        assert_eq!(history.latest().map(|r| r.temperature), Some(45.0));
    }

    #[test]
    fn test_to_frame() -> Result<(), Box<dyn std::error::Error>> {
        let mut history = SessionHistory::new();
        history.merge(reading_at(0, 20.0));
        history.merge(reading_at(15, 21.0));

        let frame = history.to_frame()?;
        assert_eq!(frame.shape(), (2, 4));
        let local = frame.column("time_local")?.str()?;
        // June in Denver is MDT (UTC-6).
        assert_eq!(local.get(0), Some("2025-06-01 06:00:00 MDT"));
        assert_eq!(frame.column("temperature")?.f64()?.get(1), Some(21.0));
        Ok(())
    }
}

use crate::weather::error::WeatherError;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Temperature shown when no live reading is available.
pub const SAMPLE_TEMPERATURE: f64 = 20.0;
/// Wind speed shown when no live reading is available.
pub const SAMPLE_WIND_SPEED: f64 = 3.0;

/// One observation of current conditions.
///
/// `time_utc` identifies the reading; two readings with the same `time_utc` are the same
/// observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub time_utc: DateTime<Utc>,
    pub time_local: DateTime<Tz>,
    /// Air temperature at 2 m, °C.
    pub temperature: f64,
    /// Wind speed at 10 m, km/h.
    pub wind_speed: f64,
}

impl WeatherReading {
    pub fn new(time_utc: DateTime<Utc>, timezone: Tz, temperature: f64, wind_speed: f64) -> Self {
        Self {
            time_utc,
            time_local: time_utc.with_timezone(&timezone),
            temperature,
            wind_speed,
        }
    }

    /// The fallback reading, stamped with the current time.
    pub fn sample(timezone: Tz) -> Self {
        Self::new(Utc::now(), timezone, SAMPLE_TEMPERATURE, SAMPLE_WIND_SPEED)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: String,
    temperature_2m: f64,
    wind_speed_10m: f64,
}

/// Parses the `current` block of an Open-Meteo forecast response.
///
/// # Errors
///
/// * [`WeatherError::JsonParse`] if the body is not JSON or lacks one of
///   `current.time`, `current.temperature_2m`, `current.wind_speed_10m`.
/// * [`WeatherError::TimestampParse`] if `current.time` is not a recognised timestamp.
pub fn parse_current(body: &[u8], timezone: Tz) -> Result<WeatherReading, WeatherError> {
    let response: ForecastResponse = serde_json::from_slice(body)?;
    let current = response.current;
    let time_utc = parse_api_timestamp(&current.time)?;
    Ok(WeatherReading::new(
        time_utc,
        timezone,
        current.temperature_2m,
        current.wind_speed_10m,
    ))
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones (read as UTC), with or without seconds.
pub fn parse_api_timestamp(value: &str) -> Result<DateTime<Utc>, WeatherError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| WeatherError::TimestampParse(value.to_string()))
}

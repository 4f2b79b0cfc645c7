use serde::Serialize;
use time::OffsetDateTime;

/// Single-shot reading from the indoor DHT sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature_c: f64,
    pub humidity: f64,
}

/// Current outdoor observation from the weather feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temp_c: f64,
    pub temp_f: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Conditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub humidity: f64,
}

impl From<WeatherReading> for Conditions {
    fn from(reading: WeatherReading) -> Self {
        Self {
            temp_c: reading.temp_c,
            temp_f: reading.temp_f,
            humidity: reading.humidity,
        }
    }
}

/// One emitted indoor/outdoor sample
///
/// `outdoor` is `None` when the weather feed was unavailable for the tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub indoor: Conditions,
    pub outdoor: Option<Conditions>,
}

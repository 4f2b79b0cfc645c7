use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_INTERVAL_MS: u64 = 240_000; // 4 minutes
pub const DEFAULT_WINDOW: usize = 6;
const DEFAULT_PIN: u8 = 4;
const DEFAULT_LOCATION: &str = "FL/32503";
const DEFAULT_BASE_URL: &str = "https://api.wunderground.com/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Supported DHT sensor models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtModel {
    Dht11,
    Dht22,
}

impl DhtModel {
    /// Datasheet measuring range as (temperature °C, relative humidity %)
    pub fn range(self) -> ((f64, f64), (f64, f64)) {
        match self {
            DhtModel::Dht11 => ((0.0, 50.0), (20.0, 90.0)),
            DhtModel::Dht22 => ((-40.0, 80.0), (0.0, 100.0)),
        }
    }
}

impl FromStr for DhtModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().trim_start_matches("DHT") {
            "11" => Ok(DhtModel::Dht11),
            "22" => Ok(DhtModel::Dht22),
            _ => Err("expected 11 or 22".into()),
        }
    }
}

#[derive(Clone)]
pub struct LoggerConfig {
    pub dht_type: DhtModel,
    pub dht_pin: u8,
    pub dht_device: Option<PathBuf>,
    pub weather_api_key: String,
    pub weather_location: String,
    pub weather_base_url: String,
    pub weather_timeout: Duration,
    pub interval: Duration,
    pub window_size: usize,
}

// Keeps the API key out of logs
impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("dht_type", &self.dht_type)
            .field("dht_pin", &self.dht_pin)
            .field("dht_device", &self.dht_device)
            .field("weather_api_key", &"<redacted>")
            .field("weather_location", &self.weather_location)
            .field("weather_base_url", &self.weather_base_url)
            .field("weather_timeout", &self.weather_timeout)
            .field("interval", &self.interval)
            .field("window_size", &self.window_size)
            .finish()
    }
}

impl LoggerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_api_key = lookup("WEATHER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("WEATHER_API_KEY"))?;

        let interval_ms: u64 = parse_or(&lookup, "SAMPLE_INTERVAL_MS", DEFAULT_INTERVAL_MS)?;
        let interval_ms = positive("SAMPLE_INTERVAL_MS", interval_ms)?;

        let window_size: usize = parse_or(&lookup, "MOVING_AVERAGE_WINDOW", DEFAULT_WINDOW)?;
        let window_size = positive("MOVING_AVERAGE_WINDOW", window_size)?;

        let timeout_secs: u64 = parse_or(&lookup, "WEATHER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let timeout_secs = positive("WEATHER_TIMEOUT_SECS", timeout_secs)?;

        Ok(LoggerConfig {
            dht_type: parse_or(&lookup, "DHT_TYPE", DhtModel::Dht22)?,
            dht_pin: parse_or(&lookup, "DHT_PIN", DEFAULT_PIN)?,
            dht_device: lookup("DHT_IIO_DEVICE").map(PathBuf::from),
            weather_api_key,
            weather_location: lookup("WEATHER_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            weather_base_url: lookup("WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            weather_timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_millis(interval_ms),
            window_size,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn positive<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + fmt::Display,
{
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be positive".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = LoggerConfig::from_lookup(lookup(&[("WEATHER_API_KEY", "abc")])).unwrap();

        assert_eq!(config.dht_type, DhtModel::Dht22);
        assert_eq!(config.dht_pin, 4);
        assert_eq!(config.dht_device, None);
        assert_eq!(config.weather_location, "FL/32503");
        assert_eq!(config.interval, Duration::from_millis(240_000));
        assert_eq!(config.window_size, 6);
        assert_eq!(config.weather_timeout, Duration::from_secs(10));
    }

    #[test]
    fn requires_api_key() {
        let err = LoggerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEATHER_API_KEY")));
    }

    #[test]
    fn reads_overrides() {
        let config = LoggerConfig::from_lookup(lookup(&[
            ("WEATHER_API_KEY", "abc"),
            ("DHT_TYPE", "dht11"),
            ("DHT_PIN", "17"),
            ("DHT_IIO_DEVICE", "/sys/bus/iio/devices/iio:device1"),
            ("SAMPLE_INTERVAL_MS", "60000"),
            ("MOVING_AVERAGE_WINDOW", "3"),
        ]))
        .unwrap();

        assert_eq!(config.dht_type, DhtModel::Dht11);
        assert_eq!(config.dht_pin, 17);
        assert_eq!(
            config.dht_device,
            Some(PathBuf::from("/sys/bus/iio/devices/iio:device1"))
        );
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.window_size, 3);
    }

    #[test]
    fn rejects_zero_interval_and_window() {
        let err = LoggerConfig::from_lookup(lookup(&[
            ("WEATHER_API_KEY", "abc"),
            ("SAMPLE_INTERVAL_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SAMPLE_INTERVAL_MS", .. }));

        let err = LoggerConfig::from_lookup(lookup(&[
            ("WEATHER_API_KEY", "abc"),
            ("MOVING_AVERAGE_WINDOW", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MOVING_AVERAGE_WINDOW", .. }));
    }

    #[test]
    fn rejects_unknown_sensor_type() {
        let err = LoggerConfig::from_lookup(lookup(&[
            ("WEATHER_API_KEY", "abc"),
            ("DHT_TYPE", "2302"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DHT_TYPE", .. }));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config =
            LoggerConfig::from_lookup(lookup(&[("WEATHER_API_KEY", "secret-key")])).unwrap();
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}

/// Current conditions from the Weather Underground API
use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::{ConfigError, ParseError, SourceError, SourceKind};
use crate::models::WeatherReading;
use crate::sources::DataSource;

const CLIENT_USER_AGENT: &str = concat!("dht-weather-logger/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ConditionsResponse {
    current_observation: Observation,
}

#[derive(Debug, Deserialize)]
struct Observation {
    temp_c: f64,
    temp_f: f64,
    relative_humidity: String,
}

/// The endpoint embeds the API key, so request errors are stripped of their URL
#[derive(Debug, Clone)]
pub struct WeatherUnderground {
    client: Client,
    endpoint: Url,
    location: String,
}

impl WeatherUnderground {
    pub fn new(
        base_url: &str,
        api_key: &str,
        location: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let endpoint = conditions_url(base_url, api_key, location)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "WEATHER_TIMEOUT_SECS",
                value: format!("{:?}", timeout),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            location: location.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for WeatherUnderground {
    type Reading = WeatherReading;

    fn kind(&self) -> SourceKind {
        SourceKind::Weather
    }

    async fn read(&self) -> Result<WeatherReading, SourceError> {
        let body = self
            .client
            .get(self.endpoint.clone())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SourceError::weather(e.without_url()))?
            .bytes()
            .await
            .map_err(|e| SourceError::weather(e.without_url()))?;

        let reading = parse_conditions(&body).map_err(SourceError::weather)?;
        debug!(
            "Weather {}: temp={:.1}°C/{:.1}°F, humidity={}%",
            self.location, reading.temp_c, reading.temp_f, reading.humidity
        );
        Ok(reading)
    }
}

/// Build `{base}/{key}/conditions/q/{location}.json`
fn conditions_url(base_url: &str, api_key: &str, location: &str) -> Result<Url, ConfigError> {
    let raw = format!(
        "{}/{}/conditions/q/{}.json",
        base_url.trim_end_matches('/'),
        api_key,
        location.trim_matches('/')
    );
    Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        key: "WEATHER_BASE_URL",
        value: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn parse_conditions(body: &[u8]) -> Result<WeatherReading, ParseError> {
    let response: ConditionsResponse = serde_json::from_slice(body)?;
    let observation = response.current_observation;

    Ok(WeatherReading {
        temp_c: observation.temp_c,
        temp_f: observation.temp_f,
        humidity: parse_humidity(&observation.relative_humidity)?,
    })
}

/// Parse the leading numeric run of a humidity string such as `"55%"`
pub fn parse_humidity(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());

    trimmed[..end]
        .parse()
        .map_err(|_| ParseError::Humidity(raw.to_string()))
}

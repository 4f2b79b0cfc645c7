mod average;
mod config;
mod error;
mod models;
mod orchestrator;
mod sink;
mod sources;
mod utils;

use log::{error, info};

use config::LoggerConfig;
use orchestrator::{Sampler, SamplingOrchestrator};
use sink::LogSink;
use sources::{DhtSensor, WeatherUnderground};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match LoggerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    info!("Starting DHT weather logger with {:?}", config);

    let sensor = match DhtSensor::locate(
        config.dht_type,
        config.dht_pin,
        config.dht_device.clone(),
    )
    .await
    {
        Ok(sensor) => sensor,
        Err(e) => {
            error!("Failed to find DHT sensor on pin {}: {}", config.dht_pin, e);
            return Err(e.into());
        }
    };
    info!(
        "Reading DHT sensor on pin {} at {}",
        sensor.pin(),
        sensor.device().display()
    );

    let weather = WeatherUnderground::new(
        &config.weather_base_url,
        &config.weather_api_key,
        &config.weather_location,
        config.weather_timeout,
    )?;

    let sampler = Sampler::new(sensor, weather, LogSink, config.window_size)?;
    let mut orchestrator = SamplingOrchestrator::new(sampler, config.interval);
    orchestrator.start(None)?;

    // Run until Ctrl+C
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Shutdown requested, finishing current sample");

    if orchestrator.is_running() {
        orchestrator.stop().await?;
    }
    info!("Program terminated by user. Exiting gracefully.");

    Ok(())
}

/// DHT11/DHT22 readings through the Linux industrial I/O `dht11` driver
///
/// With `dtoverlay=dht11,gpiopin=<pin>` the kernel exposes the sensor as an
/// IIO device whose `in_temp_input` and `in_humidityrelative_input` files
/// report milli-degrees Celsius and milli-percent. The same driver serves
/// both DHT11 and DHT22 parts.
use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::DhtModel;
use crate::error::{ParseError, SourceCause, SourceError, SourceKind};
use crate::models::SensorReading;
use crate::sources::DataSource;

const IIO_DEVICES: &str = "/sys/bus/iio/devices";
const DRIVER_NAME: &str = "dht11";
const TEMPERATURE_FILE: &str = "in_temp_input";
const HUMIDITY_FILE: &str = "in_humidityrelative_input";

#[derive(Debug, Clone)]
pub struct DhtSensor {
    model: DhtModel,
    pin: u8,
    device: PathBuf,
}

impl DhtSensor {
    pub fn new(model: DhtModel, pin: u8, device: PathBuf) -> Self {
        Self { model, pin, device }
    }

    /// Resolve the IIO device for the sensor
    ///
    /// An explicit `device` path wins. Otherwise the IIO bus is scanned for
    /// `dht11` devices, preferring the one whose unit address is the pin.
    pub async fn locate(
        model: DhtModel,
        pin: u8,
        device: Option<PathBuf>,
    ) -> Result<Self, SourceError> {
        Self::locate_in(Path::new(IIO_DEVICES), model, pin, device).await
    }

    async fn locate_in(
        root: &Path,
        model: DhtModel,
        pin: u8,
        device: Option<PathBuf>,
    ) -> Result<Self, SourceError> {
        let device = match device {
            Some(device) => device,
            None => find_device(root, pin).await?,
        };
        debug!("Using {:?} DHT device {} for pin {}", model, device.display(), pin);
        Ok(Self::new(model, pin, device))
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

#[async_trait]
impl DataSource for DhtSensor {
    type Reading = SensorReading;

    fn kind(&self) -> SourceKind {
        SourceKind::Sensor
    }

    async fn read(&self) -> Result<SensorReading, SourceError> {
        let ((t_min, t_max), (h_min, h_max)) = self.model.range();

        // The driver caches one conversion for ~2s, so both files come from the same measurement
        let temperature_c = read_milli(&self.device.join(TEMPERATURE_FILE))
            .await
            .and_then(|t| check_range("temperature", t, t_min, t_max))
            .map_err(SourceError::sensor)?;
        let humidity = read_milli(&self.device.join(HUMIDITY_FILE))
            .await
            .and_then(|h| check_range("humidity", h, h_min, h_max))
            .map_err(SourceError::sensor)?;

        debug!(
            "DHT pin {}: temp={:.1}°C, humidity={:.1}%",
            self.pin, temperature_c, humidity
        );

        Ok(SensorReading {
            temperature_c,
            humidity,
        })
    }
}

async fn find_device(root: &Path, pin: u8) -> Result<PathBuf, SourceError> {
    let mut entries = fs::read_dir(root).await.map_err(SourceError::sensor)?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(SourceError::sensor)? {
        let path = entry.path();
        let name = match fs::read_to_string(path.join("name")).await {
            Ok(name) => name.trim().to_string(),
            Err(_) => continue,
        };
        if name.starts_with(DRIVER_NAME) {
            candidates.push((name, path));
        }
    }
    candidates.sort_by(|a, b| a.1.cmp(&b.1));

    let unit_name = format!("{}@{:x}", DRIVER_NAME, pin);
    if let Some((_, path)) = candidates.iter().find(|(name, _)| *name == unit_name) {
        return Ok(path.clone());
    }

    if candidates.len() > 1 {
        warn!(
            "{} DHT devices found and none named {}, using the first",
            candidates.len(),
            unit_name
        );
    }

    candidates
        .into_iter()
        .next()
        .map(|(_, path)| path)
        .ok_or_else(|| SourceError::sensor(SourceCause::DeviceNotFound(root.to_path_buf())))
}

/// Read a sysfs integer in milli-units and scale it to whole units
async fn read_milli(path: &Path) -> Result<f64, SourceCause> {
    let raw = fs::read_to_string(path).await?;
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ParseError::SysfsValue(raw.trim().to_string()))?;
    Ok(value as f64 / 1000.0)
}

fn check_range(quantity: &'static str, value: f64, min: f64, max: f64) -> Result<f64, SourceCause> {
    if value < min || value > max {
        return Err(SourceCause::OutOfRange {
            quantity,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

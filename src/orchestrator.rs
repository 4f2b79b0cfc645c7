/// Timer-driven sampling of the indoor sensor and the outdoor weather feed
use log::{error, info, warn};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::average::MovingAverage;
use crate::error::{ConfigError, OrchestratorError, SourceError};
use crate::models::{Conditions, FormattedRecord, SensorReading, WeatherReading};
use crate::sink::RecordSink;
use crate::sources::DataSource;
use crate::utils::{celsius_to_fahrenheit, format_datetime};

/// Sources, smoothing state and sink for one logger
///
/// Only one task owns a `Sampler` at a time, so the accumulators are
/// never updated concurrently.
pub struct Sampler<S, W, K> {
    sensor: S,
    weather: W,
    sink: K,
    indoor_temp: MovingAverage,
    indoor_humidity: MovingAverage,
}

impl<S, W, K> Sampler<S, W, K>
where
    S: DataSource<Reading = SensorReading>,
    W: DataSource<Reading = WeatherReading>,
    K: RecordSink,
{
    pub fn new(sensor: S, weather: W, sink: K, window_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            sensor,
            weather,
            sink,
            indoor_temp: MovingAverage::new(window_size)?,
            indoor_humidity: MovingAverage::new(window_size)?,
        })
    }

    /// Run one sampling cycle
    ///
    /// Both sources are read concurrently. A sensor failure aborts the
    /// cycle before any accumulator is touched; a weather failure only
    /// leaves the outdoor half of the record empty.
    pub async fn tick(&mut self) -> Result<(), SourceError> {
        let (indoor, outdoor) = tokio::join!(self.sensor.read(), self.weather.read());
        let indoor = indoor?;

        let outdoor = match outdoor {
            Ok(reading) => Some(Conditions::from(reading)),
            Err(e) => {
                warn!(
                    "{} unavailable, emitting indoor conditions only: {}",
                    self.weather.kind(),
                    e
                );
                None
            }
        };

        let temp_c = self.indoor_temp.record(indoor.temperature_c);
        let record = FormattedRecord {
            datetime: OffsetDateTime::now_utc(),
            indoor: Conditions {
                temp_c,
                temp_f: celsius_to_fahrenheit(temp_c),
                humidity: self.indoor_humidity.record(indoor.humidity),
            },
            outdoor,
        };

        self.sink.emit(record);
        Ok(())
    }

    #[cfg(test)]
    pub fn indoor_temperature(&self) -> &MovingAverage {
        &self.indoor_temp
    }

    #[cfg(test)]
    pub fn indoor_humidity(&self) -> &MovingAverage {
        &self.indoor_humidity
    }
}

struct RunningTask<T> {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<T>,
}

/// Drives a [`Sampler`] on a fixed interval
///
/// The first tick fires immediately on `start`. Ticks that fall due while
/// a slow cycle is still running are skipped rather than queued. `stop`
/// lets an in-flight cycle finish and then hands the sampler back, so
/// smoothing state carries over to the next `start`.
pub struct SamplingOrchestrator<S, W, K> {
    default_interval: Duration,
    sampler: Option<Sampler<S, W, K>>,
    task: Option<RunningTask<Sampler<S, W, K>>>,
}

impl<S, W, K> SamplingOrchestrator<S, W, K>
where
    S: DataSource<Reading = SensorReading> + 'static,
    W: DataSource<Reading = WeatherReading> + 'static,
    K: RecordSink + 'static,
{
    pub fn new(sampler: Sampler<S, W, K>, default_interval: Duration) -> Self {
        Self {
            default_interval,
            sampler: Some(sampler),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// The idle sampler; `None` while sampling is running
    #[cfg(test)]
    pub fn sampler(&self) -> Option<&Sampler<S, W, K>> {
        self.sampler.as_ref()
    }

    /// Start ticking every `interval`, or the default interval if `None`
    pub fn start(&mut self, interval: Option<Duration>) -> Result<(), OrchestratorError> {
        if self.task.is_some() {
            return Err(OrchestratorError::AlreadyRunning);
        }

        let period = interval.unwrap_or(self.default_interval);
        if period.is_zero() {
            return Err(ConfigError::Invalid {
                key: "SAMPLE_INTERVAL_MS",
                value: "0".into(),
                reason: "interval must be positive".into(),
            }
            .into());
        }

        let sampler = self.sampler.take().ok_or(OrchestratorError::SamplerLost)?;
        info!(
            "Sampling {} and {} every {} ms",
            sampler.sensor.kind(),
            sampler.weather.kind(),
            period.as_millis()
        );

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(sampler, period, shutdown_rx));
        self.task = Some(RunningTask { shutdown, handle });
        Ok(())
    }

    /// Stop the timer and wait for any in-flight tick to complete
    pub async fn stop(&mut self) -> Result<(), OrchestratorError> {
        let task = self.task.take().ok_or(OrchestratorError::NotRunning)?;

        // The task may already be gone if it panicked; the join reports that
        let _ = task.shutdown.send(());
        let sampler = task.handle.await?;

        self.sampler = Some(sampler);
        info!("Sampling stopped");
        Ok(())
    }
}

async fn run<S, W, K>(
    mut sampler: Sampler<S, W, K>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) -> Sampler<S, W, K>
where
    S: DataSource<Reading = SensorReading>,
    W: DataSource<Reading = WeatherReading>,
    K: RecordSink,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            // Also resolves when the orchestrator is dropped
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let started = OffsetDateTime::now_utc();
        if let Err(e) = sampler.tick().await {
            error!("Tick at {} failed: {}", format_datetime(&started), e);
        }
    }

    sampler
}

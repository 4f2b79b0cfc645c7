pub mod dht;
pub mod weather;

use async_trait::async_trait;

use crate::error::{SourceError, SourceKind};

pub use dht::DhtSensor;
pub use weather::WeatherUnderground;

/// An asynchronous provider of one reading per call
///
/// Implementations never return partial readings: either every quantity
/// was obtained or the whole read fails with a [`SourceError`].
#[async_trait]
pub trait DataSource: Send + Sync {
    type Reading: Send;

    fn kind(&self) -> SourceKind;

    async fn read(&self) -> Result<Self::Reading, SourceError>;
}

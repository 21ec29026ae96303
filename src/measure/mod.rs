use std::time::Duration;

use async_trait::async_trait;

use crate::{error::MeasurementError, speed::Speed};

pub mod cloudflare;

pub use cloudflare::CloudflareSpeedTest;

/// Anything that can measure the current connection.
///
/// Implementations do not retry. Every failure goes straight back to the
/// caller.
#[async_trait]
pub trait SpeedMeasurer: Send + Sync {
    async fn measure_download(&self) -> Result<Speed, MeasurementError>;

    async fn measure_upload(&self) -> Result<Speed, MeasurementError>;

    async fn measure_ping(&self) -> Result<Duration, MeasurementError>;
}

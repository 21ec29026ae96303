use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use rand::{Rng, SeedableRng};
use reqwest::{Client, Response};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, instrument, trace};

use crate::{
    config::MeasurementSettings, error::MeasurementError, measure::SpeedMeasurer, speed::Speed,
};

const CHUNK_SIZE: usize = 1_000_000; // 1MB chunks

/// Measures against a Cloudflare style speed test server (`/__down` and `/__up`).
///
/// Only connecting is time limited. Transfers are timed over a fixed window,
/// so a slow link yields a low speed instead of an error.
#[derive(Debug, Clone)]
pub struct CloudflareSpeedTest {
    client: Client,
    settings: MeasurementSettings,
}

impl CloudflareSpeedTest {
    pub fn new(settings: MeasurementSettings) -> Result<Self, MeasurementError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(MeasurementError::Client)?;

        Ok(Self { client, settings })
    }

    fn download_url(&self, bytes: u64) -> String {
        format!("{}/__down?bytes={}", self.settings.base_url, bytes)
    }

    fn upload_url(&self) -> String {
        format!("{}/__up", self.settings.base_url)
    }

    fn random_payload(&self) -> Vec<u8> {
        let mut rng = rand::rngs::StdRng::from_entropy();
        let mut data = vec![0u8; self.settings.upload_bytes];
        rng.fill(&mut data[..]);
        data
    }
}

fn check_status(response: Response) -> Result<Response, MeasurementError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MeasurementError::Status(status))
    }
}

fn bytes_per_second(bytes: usize, elapsed: Duration) -> Speed {
    let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
    Speed::from_bytes_per_second(bytes as f64 / seconds)
}

#[async_trait]
impl SpeedMeasurer for CloudflareSpeedTest {
    #[instrument(skip_all)]
    async fn measure_download(&self) -> Result<Speed, MeasurementError> {
        info!("Starting to measure download speed");

        let url = self.download_url(self.settings.download_bytes);
        let response = check_status(self.client.get(&url).send().await?)?;
        let mut stream = response.bytes_stream();

        let start = Instant::now();
        let deadline = start + self.settings.window;
        let mut downloaded: usize = 0;
        let mut finished = false;

        while let Ok(next) = timeout_at(deadline, stream.next()).await {
            match next {
                Some(chunk) => downloaded += chunk?.len(),
                None => {
                    finished = true;
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        trace!("{url}: received {downloaded} bytes in {elapsed:?}");

        if finished && downloaded == 0 {
            return Err(MeasurementError::EmptyResponse);
        }

        let speed = bytes_per_second(downloaded, elapsed);
        debug!("download speed: {speed}");
        Ok(speed)
    }

    #[instrument(skip_all)]
    async fn measure_upload(&self) -> Result<Speed, MeasurementError> {
        info!("Starting to measure upload speed");

        let data = self.random_payload();
        let url = self.upload_url();

        let start = Instant::now();
        let deadline = start + self.settings.window;
        let mut uploaded: usize = 0;

        for chunk in data.chunks(CHUNK_SIZE) {
            let request = self.client.post(&url).body(chunk.to_vec()).send();
            let Ok(response) = timeout_at(deadline, request).await else {
                trace!("{url}: window passed during upload");
                break;
            };
            check_status(response?)?;
            uploaded += chunk.len();
        }

        let elapsed = start.elapsed();
        trace!("{url}: sent {uploaded} bytes in {elapsed:?}");

        let speed = bytes_per_second(uploaded, elapsed);
        debug!("upload speed: {speed}");
        Ok(speed)
    }

    #[instrument(skip_all)]
    async fn measure_ping(&self) -> Result<Duration, MeasurementError> {
        info!("Starting to measure ping");

        let url = self.download_url(0);
        let count = self.settings.ping_count.max(1);
        let mut total = Duration::ZERO;

        for _ in 0..count {
            let start = Instant::now();
            check_status(self.client.get(&url).send().await?)?;
            total += start.elapsed();
        }

        let ping = total / count as u32;
        debug!("ping: {ping:?}");
        Ok(ping)
    }
}

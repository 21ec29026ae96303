use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::{
    config::{Config, redact},
    error::BotError,
    format::format_speed,
    measure::SpeedMeasurer,
    publish::{Publisher, StatusPoster},
    speed::Speed,
};

/// How a single cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Download speed was at or above the limit
    Skipped { download: Speed },

    /// Download speed was below the limit and a status was handed to the publisher
    Published {
        download: Speed,
        upload: Speed,
        ping: Duration,
        message: String,
    },
}

pub struct Bot<M, P> {
    config: Config,
    measurer: M,
    publisher: Publisher<P>,
}

impl<M, P> Bot<M, P>
where
    M: SpeedMeasurer,
    P: StatusPoster,
{
    pub fn new(config: Config, measurer: M, poster: P) -> Self {
        let credentials = &config.credentials;
        info!(
            "Starting bot with FIBERBOT_CONSUMER_KEY {} FIBERBOT_CONSUMER_SECRET {} \
             FIBERBOT_ACCESS_TOKEN_KEY {} FIBERBOT_ACCESS_TOKEN_SECRET {} FIBERBOT_EXPECTED_SPEED {}",
            credentials.consumer_key,
            redact(&credentials.consumer_secret),
            credentials.access_token_key,
            redact(&credentials.access_token_secret),
            config.expected_speed,
        );
        info!(
            "Message will be \"{}\"",
            config.message.render(&[&"EXPECTED_SPEED", &"DOWNLOAD_SPEED"])
        );
        info!(
            "Tweet will go out every {} seconds only if download speed is lower than {}",
            config.retry_time.as_secs(),
            config.limit
        );

        Self {
            config,
            measurer,
            publisher: Publisher::new(poster),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    pub fn publisher(&self) -> &Publisher<P> {
        &self.publisher
    }

    pub fn format_message(&self, download: &str, upload: &str, ping: Duration) -> String {
        let ping = format!("{} ms", ping.as_millis());
        self.config
            .message
            .render(&[&self.config.expected_speed, &download, &upload, &ping])
    }

    /// Measures once and tweets if the download speed is below the limit.
    ///
    /// Measurement errors are returned to the caller, publishing errors
    /// never are.
    #[instrument(skip_all)]
    pub async fn cycle(&self) -> Result<CycleOutcome, BotError> {
        let download = self.measurer.measure_download().await?;
        let formatted_download = format_speed(download.bytes_per_second());

        if download >= self.config.limit {
            info!("Speed is {formatted_download}, not tweeting");
            return Ok(CycleOutcome::Skipped { download });
        }

        let upload = self.measurer.measure_upload().await?;
        let formatted_upload = format_speed(upload.bytes_per_second());
        let ping = self.measurer.measure_ping().await?;
        debug!("download {formatted_download}, upload {formatted_upload}, ping {ping:?}");

        let message = self.format_message(&formatted_download, &formatted_upload, ping);
        self.publisher.post(&message).await;

        Ok(CycleOutcome::Published {
            download,
            upload,
            ping,
            message,
        })
    }
}

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::error::PublishError;

pub mod oauth;
pub mod twitter;

pub use twitter::TwitterClient;

/// Longest status (exclusive) that is handed to the platform
pub const MAX_MESSAGE_LENGTH: usize = 140;

const PREVIEW_LENGTH: usize = 20;

/// The platform a status update is sent to.
#[async_trait]
pub trait StatusPoster: Send + Sync {
    async fn post_status(&self, text: &str) -> Result<(), PublishError>;
}

/// Logs the status instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPoster;

#[async_trait]
impl StatusPoster for DryRunPoster {
    async fn post_status(&self, text: &str) -> Result<(), PublishError> {
        info!("dry run, not sending \"{text}\"");
        Ok(())
    }
}

/// Sends status updates, checking the length first and swallowing failures.
#[derive(Debug, Clone)]
pub struct Publisher<P> {
    poster: P,
}

impl<P: StatusPoster> Publisher<P> {
    pub fn new(poster: P) -> Self {
        Self { poster }
    }

    pub fn poster(&self) -> &P {
        &self.poster
    }

    #[instrument(skip_all)]
    pub async fn post(&self, message: &str) {
        if message.chars().count() >= MAX_MESSAGE_LENGTH {
            let preview = message.chars().take(PREVIEW_LENGTH).collect::<String>();
            info!("Couldn't tweet \"{preview}\"... is too long");
            return;
        }

        info!("Tweeting \"{message}\"");
        if let Err(e) = self.poster.post_status(message).await {
            error!("Could not tweet, {e}");
        }
    }
}

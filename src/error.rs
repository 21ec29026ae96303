//! Error types for measuring and publishing, and the loop policy for each.

use std::fmt;

use reqwest::StatusCode;

/// Errors raised while measuring download, upload or ping
#[derive(Debug)]
pub enum MeasurementError {
    /// The HTTP client could not be built
    Client(reqwest::Error),

    /// The request or the response body failed in transit
    Request(reqwest::Error),

    /// The speed test server answered with a non-success status
    Status(StatusCode),

    /// The server answered but sent no data to measure
    EmptyResponse,
}

impl fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementError::Client(err) => write!(f, "could not build HTTP client: {}", err),
            MeasurementError::Request(err) => write!(f, "speed test request failed: {}", err),
            MeasurementError::Status(status) => {
                write!(f, "speed test server responded with {}", status)
            }
            MeasurementError::EmptyResponse => write!(f, "speed test server sent no data"),
        }
    }
}

impl std::error::Error for MeasurementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeasurementError::Client(err) | MeasurementError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MeasurementError {
    fn from(err: reqwest::Error) -> Self {
        MeasurementError::Request(err)
    }
}

/// Errors raised by the posting platform
#[derive(Debug)]
pub enum PublishError {
    /// The HTTP client could not be built
    Client(reqwest::Error),

    /// The request never got an answer
    Transport(reqwest::Error),

    /// The platform refused the post (bad credentials, rate limit, too long, ...)
    Rejected { status: StatusCode, body: String },

    /// The request could not be signed
    Signing(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Client(err) => write!(f, "could not build HTTP client: {}", err),
            PublishError::Transport(err) => write!(f, "request failed: {}", err),
            PublishError::Rejected { status, body } => {
                write!(f, "platform responded with {}: {}", status, body)
            }
            PublishError::Signing(reason) => write!(f, "could not sign request: {}", reason),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Client(err) | PublishError::Transport(err) => Some(err),
            PublishError::Rejected { .. } | PublishError::Signing(_) => None,
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        PublishError::Transport(err)
    }
}

/// What the driver does after a cycle ends with an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    ContinueAfterSleep,
    Terminate,
}

/// Everything that can end a cycle early
#[derive(Debug)]
pub enum BotError {
    Measurement(MeasurementError),
    Publish(PublishError),
    Interrupted,
}

impl BotError {
    pub fn action(&self) -> LoopAction {
        match self {
            BotError::Measurement(_) => LoopAction::ContinueAfterSleep,
            BotError::Publish(_) => LoopAction::ContinueAfterSleep,
            BotError::Interrupted => LoopAction::Terminate,
        }
    }
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::Measurement(err) => write!(f, "measurement failed: {}", err),
            BotError::Publish(err) => write!(f, "publishing failed: {}", err),
            BotError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::Measurement(err) => Some(err),
            BotError::Publish(err) => Some(err),
            BotError::Interrupted => None,
        }
    }
}

impl From<MeasurementError> for BotError {
    fn from(err: MeasurementError) -> Self {
        BotError::Measurement(err)
    }
}

impl From<PublishError> for BotError {
    fn from(err: PublishError) -> Self {
        BotError::Publish(err)
    }
}

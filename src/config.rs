use std::{str::FromStr, time::Duration};

use tracing::{trace, warn};

use crate::{speed::Speed, template::MessageTemplate};

const CONSUMER_KEY: &str = "FIBERBOT_CONSUMER_KEY";
const CONSUMER_SECRET: &str = "FIBERBOT_CONSUMER_SECRET";
const ACCESS_TOKEN_KEY: &str = "FIBERBOT_ACCESS_TOKEN_KEY";
const ACCESS_TOKEN_SECRET: &str = "FIBERBOT_ACCESS_TOKEN_SECRET";
const EXPECTED_SPEED: &str = "FIBERBOT_EXPECTED_SPEED";
const SPEED_LIMIT: &str = "FIBERBOT_SPEED_LIMIT";
const RETRY_TIME: &str = "FIBERBOT_RETRY_TIME";
const MESSAGE: &str = "FIBERBOT_MESSAGE";
const SPEEDTEST_URL: &str = "FIBERBOT_SPEEDTEST_URL";

const DEFAULT_EXPECTED_SPEED: f64 = 25.0;
const DEFAULT_RETRY_TIME: u64 = 1000;
const DEFAULT_SPEEDTEST_URL: &str = "https://speed.cloudflare.com";

/// OAuth 1.0a user credentials. Missing values stay empty and only
/// surface as a rejected post.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token_key: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token_key", &self.access_token_key)
            .field("access_token_secret", &redact(&self.access_token_secret))
            .finish()
    }
}

pub fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSettings {
    pub base_url: String,
    pub download_bytes: u64,
    pub upload_bytes: usize,
    pub ping_count: usize,
    /// Longest a download or upload is timed for. A transfer still running
    /// when it passes is measured from what got through.
    pub window: Duration,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SPEEDTEST_URL.to_string(),
            download_bytes: 25_000_000,
            upload_bytes: 10_000_000,
            ping_count: 5,
            window: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub credentials: Credentials,
    /// Contracted download speed in Mbit/s, echoed verbatim in the status.
    pub expected_speed: f64,
    pub limit: Speed,
    pub retry_time: Duration,
    pub message: MessageTemplate,
    pub measurement: MeasurementSettings,
}

impl Config {
    /// Builds the configuration from the given speeds, resolving the
    /// default limit of half the expected speed once.
    pub fn new(expected_speed: f64, limit: Option<f64>) -> Self {
        Self {
            credentials: Credentials::default(),
            expected_speed,
            limit: Speed::from_megabits_per_second(limit.unwrap_or(expected_speed / 2.0)),
            retry_time: Duration::from_secs(DEFAULT_RETRY_TIME),
            message: MessageTemplate::default(),
            measurement: MeasurementSettings::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let expected_speed = parse_or(var(EXPECTED_SPEED), EXPECTED_SPEED, DEFAULT_EXPECTED_SPEED);
        let limit = var(SPEED_LIMIT).and_then(|raw| parse(&raw, SPEED_LIMIT));

        let mut config = Config::new(expected_speed, limit);
        config.credentials = Credentials {
            consumer_key: var(CONSUMER_KEY).unwrap_or_default(),
            consumer_secret: var(CONSUMER_SECRET).unwrap_or_default(),
            access_token_key: var(ACCESS_TOKEN_KEY).unwrap_or_default(),
            access_token_secret: var(ACCESS_TOKEN_SECRET).unwrap_or_default(),
        };
        config.retry_time =
            Duration::from_secs(parse_or(var(RETRY_TIME), RETRY_TIME, DEFAULT_RETRY_TIME));
        if let Some(message) = var(MESSAGE) {
            config.message = MessageTemplate::new(message);
        }
        if let Some(url) = var(SPEEDTEST_URL) {
            config.measurement.base_url = url.trim_end_matches('/').to_string();
        }

        trace!("loaded config: {config:?}");
        config
    }
}

fn parse<T: FromStr>(raw: &str, key: &str) -> Option<T> {
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("{key}: could not parse {raw:?}, using the default");
    }
    parsed
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    raw.and_then(|raw| parse(&raw, key)).unwrap_or(default)
}

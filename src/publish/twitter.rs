use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    config::Credentials,
    error::PublishError,
    publish::{StatusPoster, oauth::OAuthSigner},
};

const DEFAULT_API_URL: &str = "https://api.twitter.com";

#[derive(Debug, Clone, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Clone, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Pulls the human readable part out of an API error body, if there is one.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .or_else(|| value.pointer("/errors/0/message"))
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Posts tweets through the v2 API on behalf of a single user.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: Client,
    signer: OAuthSigner,
    api_url: String,
}

impl TwitterClient {
    pub fn new(credentials: Credentials) -> Result<Self, PublishError> {
        Self::with_api_url(credentials, DEFAULT_API_URL)
    }

    pub fn with_api_url(
        credentials: Credentials,
        api_url: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let client = Client::builder().build().map_err(PublishError::Client)?;

        Ok(Self {
            client,
            signer: OAuthSigner::new(credentials),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.api_url)
    }
}

#[async_trait]
impl StatusPoster for TwitterClient {
    #[instrument(skip_all)]
    async fn post_status(&self, text: &str) -> Result<(), PublishError> {
        let url = self.tweets_url();
        let authorization = self.signer.authorization_header("POST", &url, &[])?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&CreateTweet { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status,
                body: error_detail(&body),
            });
        }

        match response.json::<CreateTweetResponse>().await {
            Ok(created) => info!("Successfully posted tweet {}", created.data.id),
            Err(e) => debug!("tweet posted but the response could not be read: {e}"),
        }

        Ok(())
    }
}

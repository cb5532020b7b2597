use crate::config::Config;
use crate::error::{ChatError, Endpoint};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;

/// Body sent to both endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest<'a> {
    pub prompt: &'a str,
}

/// Text endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextResponse {
    pub status: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Image endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageResponse {
    pub status: String,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Value of `status` on a successful response
pub const SUCCESS_STATUS: &str = "success";

impl TextResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

impl ImageResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// The remote services the conversation talks to
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// `POST {prompt}` to the text-completion endpoint
    async fn complete_text(&self, prompt: &str) -> Result<TextResponse, ChatError>;

    /// `POST {prompt}` to the image-generation endpoint
    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, ChatError>;

    /// Fetch the raw bytes of a generated image
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ChatError>;
}

/// JSON-over-HTTP client for both endpoints
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    text_endpoint: String,
    image_endpoint: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            text_endpoint: config.text_endpoint.clone(),
            image_endpoint: config.image_endpoint.clone(),
        })
    }

    async fn post_prompt<T>(&self, endpoint: Endpoint, url: &str, prompt: &str) -> Result<T, ChatError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(%endpoint, prompt_len = prompt.len(), "sending prompt");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&PromptRequest { prompt })
            .send()
            .await
            .map_err(|source| ChatError::Network { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Http { endpoint, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ChatError::Network { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| ChatError::Decode { endpoint, source })
    }
}

#[async_trait]
impl CompletionApi for HttpApi {
    async fn complete_text(&self, prompt: &str) -> Result<TextResponse, ChatError> {
        self.post_prompt(Endpoint::Text, &self.text_endpoint, prompt)
            .await
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, ChatError> {
        self.post_prompt(Endpoint::Image, &self.image_endpoint, prompt)
            .await
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ChatError> {
        let endpoint = Endpoint::Download;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ChatError::Network { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Http { endpoint, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ChatError::Network { endpoint, source })?;
        Ok(bytes.to_vec())
    }
}

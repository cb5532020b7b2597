//! Scripted [`CompletionApi`] used by unit tests

use crate::api::{CompletionApi, ImageResponse, SUCCESS_STATUS, TextResponse};
use crate::error::{ChatError, Endpoint};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum ScriptedText {
    Ok(String),
    Status(String),
    Missing,
    Unreachable,
}

impl ScriptedText {
    pub fn ok(text: &str) -> Self {
        ScriptedText::Ok(text.to_string())
    }
}

#[derive(Debug, Clone)]
enum ScriptedImage {
    Url(String),
    Status(String),
    Missing,
}

/// Answers every call from its script and records the prompts it was sent
pub struct FakeApi {
    text: ScriptedText,
    image: ScriptedImage,
    bytes: Option<Vec<u8>>,
    text_prompts: Mutex<Vec<String>>,
    image_prompts: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            text: ScriptedText::ok("ok"),
            image: ScriptedImage::Url("http://x/y.png".to_string()),
            bytes: Some(b"\x89PNG fake".to_vec()),
            text_prompts: Mutex::new(Vec::new()),
            image_prompts: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, text: ScriptedText) -> Self {
        self.text = text;
        self
    }

    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image = ScriptedImage::Url(url.to_string());
        self
    }

    pub fn with_image_status(mut self, status: &str) -> Self {
        self.image = ScriptedImage::Status(status.to_string());
        self
    }

    pub fn with_missing_image_url(mut self) -> Self {
        self.image = ScriptedImage::Missing;
        self
    }

    pub fn with_unreachable_image_host(mut self) -> Self {
        self.bytes = None;
        self
    }

    pub fn text_prompts(&self) -> Vec<String> {
        self.text_prompts.lock().expect("lock").clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().expect("lock").clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CompletionApi for FakeApi {
    async fn complete_text(&self, prompt: &str) -> Result<TextResponse, ChatError> {
        self.text_prompts.lock().expect("lock").push(prompt.to_string());
        match &self.text {
            ScriptedText::Ok(text) => Ok(TextResponse {
                status: SUCCESS_STATUS.to_string(),
                text: Some(text.clone()),
            }),
            ScriptedText::Status(status) => Ok(TextResponse {
                status: status.clone(),
                text: None,
            }),
            ScriptedText::Missing => Ok(TextResponse {
                status: SUCCESS_STATUS.to_string(),
                text: None,
            }),
            ScriptedText::Unreachable => Err(ChatError::Http {
                endpoint: Endpoint::Text,
                status: reqwest::StatusCode::BAD_GATEWAY,
            }),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageResponse, ChatError> {
        self.image_prompts.lock().expect("lock").push(prompt.to_string());
        match &self.image {
            ScriptedImage::Url(url) => Ok(ImageResponse {
                status: SUCCESS_STATUS.to_string(),
                image_url: Some(url.clone()),
            }),
            ScriptedImage::Status(status) => Ok(ImageResponse {
                status: status.clone(),
                image_url: None,
            }),
            ScriptedImage::Missing => Ok(ImageResponse {
                status: SUCCESS_STATUS.to_string(),
                image_url: None,
            }),
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ChatError> {
        self.fetched.lock().expect("lock").push(url.to_string());
        self.bytes.clone().ok_or(ChatError::Http {
            endpoint: Endpoint::Download,
            status: reqwest::StatusCode::NOT_FOUND,
        })
    }
}

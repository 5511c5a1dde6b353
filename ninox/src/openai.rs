//! Chat-completion client for the OpenAI HTTP API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use ninox_core::contract::{ChatCompleter, ChatRequest, CollaboratorError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Client for `base_url`, or `OPENAI_BASE_URL` / the public API when `None`.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_key = api_key.into();
        info!(
            api_key_set = !api_key.is_empty(),
            base_url = %base_url,
            "Initialized OpenAiClient"
        );
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// First choice's text from a raw response body.
pub fn first_choice_text(body: &str) -> Result<String, CollaboratorError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| "Chat completion response has no message content".into())
}

#[async_trait]
impl ChatCompleter for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, CollaboratorError> {
        let url = self.completions_url();
        info!(model = %request.model, url = %url, "Sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = %status, url = %url, "Chat completion request failed");
            return Err(format!("OpenAI API request failed: {status} - {body}").into());
        }
        first_choice_text(&body)
    }
}

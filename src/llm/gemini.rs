//! Client for the Gemini `generateContent` API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatModel;
use super::ChatReply;
use super::ChatTurn;
use crate::config::LlmConfig;
use crate::errors::AppError;
use crate::errors::Result;

pub struct GeminiClient {
    model: String,
    endpoint: String,
    api_key: String,
    max_output_tokens: u32,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [ChatTurn],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ChatTurn>,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    /// - Missing API key
    /// - HTTP client build errors
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config(
                "llm.api_key (or GEMINI_API_KEY) is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<ChatReply> {
        let mut contents = history.to_vec();
        contents.push(ChatTurn::user(message));

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!(
            "Calling generateContent: model={}, {} turns",
            self.model,
            contents.len()
        );

        let request = GenerateRequest {
            contents: &contents,
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ModelGeneration(format!(
                "generateContent error ({status}): {error_text}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelGeneration(format!("Failed to parse response: {e}")))?;

        let text = result
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|content| content.text())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::ModelGeneration("Model returned no text".to_string()))?;

        contents.push(ChatTurn::model(text.clone()));
        Ok(ChatReply {
            text,
            history: contents,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

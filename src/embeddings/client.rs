//! HTTP client for the Cohere embed API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::EmbedMode;
use super::EmbeddingProvider;
use crate::config::EmbeddingsConfig;
use crate::errors::AppError;
use crate::errors::Result;

/// Client for the `/embed` endpoint
pub struct EmbeddingClient {
    model: String,
    endpoint: String,
    api_key: String,
    dimension: usize,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
    truncate: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - Missing API key
    /// - HTTP client build errors
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config(
                "embeddings.api_key (or COHERE_API_KEY) is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            dimension: config.dimension,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.endpoint);
        debug!(
            "Calling embed API: {} texts, input_type={}",
            texts.len(),
            mode.input_type()
        );

        let request = EmbedRequest {
            texts,
            model: &self.model,
            input_type: mode.input_type(),
            truncate: "END",
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::from(e)
                } else {
                    AppError::Embedding(format!("embed request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Embedding(format!(
                "embed API error ({status}): {error_text}"
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse response: {e}")))?;

        if result.embeddings.is_empty() {
            return Err(AppError::Embedding("No embeddings in response".to_string()));
        }
        if result.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.embeddings.len()
            )));
        }

        Ok(result.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::body_partial_json;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;

    use super::*;

    fn config(endpoint: String) -> EmbeddingsConfig {
        EmbeddingsConfig {
            endpoint,
            api_key: "test-key".to_string(),
            model: "embed-english-v3.0".to_string(),
            dimension: 3,
            timeout_secs: 5,
            batch_size: 96,
        }
    }

    #[tokio::test]
    async fn test_embed_sends_input_type_and_parses_vectors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "embed-english-v3.0",
                "input_type": "search_query"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc",
                "embeddings": [[0.1, 0.2, 0.3]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&config(server.uri())).unwrap();
        let vectors = client
            .embed(&["rust engineer".to_string()], EmbedMode::Query)
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.1, 0.2, 0.3]]);
    }

    #[tokio::test]
    async fn test_empty_embeddings_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": []})),
            )
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&config(server.uri())).unwrap();
        let err = client
            .embed(&["text".to_string()], EmbedMode::Document)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_provider_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&config(server.uri())).unwrap();
        let err = client
            .embed(&["text".to_string()], EmbedMode::Document)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_an_embedding_error() {
        // Nothing listens on a released port
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = EmbeddingClient::new(&config(format!("http://{addr}"))).unwrap();
        let err = client
            .embed(&["text".to_string()], EmbedMode::Document)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Embedding(_)), "{err:?}");
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut cfg = config("http://localhost:1".to_string());
        cfg.api_key.clear();
        assert!(matches!(
            EmbeddingClient::new(&cfg),
            Err(AppError::Config(_))
        ));
    }
}

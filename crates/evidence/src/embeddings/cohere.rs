//! Cohere embedding provider.
//!
//! Cohere API: https://docs.cohere.com/reference/embed

use super::{EmbedInput, Embedder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use verity_core::{AppError, AppResult};

/// Default base URL for the Cohere API.
pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.com";

const EMBED_ENDPOINT: &str = "/v1/embed";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Cohere embed API request format.
#[derive(Debug, Serialize)]
struct CohereEmbedRequest {
    texts: Vec<String>,
    model: String,
    input_type: String,
}

/// Cohere embed API response format.
#[derive(Debug, Deserialize)]
struct CohereEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Cohere embedding client.
#[derive(Debug)]
pub struct CohereEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl CohereEmbedder {
    /// Create a new Cohere embedder with the default base URL.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self::with_base_url(DEFAULT_COHERE_URL, api_key, model, dimensions)
    }

    /// Create a new Cohere embedder with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            client: reqwest::Client::new(),
        }
    }
}

fn input_type(input: EmbedInput) -> &'static str {
    match input {
        EmbedInput::Document => "search_document",
        EmbedInput::Query => "search_query",
    }
}

#[async_trait::async_trait]
impl Embedder for CohereEmbedder {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        input: EmbedInput,
    ) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Embedding {} texts with Cohere", texts.len());

        let request = CohereEmbedRequest {
            texts: texts.to_vec(),
            model: self.model.clone(),
            input_type: input_type(input).to_string(),
        };

        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Evidence(format!("Failed to send embed request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Evidence(format!(
                "Cohere embed API error ({}): {}",
                status, error_text
            )));
        }

        let body: CohereEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Evidence(format!("Failed to parse embed response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Evidence(format!(
                "Cohere returned {} embeddings for {} texts",
                body.embeddings.len(),
                texts.len()
            )));
        }

        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = CohereEmbedder::new("test-key", "embed-english-v3.0", 1024);
        assert_eq!(embedder.provider_name(), "cohere");
        assert_eq!(embedder.model_name(), "embed-english-v3.0");
        assert_eq!(embedder.dimensions(), 1024);
        assert_eq!(embedder.base_url, DEFAULT_COHERE_URL);
    }

    #[test]
    fn test_input_type_mapping() {
        assert_eq!(input_type(EmbedInput::Document), "search_document");
        assert_eq!(input_type(EmbedInput::Query), "search_query");
    }

    #[test]
    fn test_embed_request_serialization() {
        let request = CohereEmbedRequest {
            texts: vec!["chunk one".to_string()],
            model: "embed-english-v3.0".to_string(),
            input_type: "search_document".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "embed-english-v3.0");
        assert_eq!(value["input_type"], "search_document");
        assert_eq!(value["texts"][0], "chunk one");
    }

    #[test]
    fn test_embed_response_deserialization() {
        let json = r#"{"embeddings": [[0.1, 0.2], [0.3, 0.4]]}"#;
        let response: CohereEmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[0], vec![0.1, 0.2]);
    }
}

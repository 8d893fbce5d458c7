//! Embedding providers for the evidence store.

pub mod cohere;
pub mod hashed;

use std::sync::Arc;
use verity_core::{AppError, AppResult};

pub use cohere::CohereEmbedder;
pub use hashed::HashedEmbedder;

/// What an embedding will be used for.
///
/// Asymmetric models such as Cohere's embed endpoint encode documents and
/// queries differently, so callers state their intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedInput {
    /// Text being stored for later retrieval
    Document,

    /// Text being matched against stored documents
    Query,
}

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "cohere", "hashed")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String], input: EmbedInput)
        -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str, input: EmbedInput) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()], input).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Evidence("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
///
/// # Arguments
/// * `provider` - Provider identifier ("cohere" or "hashed")
/// * `model` - Embedding model identifier
/// * `dimensions` - Embedding vector dimensions
/// * `api_key` - API key (required for hosted providers)
pub fn create_embedder(
    provider: &str,
    model: &str,
    dimensions: usize,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn Embedder>> {
    match provider {
        "cohere" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Evidence("Cohere embedding provider requires API key".to_string())
            })?;
            Ok(Arc::new(CohereEmbedder::new(api_key, model, dimensions)))
        }

        "hashed" => Ok(Arc::new(HashedEmbedder::new(dimensions))),

        _ => Err(AppError::Evidence(format!(
            "Unknown embedding provider: '{}'. Supported providers: cohere, hashed",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hashed_embedder() {
        let embedder = create_embedder("hashed", "hashed-trigram-v1", 384, None).unwrap();
        assert_eq!(embedder.provider_name(), "hashed");
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_create_cohere_embedder_requires_key() {
        let result = create_embedder("cohere", "embed-english-v3.0", 1024, None);
        assert!(result.is_err());

        let embedder =
            create_embedder("cohere", "embed-english-v3.0", 1024, Some("test-key")).unwrap();
        assert_eq!(embedder.provider_name(), "cohere");
        assert_eq!(embedder.model_name(), "embed-english-v3.0");
    }

    #[test]
    fn test_create_unknown_embedder() {
        let result = create_embedder("unknown", "model", 384, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_embed_single_convenience() {
        let embedder = create_embedder("hashed", "hashed-trigram-v1", 384, None).unwrap();
        let embedding = embedder.embed("test text", EmbedInput::Query).await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}

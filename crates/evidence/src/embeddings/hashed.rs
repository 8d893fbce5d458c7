//! Deterministic embedding provider based on hashed trigrams.

use super::{EmbedInput, Embedder};
use verity_core::AppResult;

/// Offline embedding provider.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. Not semantically accurate like a hosted model, but it is
/// content dependent and needs no network access, which makes it usable
/// for tests and air-gapped setups.
#[derive(Debug)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    /// Create a new hashed embedder with the given dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();

        // Filter stop words for better discrimination
        let stop_words: std::collections::HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them",
        ]
        .iter()
        .copied()
        .collect();

        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq = std::collections::HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        // Spread each word over several dimensions via character trigrams
        for (word, freq) in word_freq.iter() {
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!(
                    "{}{}{}",
                    chars[i],
                    chars[i + 1],
                    chars.get(i + 2).unwrap_or(&' ')
                );
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            // Also encode the whole word
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        Ok(embedding)
    }
}

#[async_trait::async_trait]
impl Embedder for HashedEmbedder {
    fn provider_name(&self) -> &str {
        "hashed"
    }

    fn model_name(&self) -> &str {
        "hashed-trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    // Hashing is symmetric, so the input intent is ignored
    async fn embed_batch(
        &self,
        texts: &[String],
        _input: EmbedInput,
    ) -> AppResult<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| self.generate_embedding(text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hashed_embedder_dimensions() {
        let embedder = HashedEmbedder::new(384);
        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.provider_name(), "hashed");
        assert_eq!(embedder.model_name(), "hashed-trigram-v1");
    }

    #[tokio::test]
    async fn test_embedding_is_unit_vector() {
        let embedder = HashedEmbedder::new(384);
        let embedding = embedder.embed("hello world", EmbedInput::Document).await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let embedder = HashedEmbedder::new(384);
        let text = "deterministic test";

        let embedding1 = embedder.embed(text, EmbedInput::Document).await.unwrap();
        let embedding2 = embedder.embed(text, EmbedInput::Query).await.unwrap();

        // Same text produces identical embeddings regardless of intent
        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let embedder = HashedEmbedder::new(384);

        let embedding1 = embedder.embed("hello world", EmbedInput::Document).await.unwrap();
        let embedding2 = embedder.embed("goodbye world", EmbedInput::Document).await.unwrap();

        assert_ne!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashedEmbedder::new(384);
        let embedding = embedder.embed("", EmbedInput::Document).await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let embedder = HashedEmbedder::new(384);

        let text = "Sistemas distribuídos são difíceis de depurar! 🦀";
        let embedding = embedder.embed(text, EmbedInput::Document).await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}

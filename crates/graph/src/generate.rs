//! Answer generation.
//!
//! Two generators share one chat client: `GroundedGenerator` answers from
//! an evidence set the model is told to cite, `FallbackGenerator` answers
//! from model knowledge when no evidence strategy applies. Both run at
//! temperature zero so repeated validation attempts stay comparable.

use std::collections::HashMap;
use std::sync::Arc;
use verity_core::{AppError, AppResult};
use verity_evidence::Document;
use verity_llm::{ChatClient, GenerateRequest};
use verity_prompt::{render_prompt, PromptDefinition};

/// Produces answers grounded in a set of evidence documents.
pub struct GroundedGenerator {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
}

impl GroundedGenerator {
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    /// Generate an answer to `question` from `documents`.
    ///
    /// The documents are attached to the request so the provider grounds
    /// the response in them. Calling this with no documents is a pipeline
    /// bug, not a model decision, and fails fast.
    pub async fn generate(&self, question: &str, documents: &[Document]) -> AppResult<String> {
        if documents.is_empty() {
            return Err(AppError::Generation(
                "Grounded generation invoked without documents".to_string(),
            ));
        }

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let grounding: Vec<HashMap<String, String>> = documents
            .iter()
            .map(|document| {
                let mut fields = document.metadata.clone();
                fields.insert("text".to_string(), document.content.clone());
                fields
            })
            .collect();

        let mut request = GenerateRequest::new(rendered.message, &self.model)
            .with_documents(grounding)
            .with_temperature(0.0);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let reply = self.client.generate(&request).await?;
        tracing::debug!(
            "Grounded generation used {} tokens",
            reply.usage.total_tokens
        );
        Ok(reply.text)
    }
}

/// Produces answers from model knowledge alone.
pub struct FallbackGenerator {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
}

impl FallbackGenerator {
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    /// Answer `question` without any retrieved evidence.
    pub async fn generate(&self, question: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let mut request =
            GenerateRequest::new(rendered.message, &self.model).with_temperature(0.0);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let reply = self.client.generate(&request).await?;
        tracing::debug!(
            "Fallback generation used {} tokens",
            reply.usage.total_tokens
        );
        Ok(reply.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::ScriptedChat;
    use verity_prompt::defaults::default_prompt;
    use verity_prompt::{GENERATE_FALLBACK, GENERATE_GROUNDED};

    #[tokio::test]
    async fn test_grounded_generation_rejects_empty_documents() {
        let chat = ScriptedChat::new();
        let generator = GroundedGenerator::new(
            chat.clone(),
            "command-r",
            default_prompt(GENERATE_GROUNDED).unwrap(),
        );

        let err = generator.generate("question", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)), "got {err:?}");
        assert_eq!(chat.generate_calls(), 0);
    }

    #[tokio::test]
    async fn test_grounded_generation_attaches_documents_and_zero_temperature() {
        let chat = ScriptedChat::new();
        chat.push_generation("grounded answer");
        let generator = GroundedGenerator::new(
            chat.clone(),
            "command-r",
            default_prompt(GENERATE_GROUNDED).unwrap(),
        );

        let documents =
            vec![Document::new("fact one").with_metadata("source", "notes.md")];
        let answer = generator.generate("question", &documents).await.unwrap();
        assert_eq!(answer, "grounded answer");

        let requests = chat.generate_requests.lock().unwrap();
        assert_eq!(requests[0].temperature, Some(0.0));
        assert_eq!(requests[0].documents.len(), 1);
        assert_eq!(requests[0].documents[0]["text"], "fact one");
        assert_eq!(requests[0].documents[0]["source"], "notes.md");
    }

    #[tokio::test]
    async fn test_fallback_generation_sends_no_documents() {
        let chat = ScriptedChat::new();
        chat.push_generation("from model knowledge");
        let generator = FallbackGenerator::new(
            chat.clone(),
            "command-r",
            default_prompt(GENERATE_FALLBACK).unwrap(),
        );

        let answer = generator.generate("question").await.unwrap();
        assert_eq!(answer, "from model knowledge");

        let requests = chat.generate_requests.lock().unwrap();
        assert!(requests[0].documents.is_empty());
        assert_eq!(requests[0].temperature, Some(0.0));
    }
}

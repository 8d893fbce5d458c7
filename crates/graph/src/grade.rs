//! Evidence and answer grading.
//!
//! Three binary judgments drive the pipeline: is a retrieved document
//! relevant to the question, is a generation grounded in the evidence it
//! was given, and does the answer actually resolve the question. Each
//! grader renders its prompt and asks the chat service for a constrained
//! yes/no verdict.

use crate::state::join_documents;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use verity_core::AppResult;
use verity_evidence::Document;
use verity_llm::{BinaryScore, ChatClient, ClassifyRequest};
use verity_prompt::{render_prompt, PromptDefinition};

/// Verdict on whether a document bears on the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Relevant,
    NotRelevant,
}

impl From<BinaryScore> for Relevance {
    fn from(score: BinaryScore) -> Self {
        if score.is_yes() {
            Relevance::Relevant
        } else {
            Relevance::NotRelevant
        }
    }
}

/// Verdict on whether a generation sticks to its evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grounding {
    Grounded,
    NotGrounded,
}

impl From<BinaryScore> for Grounding {
    fn from(score: BinaryScore) -> Self {
        if score.is_yes() {
            Grounding::Grounded
        } else {
            Grounding::NotGrounded
        }
    }
}

/// Verdict on whether an answer resolves the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adequacy {
    Adequate,
    Inadequate,
}

impl From<BinaryScore> for Adequacy {
    fn from(score: BinaryScore) -> Self {
        if score.is_yes() {
            Adequacy::Adequate
        } else {
            Adequacy::Inadequate
        }
    }
}

/// Grades retrieved documents for relevance to a question.
pub struct DocumentGrader {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
}

impl DocumentGrader {
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

    /// Grade a single document against the question.
    pub async fn grade(&self, question: &str, document: &Document) -> AppResult<Relevance> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("document".to_string(), document.content.clone());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let mut request = ClassifyRequest::new(rendered.message, &self.model);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let score = self.client.classify(&request).await?;
        Ok(Relevance::from(score))
    }

    /// Keep only the documents relevant to the question.
    ///
    /// Every document is graded concurrently; the survivors keep their
    /// original relative order. Returns an empty vector when nothing
    /// passes, which the caller treats as a signal to search elsewhere.
    pub async fn filter(
        &self,
        question: &str,
        documents: Vec<Document>,
    ) -> AppResult<Vec<Document>> {
        let verdicts = try_join_all(
            documents
                .iter()
                .map(|document| self.grade(question, document)),
        )
        .await?;

        let total = documents.len();
        let kept: Vec<Document> = documents
            .into_iter()
            .zip(verdicts)
            .filter(|(_, verdict)| *verdict == Relevance::Relevant)
            .map(|(document, _)| document)
            .collect();

        tracing::info!("Graded {} documents, {} relevant", total, kept.len());
        Ok(kept)
    }
}

/// Grades whether a generation is supported by a set of documents.
pub struct HallucinationGrader {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
}

impl HallucinationGrader {
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

    /// Grade a generation against the documents it was produced from.
    pub async fn grade(&self, documents: &[Document], generation: &str) -> AppResult<Grounding> {
        let mut variables = HashMap::new();
        variables.insert("documents".to_string(), join_documents(documents));
        variables.insert("generation".to_string(), generation.to_string());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let mut request = ClassifyRequest::new(rendered.message, &self.model);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let score = self.client.classify(&request).await?;
        Ok(Grounding::from(score))
    }
}

/// Grades whether an answer resolves the original question.
pub struct AnswerGrader {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerGrader {
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

    /// Grade a generation against the question it should answer.
    pub async fn grade(&self, question: &str, generation: &str) -> AppResult<Adequacy> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("generation".to_string(), generation.to_string());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let mut request = ClassifyRequest::new(rendered.message, &self.model);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let score = self.client.classify(&request).await?;
        Ok(Adequacy::from(score))
    }
}

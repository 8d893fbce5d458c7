//! The answer pipeline state machine.
//!
//! One `run` walks a question through routing, evidence gathering,
//! generation, and validation until an answer is accepted or the attempt
//! budget runs out. Nodes hand the `RunState` to each other by value;
//! the loop below is the only place transitions are decided.

use crate::generate::{FallbackGenerator, GroundedGenerator};
use crate::grade::{Adequacy, AnswerGrader, DocumentGrader, Grounding, HallucinationGrader};
use crate::route::{QuestionRouter, RouteDecision};
use crate::state::RunState;
use std::sync::Arc;
use verity_core::{AppError, AppResult};
use verity_evidence::{Document, EvidenceStore, SearchClient};

/// Metadata value marking a synthetic document built from web results.
pub const WEB_SOURCE: &str = "web_search";

/// Pipeline stages. `Done` is terminal; every other stage names the node
/// that runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    RouteQuestion,
    Retrieve,
    GradeDocuments,
    WebSearch,
    Generate,
    FallbackGenerate,
    Done,
}

/// Verdict of the post-generation validation gate.
enum Validation {
    /// Grounded and adequate; the answer ships
    Accepted,
    /// Not supported by the evidence; regenerate from the same documents
    Ungrounded,
    /// Grounded but does not resolve the question; gather fresh evidence
    Inadequate,
}

/// The adaptive question-answering pipeline.
///
/// Owns every node and resource a run needs. `run` is cheap to call
/// repeatedly; all per-run state lives in the `RunState` it threads
/// through the nodes.
pub struct AnswerGraph {
    router: QuestionRouter,
    document_grader: DocumentGrader,
    hallucination_grader: HallucinationGrader,
    answer_grader: AnswerGrader,
    grounded: GroundedGenerator,
    fallback: FallbackGenerator,
    store: Arc<dyn EvidenceStore>,
    search: Arc<dyn SearchClient>,
    top_k: usize,
    max_attempts: u32,
}

impl AnswerGraph {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        router: QuestionRouter,
        document_grader: DocumentGrader,
        hallucination_grader: HallucinationGrader,
        answer_grader: AnswerGrader,
        grounded: GroundedGenerator,
        fallback: FallbackGenerator,
        store: Arc<dyn EvidenceStore>,
        search: Arc<dyn SearchClient>,
        top_k: usize,
        max_attempts: u32,
    ) -> Self {
        Self {
            router,
            document_grader,
            hallucination_grader,
            answer_grader,
            grounded,
            fallback,
            store,
            search,
            top_k,
            max_attempts,
        }
    }

    /// Answer a question.
    ///
    /// Routes the question to an evidence strategy, generates a candidate
    /// answer, and validates it for grounding and adequacy. Failed
    /// validation retries generation (same evidence when the answer was
    /// ungrounded, fresh web evidence when it was inadequate) until the
    /// attempt budget is exhausted.
    pub async fn run(&self, question: &str) -> AppResult<String> {
        let mut state = RunState::new(question);
        let mut stage = Stage::RouteQuestion;
        let mut attempts: u32 = 0;

        loop {
            stage = match stage {
                Stage::RouteQuestion => match self.router.route(&state.question).await? {
                    RouteDecision::Vectorstore { .. } => Stage::Retrieve,
                    RouteDecision::WebSearch { .. } => Stage::WebSearch,
                    RouteDecision::Undecided => Stage::FallbackGenerate,
                    RouteDecision::Ambiguous => {
                        return Err(AppError::Router(
                            "Router engaged its tools but selected none".to_string(),
                        ));
                    }
                },
                Stage::Retrieve => {
                    state = self.retrieve(state).await?;
                    Stage::GradeDocuments
                }
                Stage::GradeDocuments => {
                    state = self.grade_documents(state).await?;
                    if state.documents.is_empty() {
                        tracing::info!("No relevant documents, falling back to web search");
                        Stage::WebSearch
                    } else {
                        Stage::Generate
                    }
                }
                Stage::WebSearch => {
                    state = self.web_search(state).await?;
                    Stage::Generate
                }
                Stage::Generate => {
                    if attempts >= self.max_attempts {
                        tracing::warn!(
                            "Validation failed after {} generation attempts",
                            attempts
                        );
                        return Err(AppError::ValidationExhausted { attempts });
                    }
                    attempts += 1;
                    state = self.generate(state).await?;

                    match self.grade_generation(&state).await? {
                        Validation::Accepted => Stage::Done,
                        Validation::Ungrounded => Stage::Generate,
                        Validation::Inadequate => Stage::WebSearch,
                    }
                }
                Stage::FallbackGenerate => {
                    state = self.fallback_generate(state).await?;
                    Stage::Done
                }
                Stage::Done => {
                    return state.generation.ok_or_else(|| {
                        AppError::Generation("Pipeline finished without an answer".to_string())
                    });
                }
            };
        }
    }

    /// Pull the top-k nearest chunks from the evidence store.
    async fn retrieve(&self, mut state: RunState) -> AppResult<RunState> {
        tracing::info!("Retrieving documents from the evidence store");
        state.documents = self.store.query(&state.question, self.top_k).await?;
        tracing::debug!("Retrieved {} documents", state.documents.len());
        Ok(state)
    }

    /// Keep only the retrieved documents relevant to the question.
    async fn grade_documents(&self, mut state: RunState) -> AppResult<RunState> {
        state.documents = self
            .document_grader
            .filter(&state.question, std::mem::take(&mut state.documents))
            .await?;
        Ok(state)
    }

    /// Search the web and replace the evidence set with one synthetic
    /// document holding the joined result snippets.
    async fn web_search(&self, mut state: RunState) -> AppResult<RunState> {
        tracing::info!("Searching the web");
        let hits = self.search.search(&state.question).await?;

        let joined = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        tracing::debug!("Web search produced {} results", hits.len());
        state.documents = vec![Document::new(joined).with_metadata("source", WEB_SOURCE)];
        Ok(state)
    }

    /// Generate a candidate answer from the current evidence set.
    async fn generate(&self, mut state: RunState) -> AppResult<RunState> {
        tracing::info!("Generating answer from {} documents", state.documents.len());
        let answer = self
            .grounded
            .generate(&state.question, &state.documents)
            .await?;
        state.generation = Some(answer);
        Ok(state)
    }

    /// Answer from model knowledge; no evidence, no validation.
    async fn fallback_generate(&self, mut state: RunState) -> AppResult<RunState> {
        tracing::info!("Answering from model knowledge");
        let answer = self.fallback.generate(&state.question).await?;
        state.generation = Some(answer);
        Ok(state)
    }

    /// Validate the candidate answer: grounding first, adequacy second.
    async fn grade_generation(&self, state: &RunState) -> AppResult<Validation> {
        let generation = state.generation.as_deref().ok_or_else(|| {
            AppError::Generation("Validation requested before any generation".to_string())
        })?;

        match self
            .hallucination_grader
            .grade(&state.documents, generation)
            .await?
        {
            Grounding::NotGrounded => {
                tracing::info!("Generation is not grounded in the documents, retrying");
                return Ok(Validation::Ungrounded);
            }
            Grounding::Grounded => {
                tracing::debug!("Generation is grounded in the documents");
            }
        }

        match self.answer_grader.grade(&state.question, generation).await? {
            Adequacy::Adequate => {
                tracing::info!("Generation addresses the question");
                Ok(Validation::Accepted)
            }
            Adequacy::Inadequate => {
                tracing::info!("Generation does not address the question, searching the web");
                Ok(Validation::Inadequate)
            }
        }
    }
}

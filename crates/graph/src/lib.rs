//! Adaptive answer pipeline for verity.
//!
//! This crate wires routing, retrieval, grading, generation, and
//! validation into a single state machine. A question enters through
//! [`AnswerGraph::run`]; the router picks an evidence strategy (the
//! indexed store, a live web search, or none), retrieved evidence is
//! filtered for relevance, and every generated answer must pass a
//! grounding check and an adequacy check before it is returned. Failed
//! checks loop back with a bounded retry budget.

pub mod generate;
pub mod grade;
pub mod graph;
pub mod route;
pub mod state;

pub use generate::{FallbackGenerator, GroundedGenerator};
pub use grade::{
    Adequacy, AnswerGrader, DocumentGrader, Grounding, HallucinationGrader, Relevance,
};
pub use graph::{AnswerGraph, WEB_SOURCE};
pub use route::{decode_decision, QuestionRouter, RouteDecision, VECTORSTORE_TOOL, WEB_SEARCH_TOOL};
pub use state::RunState;

#[cfg(test)]
mod tests;

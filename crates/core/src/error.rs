//! Error types for the verity pipeline.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application. Pipeline stages wrap collaborator failures into their
//! own variant so a caller can tell routing, retrieval, search, grading, and
//! generation failures apart without inspecting message strings.

use thiserror::Error;

/// Unified error type for the verity pipeline.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chat service transport and decode errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// The router engaged its tools but expressed no selection
    #[error("Router error: {0}")]
    Router(String),

    /// Evidence store errors (index, retrieval)
    #[error("Evidence error: {0}")]
    Evidence(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Grading stage errors
    #[error("Grading error: {0}")]
    Grading(String),

    /// Generation stage errors
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// No candidate answer passed validation within the attempt bound
    #[error("No validated answer after {attempts} generation attempts")]
    ValidationExhausted { attempts: u32 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

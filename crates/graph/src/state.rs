//! Per-run pipeline state.

use verity_evidence::Document;

/// The state threaded through one traversal of the answer graph.
///
/// Each node takes the current state by value and returns the next one;
/// nothing about a run lives outside its `RunState`. The question is fixed
/// at construction, the evidence set is replaced or filtered as nodes run,
/// and the candidate answer appears once a generation node has executed.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The user's question, immutable for the run's lifetime
    pub question: String,

    /// Current evidence set; empty means "no supporting evidence"
    pub documents: Vec<Document>,

    /// Current candidate answer, absent until a generation node runs
    pub generation: Option<String>,
}

impl RunState {
    /// Create the initial state for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: None,
        }
    }
}

/// Join document contents into one block for prompt interpolation.
pub fn join_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|document| document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_empty() {
        let state = RunState::new("What is agent memory?");
        assert_eq!(state.question, "What is agent memory?");
        assert!(state.documents.is_empty());
        assert!(state.generation.is_none());
    }

    #[test]
    fn test_join_documents() {
        let documents = vec![Document::new("first"), Document::new("second")];
        assert_eq!(join_documents(&documents), "first\n\nsecond");
    }
}

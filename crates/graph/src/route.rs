//! Question routing.
//!
//! Decides, once per run, which evidence strategy a question should use.
//! The chat service is offered one tool per strategy; whatever it returns
//! is decoded into a closed `RouteDecision` so the state machine never
//! inspects raw tool-call payloads.

use std::collections::HashMap;
use std::sync::Arc;
use verity_core::AppResult;
use verity_llm::{ChatClient, RouteOption, RouteReply, RouteRequest};
use verity_prompt::{render_prompt, PromptDefinition};

/// Tool name for the live web search strategy.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Tool name for the indexed knowledge base strategy.
pub const VECTORSTORE_TOOL: &str = "vectorstore";

/// Where a question should be sent for evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Search the live web with the given query
    WebSearch { query: String },

    /// Query the indexed knowledge base with the given query
    Vectorstore { query: String },

    /// The service answered in prose instead of picking a tool; answer
    /// from model knowledge without retrieval
    Undecided,

    /// The service engaged its tools but expressed no selection; fatal
    /// for the run
    Ambiguous,
}

/// Routes questions by offering the chat service one tool per strategy.
pub struct QuestionRouter {
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: PromptDefinition,
    corpus: String,
}

impl QuestionRouter {
    /// Create a router.
    ///
    /// `corpus` describes what the knowledge base covers; it is rendered
    /// into the routing preamble and the tool descriptions so the service
    /// knows which questions the vectorstore can answer.
    pub fn new(
        client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        corpus: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            corpus: corpus.into(),
        }
    }

    /// Decide the evidence strategy for a question.
    pub async fn route(&self, question: &str) -> AppResult<RouteDecision> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("corpus".to_string(), self.corpus.clone());

        let rendered = render_prompt(&self.prompt, &variables)?;

        let options = vec![
            RouteOption::new(
                WEB_SEARCH_TOOL,
                format!(
                    "The internet. Use web_search for questions that are related to \
                     anything else than {}.",
                    self.corpus
                ),
                "The query to use when searching the internet.",
            ),
            RouteOption::new(
                VECTORSTORE_TOOL,
                format!(
                    "A vectorstore containing documents related to {}. \
                     Use the vectorstore for questions on these topics.",
                    self.corpus
                ),
                "The query to use when searching the vectorstore.",
            ),
        ];

        let mut request = RouteRequest::new(rendered.message, &self.model, options);
        if let Some(preamble) = rendered.preamble {
            request = request.with_preamble(preamble);
        }

        let reply = self.client.route(&request).await?;
        let decision = decode_decision(reply, question);

        match &decision {
            RouteDecision::WebSearch { query } => {
                tracing::info!("Routing question to web search (query: {})", query)
            }
            RouteDecision::Vectorstore { query } => {
                tracing::info!("Routing question to vectorstore (query: {})", query)
            }
            RouteDecision::Undecided => {
                tracing::info!("Router declined; answering from model knowledge")
            }
            RouteDecision::Ambiguous => {
                tracing::warn!("Router engaged its tools but made no selection")
            }
        }

        Ok(decision)
    }
}

/// Decode a routing reply into a `RouteDecision`.
///
/// Absent selections mean the service answered in prose (a legitimate
/// decline); present-but-empty selections mean it claimed a tool call it
/// never expressed. When several tools are selected the first one wins. A
/// selection without a query falls back to the original question, and an
/// unrecognized tool name defaults to the vectorstore branch.
pub fn decode_decision(reply: RouteReply, question: &str) -> RouteDecision {
    let selections = match reply.selections {
        None => return RouteDecision::Undecided,
        Some(selections) => selections,
    };

    let first = match selections.into_iter().next() {
        None => return RouteDecision::Ambiguous,
        Some(selection) => selection,
    };

    let query = first.query.unwrap_or_else(|| question.to_string());

    match first.name.as_str() {
        WEB_SEARCH_TOOL => RouteDecision::WebSearch { query },
        VECTORSTORE_TOOL => RouteDecision::Vectorstore { query },
        other => {
            tracing::debug!("Unrecognized route tool '{}', defaulting to vectorstore", other);
            RouteDecision::Vectorstore { query }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_llm::ToolSelection;

    fn reply_with(selections: Option<Vec<ToolSelection>>) -> RouteReply {
        RouteReply { selections }
    }

    fn selection(name: &str, query: Option<&str>) -> ToolSelection {
        ToolSelection {
            name: name.to_string(),
            query: query.map(|q| q.to_string()),
        }
    }

    #[test]
    fn test_decode_web_search() {
        let reply = reply_with(Some(vec![selection("web_search", Some("etf basics"))]));
        assert_eq!(
            decode_decision(reply, "What is an ETF?"),
            RouteDecision::WebSearch {
                query: "etf basics".to_string()
            }
        );
    }

    #[test]
    fn test_decode_vectorstore() {
        let reply = reply_with(Some(vec![selection("vectorstore", Some("agent memory"))]));
        assert_eq!(
            decode_decision(reply, "What is agent memory?"),
            RouteDecision::Vectorstore {
                query: "agent memory".to_string()
            }
        );
    }

    #[test]
    fn test_decode_absent_selections_is_undecided() {
        let reply = reply_with(None);
        assert_eq!(decode_decision(reply, "q"), RouteDecision::Undecided);
    }

    #[test]
    fn test_decode_empty_selections_is_ambiguous() {
        let reply = reply_with(Some(vec![]));
        assert_eq!(decode_decision(reply, "q"), RouteDecision::Ambiguous);
    }

    #[test]
    fn test_decode_unknown_tool_defaults_to_vectorstore() {
        let reply = reply_with(Some(vec![selection("crystal_ball", Some("q2"))]));
        assert_eq!(
            decode_decision(reply, "q"),
            RouteDecision::Vectorstore {
                query: "q2".to_string()
            }
        );
    }

    #[test]
    fn test_decode_missing_query_falls_back_to_question() {
        let reply = reply_with(Some(vec![selection("web_search", None)]));
        assert_eq!(
            decode_decision(reply, "What is an ETF?"),
            RouteDecision::WebSearch {
                query: "What is an ETF?".to_string()
            }
        );
    }

    #[test]
    fn test_decode_first_selection_wins() {
        let reply = reply_with(Some(vec![
            selection("web_search", Some("first")),
            selection("vectorstore", Some("second")),
        ]));
        assert_eq!(
            decode_decision(reply, "q"),
            RouteDecision::WebSearch {
                query: "first".to_string()
            }
        );
    }
}

//! Chat client abstraction and request/response types.
//!
//! This module defines the core abstractions for interacting with chat-model
//! providers. The answer pipeline drives three operations: free-form
//! generation, binary classification, and tool-based routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use verity_core::AppResult;

/// Chat generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The user message to send to the model
    pub message: String,

    /// Model identifier (e.g., "command-r")
    pub model: String,

    /// System preamble (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// Grounding documents the model should cite from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<HashMap<String, String>>,

    /// Temperature for sampling (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    /// Create a new generation request with required fields.
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            preamble: None,
            documents: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the system preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Attach grounding documents.
    pub fn with_documents(mut self, documents: Vec<HashMap<String, String>>) -> Self {
        self.documents = documents;
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Binary classification request.
///
/// The provider constrains the model to answer with a single
/// `binary_score` field of "yes" or "no".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// The message to classify
    pub message: String,

    /// Model identifier
    pub model: String,

    /// System preamble describing the grading task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
}

impl ClassifyRequest {
    /// Create a new classification request.
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            preamble: None,
        }
    }

    /// Set the system preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }
}

/// Tool-based routing request.
///
/// The model is offered a set of named tools and asked to pick the one
/// that fits the message, filling in a query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// The message to route
    pub message: String,

    /// Model identifier
    pub model: String,

    /// System preamble describing the routing task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// Tools the model may select between
    pub options: Vec<RouteOption>,
}

impl RouteRequest {
    /// Create a new routing request.
    pub fn new(
        message: impl Into<String>,
        model: impl Into<String>,
        options: Vec<RouteOption>,
    ) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            preamble: None,
            options,
        }
    }

    /// Set the system preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }
}

/// A tool offered to the model during routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOption {
    /// Tool name the model selects by
    pub name: String,

    /// Description of when to use this tool
    pub description: String,

    /// Description of the tool's query parameter
    pub query_description: String,
}

impl RouteOption {
    /// Create a new route option.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        query_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            query_description: query_description.into(),
        }
    }
}

/// Chat generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated text
    pub text: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: TokenUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Tokens in the input
    #[serde(default)]
    pub input_tokens: u32,

    /// Tokens in the output
    #[serde(default)]
    pub output_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Create usage stats from input and output token counts.
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Outcome of a binary classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryScore {
    Yes,
    No,
}

impl BinaryScore {
    /// Whether the score is affirmative.
    pub fn is_yes(&self) -> bool {
        matches!(self, BinaryScore::Yes)
    }
}

/// Routing response.
///
/// `selections` is `None` when the model answered in prose instead of
/// engaging the tools, and an empty vector when it engaged the tools but
/// selected none of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReply {
    /// Tools the model selected, in order of preference
    pub selections: Option<Vec<ToolSelection>>,
}

/// A single tool selection made by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSelection {
    /// Name of the selected tool
    pub name: String,

    /// Query the model filled in for the tool
    pub query: Option<String>,
}

/// Trait for chat-model providers.
///
/// This trait abstracts the underlying provider (Cohere, OpenAI, Ollama, etc.)
/// and provides a unified interface for the three operations the answer
/// pipeline needs.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Get the provider name (e.g., "cohere", "openai").
    fn provider_name(&self) -> &str;

    /// Perform a free-form generation.
    ///
    /// # Arguments
    /// * `request` - The generation request
    ///
    /// # Returns
    /// The complete chat reply
    async fn generate(&self, request: &GenerateRequest) -> AppResult<ChatReply>;

    /// Perform a binary classification.
    ///
    /// # Arguments
    /// * `request` - The classification request
    ///
    /// # Returns
    /// The yes/no verdict the model produced
    async fn classify(&self, request: &ClassifyRequest) -> AppResult<BinaryScore>;

    /// Route a message by offering the model a set of tools.
    ///
    /// # Arguments
    /// * `request` - The routing request
    ///
    /// # Returns
    /// The tool selections the model made, if any
    async fn route(&self, request: &RouteRequest) -> AppResult<RouteReply>;
}

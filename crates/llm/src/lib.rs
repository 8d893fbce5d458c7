//! LLM integration crate for the Verity CLI.
//!
//! This crate provides a provider-agnostic abstraction for the chat
//! operations the answer pipeline relies on: document-grounded generation,
//! binary classification, and tool-based routing.
//!
//! # Providers
//! - **Cohere**: Hosted chat API with tool and JSON support (default)
//! - Future: OpenAI, Ollama
//!
//! # Example
//! ```no_run
//! use verity_llm::{ChatClient, GenerateRequest, providers::CohereClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CohereClient::new("api-key");
//! let request = GenerateRequest::new("What is retrieval augmented generation?", "command-r");
//! let reply = client.generate(&request).await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    BinaryScore, ChatClient, ChatReply, ClassifyRequest, GenerateRequest, RouteOption,
    RouteReply, RouteRequest, TokenUsage, ToolSelection,
};
pub use factory::create_client;
pub use providers::CohereClient;

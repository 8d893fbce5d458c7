//! Evidence system for the Verity CLI.
//!
//! This crate provides the two evidence sources the answer pipeline can
//! draw on, plus the plumbing to populate the local one:
//! - SQLite-backed vector store with pluggable embedding providers
//! - Tavily web search client
//! - Ingest pipeline for local files and fetched web pages

pub mod embeddings;
pub mod ingest;
pub mod search;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_embedder, EmbedInput, Embedder, HashedEmbedder};
pub use ingest::ingest;
pub use search::{NoopSearch, SearchClient, TavilyClient};
pub use store::{EvidenceStore, SqliteStore};
pub use types::{
    ChunkCandidate, Document, EvidenceSource, IngestOptions, IngestStats, SearchHit, StoreStats,
};

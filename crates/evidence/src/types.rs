//! Evidence system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A piece of evidence handed to the answer pipeline.
///
/// Documents come from the vector store or, for web results, are
/// synthesized from search hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub content: String,

    /// Metadata (e.g., source, position)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a new document with empty metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,

    /// Result URL
    pub url: String,

    /// Extracted content snippet
    pub content: String,

    /// Provider relevance score
    #[serde(default)]
    pub score: f64,

    /// Publication date, when the provider knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// A source document tracked by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSource {
    /// Unique source identifier (content-addressed from the origin)
    pub id: String,

    /// Source origin (file path or URL)
    pub path: String,

    /// Source type: "file" or "url"
    pub source_type: String,

    /// When this source was indexed
    pub indexed_at: DateTime<Utc>,

    /// Source size in bytes
    pub byte_count: u64,
}

/// Internal chunk candidate before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    /// Source document id
    pub source_id: String,

    /// Position within the source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Metadata carried through to retrieval
    pub metadata: HashMap<String, String>,
}

/// Options for the ingest operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Local paths (files or directories) to ingest
    pub paths: Vec<PathBuf>,

    /// URLs to fetch and ingest
    pub urls: Vec<String>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between chunks in characters
    pub chunk_overlap: usize,

    /// Reset the store before ingesting
    pub reset: bool,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of sources processed
    pub sources_count: u32,

    /// Number of chunks created
    pub chunks_count: u32,

    /// Total bytes processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for the evidence store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of sources
    pub sources_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,
}

//! SQLite-backed evidence store with vector retrieval.

use crate::embeddings::{EmbedInput, Embedder};
use crate::types::{ChunkCandidate, Document, EvidenceSource, StoreStats};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use verity_core::{AppError, AppResult};

/// Read access to stored evidence.
///
/// The answer pipeline only needs retrieval; ingestion and maintenance
/// stay on the concrete store type.
#[async_trait::async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Retrieve the top-k most similar documents for a question.
    async fn query(&self, question: &str, top_k: usize) -> AppResult<Vec<Document>>;
}

/// SQLite-backed evidence store.
///
/// Embeddings are stored as little-endian f32 blobs and retrieval is a
/// full scan with cosine similarity, which is plenty for the corpus sizes
/// a workspace holds.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    embedder: Arc<dyn Embedder>,
}

impl SqliteStore {
    /// Open (or create) the evidence database at the given path.
    pub fn open(db_path: &Path, embedder: Arc<dyn Embedder>) -> AppResult<Self> {
        let conn = open_connection(db_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
            embedder,
        })
    }

    /// Record a source document, replacing any chunks from a prior ingest.
    pub fn add_source(&self, source: &EvidenceSource) -> AppResult<()> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO sources (id, path, source_type, indexed_at, byte_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                source.id,
                source.path,
                source.source_type,
                source.indexed_at.to_rfc3339(),
                source.byte_count as i64,
            ],
        )
        .map_err(|e| AppError::Evidence(format!("Failed to insert source: {}", e)))?;

        // Re-ingesting a source replaces its chunks
        conn.execute(
            "DELETE FROM chunks WHERE source_id = ?1",
            params![source.id],
        )
        .map_err(|e| AppError::Evidence(format!("Failed to clear stale chunks: {}", e)))?;

        Ok(())
    }

    /// Embed and insert a batch of chunk candidates.
    ///
    /// Returns the number of chunks written.
    pub async fn add_chunks(&self, candidates: &[ChunkCandidate]) -> AppResult<usize> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts, EmbedInput::Document)
            .await?;

        if embeddings.len() != candidates.len() {
            return Err(AppError::Evidence(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                candidates.len()
            )));
        }

        let conn = self.lock_conn()?;
        for (candidate, embedding) in candidates.iter().zip(embeddings.iter()) {
            let metadata_json = serde_json::to_string(&candidate.metadata)?;

            conn.execute(
                "INSERT INTO chunks (id, source_id, position, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    candidate.source_id,
                    candidate.position as i64,
                    candidate.text,
                    embedding_to_bytes(embedding),
                    metadata_json,
                ],
            )
            .map_err(|e| AppError::Evidence(format!("Failed to insert chunk: {}", e)))?;
        }

        tracing::debug!("Inserted {} chunks", candidates.len());
        Ok(candidates.len())
    }

    /// Get statistics for the store.
    pub fn stats(&self) -> AppResult<StoreStats> {
        let conn = self.lock_conn()?;
        collect_stats(&conn, &self.db_path)
    }

    /// Delete all sources and chunks.
    pub fn reset(&self) -> AppResult<()> {
        let conn = self.lock_conn()?;
        reset_tables(&conn)
    }

    /// Read statistics from a database without constructing an embedder.
    pub fn inspect(db_path: &Path) -> AppResult<StoreStats> {
        let conn = open_connection(db_path)?;
        collect_stats(&conn, db_path)
    }

    /// Delete all data from a database without constructing an embedder.
    pub fn clear(db_path: &Path) -> AppResult<()> {
        let conn = open_connection(db_path)?;
        reset_tables(&conn)
    }

    fn lock_conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Evidence("Evidence store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl EvidenceStore for SqliteStore {
    async fn query(&self, question: &str, top_k: usize) -> AppResult<Vec<Document>> {
        let query_embedding = self.embedder.embed(question, EmbedInput::Query).await?;

        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT text, embedding, metadata FROM chunks")
            .map_err(|e| AppError::Evidence(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let text: String = row.get(0)?;
                let embedding_bytes: Vec<u8> = row.get(1)?;
                let metadata_json: String = row.get(2)?;
                Ok((text, embedding_bytes, metadata_json))
            })
            .map_err(|e| AppError::Evidence(format!("Failed to query chunks: {}", e)))?;

        let mut scored: Vec<(Document, f32)> = Vec::new();
        for row in rows {
            let (text, embedding_bytes, metadata_json) =
                row.map_err(|e| AppError::Evidence(format!("Failed to read chunk: {}", e)))?;

            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let score = cosine_similarity(&query_embedding, &embedding);
            let metadata: HashMap<String, String> =
                serde_json::from_str(&metadata_json).unwrap_or_default();

            scored.push((
                Document {
                    content: text,
                    metadata,
                },
                score,
            ));
        }

        // Sort by score descending
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            scored.len(),
            top_k
        );

        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }
}

/// Open the database and ensure the schema exists.
fn open_connection(db_path: &Path) -> AppResult<Connection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Evidence(format!("Failed to create store directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Evidence(format!("Failed to open evidence database: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            source_type TEXT NOT NULL,
            indexed_at TEXT NOT NULL,
            byte_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
        "#,
    )
    .map_err(|e| AppError::Evidence(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Opened evidence database at {:?}", db_path);
    Ok(conn)
}

fn collect_stats(conn: &Connection, db_path: &Path) -> AppResult<StoreStats> {
    let sources_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM sources", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Evidence(format!("Failed to count sources: {}", e)))?;

    let chunks_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Evidence(format!("Failed to count chunks: {}", e)))?;

    let db_size_bytes = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    Ok(StoreStats {
        sources_count,
        chunks_count,
        db_size_bytes,
    })
}

fn reset_tables(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM chunks", [])
        .map_err(|e| AppError::Evidence(format!("Failed to delete chunks: {}", e)))?;

    conn.execute("DELETE FROM sources", [])
        .map_err(|e| AppError::Evidence(format!("Failed to delete sources: {}", e)))?;

    tracing::info!("Reset evidence store");
    Ok(())
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Evidence(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

//! Index command handler.
//!
//! Populates the evidence store from local files and URLs.

use clap::Args;
use std::path::PathBuf;
use verity_core::{config::AppConfig, AppError, AppResult};
use verity_evidence::{create_embedder, ingest, IngestOptions, SqliteStore};

/// Index files and URLs into the evidence store
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Paths to index (files or directories)
    #[arg(long)]
    pub path: Vec<PathBuf>,

    /// URLs to fetch and index
    #[arg(long)]
    pub url: Vec<String>,

    /// Chunk size in characters
    #[arg(long, default_value = "512")]
    pub chunk_size: usize,

    /// Overlap between chunks in characters
    #[arg(long, default_value = "64")]
    pub chunk_overlap: usize,

    /// Reset the store before indexing
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    /// Execute the index command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        if self.path.is_empty() && self.url.is_empty() {
            return Err(AppError::Config(
                "No sources provided. Use --path and/or --url.".to_string(),
            ));
        }

        let api_key = config.resolve_api_key(&config.provider)?;
        let embedder = create_embedder(
            &config.embedding.provider,
            &config.embedding.model,
            config.embedding.dimensions,
            api_key.as_deref(),
        )?;
        let store = SqliteStore::open(&config.evidence_db_path(), embedder)?;

        let options = IngestOptions {
            paths: self.path.clone(),
            urls: self.url.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            reset: self.reset,
        };

        let stats = ingest(&store, &options).await?;

        if self.json {
            let output = serde_json::json!({
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!(
                "Indexed {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
        }

        Ok(())
    }
}

//! Stats command handler.
//!
//! Displays evidence store statistics.

use clap::Args;
use verity_core::{config::AppConfig, AppError, AppResult};
use verity_evidence::SqliteStore;

/// Show evidence store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let db_path = config.evidence_db_path();
        let stats = SqliteStore::inspect(&db_path)?;

        if self.json {
            let output = serde_json::json!({
                "database": db_path.display().to_string(),
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Evidence store: {}", db_path.display());
            println!("  Sources: {}", stats.sources_count);
            println!("  Chunks:  {}", stats.chunks_count);
            println!("  Size:    {} bytes", stats.db_size_bytes);
        }

        Ok(())
    }
}

//! Evidence store population.
//!
//! Reads local files and fetched web pages, splits them into chunks, and
//! writes embedded chunks into the store. This is offline plumbing for the
//! `index` command; the answer pipeline itself never ingests.

use crate::store::SqliteStore;
use crate::types::{ChunkCandidate, EvidenceSource, IngestOptions, IngestStats};
use chrono::Utc;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use text_splitter::{Characters, ChunkConfig, TextSplitter};
use verity_core::{AppError, AppResult};
use walkdir::WalkDir;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Elements whose text is worth indexing, in document order.
const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, td, th, blockquote, pre";

/// Ingest sources into the evidence store.
///
/// Local files that cannot be read as UTF-8 text are skipped with a
/// warning; explicitly listed URLs that fail to fetch abort the ingest.
pub async fn ingest(store: &SqliteStore, options: &IngestOptions) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!(
        "Starting ingest: {} paths, {} urls",
        options.paths.len(),
        options.urls.len()
    );

    if options.reset {
        tracing::info!("Resetting evidence store before ingest");
        store.reset()?;
    }

    let splitter = build_splitter(options)?;

    let mut sources_count = 0u32;
    let mut chunks_count = 0u32;
    let mut bytes_processed = 0u64;

    for path in &options.paths {
        if path.is_file() {
            if let Some((chunks, bytes)) = ingest_file(store, &splitter, path).await? {
                sources_count += 1;
                chunks_count += chunks;
                bytes_processed += bytes;
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
                .filter_map(|e| e.ok())
            {
                if !entry.path().is_file() {
                    continue;
                }
                if let Some((chunks, bytes)) = ingest_file(store, &splitter, entry.path()).await? {
                    sources_count += 1;
                    chunks_count += chunks;
                    bytes_processed += bytes;
                }
            }
        } else {
            tracing::warn!("Skipping nonexistent path: {:?}", path);
        }
    }

    if !options.urls.is_empty() {
        let client = reqwest::Client::new();
        for url in &options.urls {
            let (chunks, bytes) = ingest_url(store, &splitter, &client, url).await?;
            sources_count += 1;
            chunks_count += chunks;
            bytes_processed += bytes;
        }
    }

    let duration = start.elapsed();

    tracing::info!(
        "Ingest completed: {} sources, {} chunks, {} bytes in {:.2}s",
        sources_count,
        chunks_count,
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        sources_count,
        chunks_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Ingest a single file, or `None` when the file is not readable text.
async fn ingest_file(
    store: &SqliteStore,
    splitter: &TextSplitter<Characters>,
    path: &Path,
) -> AppResult<Option<(u32, u64)>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Skipping unreadable file {:?}: {}", path, e);
            return Ok(None);
        }
    };

    let origin = path.to_string_lossy().to_string();
    let written = store_source(store, splitter, &origin, "file", &text).await?;

    Ok(Some((written, text.len() as u64)))
}

/// Fetch a URL and ingest its text content.
async fn ingest_url(
    store: &SqliteStore,
    splitter: &TextSplitter<Characters>,
    client: &reqwest::Client,
    url: &str,
) -> AppResult<(u32, u64)> {
    tracing::info!("Fetching {}", url);

    let response = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| AppError::Evidence(format!("Failed to fetch {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(AppError::Evidence(format!(
            "Fetch of {} returned status {}",
            url,
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Evidence(format!("Failed to read body of {}: {}", url, e)))?;

    let text = if content_type.contains("html") || looks_like_html(&body) {
        html_to_text(&body)
    } else {
        body
    };

    let written = store_source(store, splitter, url, "url", &text).await?;

    Ok((written, text.len() as u64))
}

/// Record a source and write its embedded chunks.
async fn store_source(
    store: &SqliteStore,
    splitter: &TextSplitter<Characters>,
    origin: &str,
    source_type: &str,
    text: &str,
) -> AppResult<u32> {
    let source = EvidenceSource {
        id: source_id(origin),
        path: origin.to_string(),
        source_type: source_type.to_string(),
        indexed_at: Utc::now(),
        byte_count: text.len() as u64,
    };

    store.add_source(&source)?;

    let candidates = chunk_candidates(&source.id, origin, text, splitter);
    let written = store.add_chunks(&candidates).await?;

    tracing::debug!("Ingested {}: {} chunks, {} bytes", origin, written, text.len());

    Ok(written as u32)
}

/// Split text into chunk candidates carrying their provenance.
fn chunk_candidates(
    source_id: &str,
    origin: &str,
    text: &str,
    splitter: &TextSplitter<Characters>,
) -> Vec<ChunkCandidate> {
    splitter
        .chunks(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .enumerate()
        .map(|(position, chunk)| {
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), origin.to_string());
            metadata.insert("position".to_string(), position.to_string());
            ChunkCandidate {
                source_id: source_id.to_string(),
                position: position as u32,
                text: chunk.to_string(),
                metadata,
            }
        })
        .collect()
}

fn build_splitter(options: &IngestOptions) -> AppResult<TextSplitter<Characters>> {
    let config = ChunkConfig::new(options.chunk_size)
        .with_overlap(options.chunk_overlap)
        .map_err(|e| AppError::Evidence(format!("Invalid chunking configuration: {}", e)))?;
    Ok(TextSplitter::new(config))
}

/// Content-addressed source id, so re-ingesting an origin replaces it.
fn source_id(origin: &str) -> String {
    format!("{:x}", Sha256::digest(origin.as_bytes()))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    let lower = head
        .get(..head.len().min(256))
        .unwrap_or("")
        .to_lowercase();
    lower.starts_with("<!doctype html") || lower.contains("<html")
}

/// Extract readable text from HTML, keeping document order.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts = Vec::new();
    if let Ok(selector) = Selector::parse(CONTENT_SELECTOR) {
        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    if parts.is_empty() {
        // Pages without structural markup degrade to the raw text
        return document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedEmbedder;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> SqliteStore {
        let db_path = dir.path().join("evidence.db");
        let embedder = Arc::new(HashedEmbedder::new(128));
        SqliteStore::open(&db_path, embedder).unwrap()
    }

    fn options(paths: Vec<PathBuf>) -> IngestOptions {
        IngestOptions {
            paths,
            urls: Vec::new(),
            chunk_size: 200,
            chunk_overlap: 0,
            reset: false,
        }
    }

    #[tokio::test]
    async fn test_ingest_files_from_directory() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.md"), "Agents decompose tasks into steps. ".repeat(20)).unwrap();
        fs::write(docs.join("b.md"), "Prompt injection overrides instructions.").unwrap();

        let stats = ingest(&store, &options(vec![docs])).await.unwrap();

        assert_eq!(stats.sources_count, 2);
        assert!(stats.chunks_count >= 2);
        assert!(stats.bytes_processed > 0);

        let store_stats = store.stats().unwrap();
        assert_eq!(store_stats.sources_count, 2);
        assert_eq!(store_stats.chunks_count, stats.chunks_count);
    }

    #[tokio::test]
    async fn test_ingest_skips_hidden_and_binary_files() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("visible.txt"), "legible text content here").unwrap();
        fs::write(docs.join(".hidden.txt"), "should not be indexed").unwrap();
        fs::write(docs.join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let stats = ingest(&store, &options(vec![docs])).await.unwrap();

        assert_eq!(stats.sources_count, 1);
    }

    #[tokio::test]
    async fn test_reingest_with_reset_drops_old_sources() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let first = dir.path().join("first.md");
        fs::write(&first, "initial corpus file").unwrap();
        ingest(&store, &options(vec![first])).await.unwrap();

        let second = dir.path().join("second.md");
        fs::write(&second, "replacement corpus file").unwrap();
        let mut opts = options(vec![second]);
        opts.reset = true;
        ingest(&store, &opts).await.unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.sources_count, 1);
    }

    #[tokio::test]
    async fn test_chunks_carry_provenance_metadata() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let file = dir.path().join("notes.md");
        fs::write(&file, "Reflection lets agents critique their own output.").unwrap();
        ingest(&store, &options(vec![file.clone()])).await.unwrap();

        let results = crate::store::EvidenceStore::query(&store, "reflection", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].metadata.get("source").map(String::as_str),
            Some(file.to_string_lossy().as_ref())
        );
        assert_eq!(
            results[0].metadata.get("position").map(String::as_str),
            Some("0")
        );
    }

    #[test]
    fn test_invalid_chunk_overlap_rejected() {
        let opts = IngestOptions {
            paths: Vec::new(),
            urls: Vec::new(),
            chunk_size: 100,
            chunk_overlap: 100,
            reset: false,
        };
        assert!(build_splitter(&opts).is_err());
    }

    #[test]
    fn test_source_id_is_stable() {
        assert_eq!(source_id("docs/a.md"), source_id("docs/a.md"));
        assert_ne!(source_id("docs/a.md"), source_id("docs/b.md"));
    }

    #[test]
    fn test_html_to_text_extracts_content_in_order() {
        let html = r#"
            <html><head><title>ignored</title>
            <script>var ignored = true;</script>
            <style>.ignored {}</style></head>
            <body>
              <h1>GPU driver setup</h1>
              <p>Install the driver package first.</p>
              <ul><li>Reboot the machine.</li></ul>
            </body></html>
        "#;

        let text = html_to_text(html);
        assert!(text.contains("GPU driver setup"));
        assert!(text.contains("Install the driver package first."));
        assert!(text.contains("Reboot the machine."));
        assert!(!text.contains("var ignored"));

        let setup = text.find("GPU driver setup").unwrap();
        let install = text.find("Install the driver").unwrap();
        let reboot = text.find("Reboot the machine").unwrap();
        assert!(setup < install && install < reboot);
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  \n<html lang=\"en\">"));
        assert!(!looks_like_html("# Markdown heading\n\nplain text"));
    }
}

//! Web search clients.
//!
//! Tavily API: https://docs.tavily.com/docs/rest-api/api-reference

use crate::types::SearchHit;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use verity_core::{AppError, AppResult};

/// Default base URL for the Tavily API.
pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

const SEARCH_ENDPOINT: &str = "/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for web search providers.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Get provider name (e.g., "tavily", "noop").
    fn provider_name(&self) -> &str;

    /// Search the web and return result snippets.
    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>>;
}

/// Tavily API request format.
///
/// Tavily authenticates with the key in the request body rather than a
/// header.
#[derive(Debug, Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    max_results: usize,
}

/// Tavily API response format.
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    published_date: Option<String>,
}

/// Tavily web search client.
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a new Tavily client with the default base URL.
    pub fn new(api_key: impl Into<String>, max_results: usize) -> Self {
        Self::with_base_url(DEFAULT_TAVILY_URL, api_key, max_results)
    }

    /// Create a new Tavily client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_results: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_results,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl SearchClient for TavilyClient {
    fn provider_name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        tracing::info!("Searching the web via Tavily");
        tracing::debug!("Search query: {}", query);

        let request = TavilyRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            max_results: self.max_results,
        };

        let url = format!("{}{}", self.base_url, SEARCH_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send search request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Tavily API error ({}): {}",
                status, error_text
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!("Tavily returned {} results", body.results.len());

        Ok(body
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
                published_date: r.published_date,
            })
            .collect())
    }
}

/// No-op search client for environments without a search API key.
///
/// Always returns an empty result set, which downstream code treats as
/// "the web had nothing to add".
pub struct NoopSearch;

#[async_trait::async_trait]
impl SearchClient for NoopSearch {
    fn provider_name(&self) -> &str {
        "noop"
    }

    async fn search(&self, _query: &str) -> AppResult<Vec<SearchHit>> {
        tracing::warn!("Web search requested but no search API key is configured");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tavily_client_creation() {
        let client = TavilyClient::new("test-key", 3);
        assert_eq!(client.provider_name(), "tavily");
        assert_eq!(client.base_url, DEFAULT_TAVILY_URL);
        assert_eq!(client.max_results, 3);
    }

    #[test]
    fn test_search_request_serialization() {
        let request = TavilyRequest {
            api_key: "tvly-key".to_string(),
            query: "llm agent memory".to_string(),
            max_results: 3,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["api_key"], "tvly-key");
        assert_eq!(value["query"], "llm agent memory");
        assert_eq!(value["max_results"], 3);
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "results": [
                {
                    "title": "Agent memory explained",
                    "url": "https://example.com/memory",
                    "content": "Agents keep short-term and long-term memory.",
                    "score": 0.97
                },
                {
                    "title": "Another take",
                    "url": "https://example.com/other",
                    "content": "Memory lets agents reuse past context.",
                    "score": 0.81,
                    "published_date": "2024-03-01"
                }
            ]
        }"#;

        let response: TavilyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title, "Agent memory explained");
        assert!(response.results[0].published_date.is_none());
        assert_eq!(
            response.results[1].published_date.as_deref(),
            Some("2024-03-01")
        );
    }

    #[test]
    fn test_search_response_missing_score_defaults() {
        let json = r#"{
            "results": [
                {"title": "t", "url": "u", "content": "c"}
            ]
        }"#;

        let response: TavilyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_noop_search_returns_empty() {
        let client = NoopSearch;
        assert_eq!(client.provider_name(), "noop");

        let hits = client.search("anything").await.unwrap();
        assert!(hits.is_empty());
    }
}

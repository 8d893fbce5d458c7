//! Cohere chat provider implementation.
//!
//! This module provides integration with the Cohere chat API, including
//! document-grounded generation, JSON-constrained binary classification,
//! and single-step tool routing.
//! Cohere API: https://docs.cohere.com/reference/chat

use crate::client::{
    BinaryScore, ChatClient, ChatReply, ClassifyRequest, GenerateRequest, RouteReply,
    RouteRequest, TokenUsage, ToolSelection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use verity_core::{AppError, AppResult};

/// Default base URL for the Cohere API.
pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.com";

const CHAT_ENDPOINT: &str = "/v1/chat";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Cohere chat API request format.
#[derive(Debug, Serialize)]
struct CohereChatRequest {
    model: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    documents: Vec<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<CohereTool>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CohereTool {
    name: String,
    description: String,
    parameter_definitions: HashMap<String, CohereToolParameter>,
}

#[derive(Debug, Serialize)]
struct CohereToolParameter {
    description: String,
    #[serde(rename = "type")]
    param_type: String,
    required: bool,
}

/// Cohere chat API response format.
#[derive(Debug, Deserialize)]
struct CohereChatResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tool_calls: Option<Vec<CohereToolCall>>,
    #[serde(default)]
    meta: Option<CohereMeta>,
}

#[derive(Debug, Deserialize)]
struct CohereToolCall {
    name: String,
    #[serde(default)]
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CohereMeta {
    #[serde(default)]
    billed_units: Option<CohereBilledUnits>,
}

#[derive(Debug, Deserialize)]
struct CohereBilledUnits {
    #[serde(default)]
    input_tokens: Option<f64>,
    #[serde(default)]
    output_tokens: Option<f64>,
}

/// Cohere chat client.
pub struct CohereClient {
    /// Base URL for the Cohere API
    base_url: String,

    /// API key
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl CohereClient {
    /// Create a new Cohere client with the default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_COHERE_URL, api_key)
    }

    /// Create a new Cohere client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn send_chat(&self, request: &CohereChatRequest) -> AppResult<CohereChatResponse> {
        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Cohere: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Cohere API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Cohere response: {}", e)))
    }

    fn usage_from(meta: Option<CohereMeta>) -> TokenUsage {
        let billed = meta.and_then(|m| m.billed_units);
        let input = billed
            .as_ref()
            .and_then(|b| b.input_tokens)
            .unwrap_or(0.0) as u32;
        let output = billed
            .as_ref()
            .and_then(|b| b.output_tokens)
            .unwrap_or(0.0) as u32;
        TokenUsage::new(input, output)
    }
}

#[async_trait::async_trait]
impl ChatClient for CohereClient {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<ChatReply> {
        tracing::info!("Sending chat request to Cohere");
        tracing::debug!("Request: {:?}", request);

        let wire = CohereChatRequest {
            model: request.model.clone(),
            message: request.message.clone(),
            preamble: request.preamble.clone(),
            documents: request.documents.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: None,
            tools: None,
        };

        let response = self.send_chat(&wire).await?;
        let usage = Self::usage_from(response.meta);

        tracing::info!("Received chat reply from Cohere");

        Ok(ChatReply {
            text: response.text,
            model: request.model.clone(),
            usage,
        })
    }

    async fn classify(&self, request: &ClassifyRequest) -> AppResult<BinaryScore> {
        tracing::debug!("Sending classification request to Cohere");

        let wire = CohereChatRequest {
            model: request.model.clone(),
            message: request.message.clone(),
            preamble: request.preamble.clone(),
            documents: Vec::new(),
            temperature: Some(0.0),
            max_tokens: None,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
                schema: binary_score_schema(),
            }),
            tools: None,
        };

        let response = self.send_chat(&wire).await?;
        parse_binary_score(&response.text)
    }

    async fn route(&self, request: &RouteRequest) -> AppResult<RouteReply> {
        tracing::debug!("Sending routing request to Cohere");

        let tools = request
            .options
            .iter()
            .map(|option| {
                let mut parameter_definitions = HashMap::new();
                parameter_definitions.insert(
                    "query".to_string(),
                    CohereToolParameter {
                        description: option.query_description.clone(),
                        param_type: "str".to_string(),
                        required: true,
                    },
                );
                CohereTool {
                    name: option.name.clone(),
                    description: option.description.clone(),
                    parameter_definitions,
                }
            })
            .collect();

        let wire = CohereChatRequest {
            model: request.model.clone(),
            message: request.message.clone(),
            preamble: request.preamble.clone(),
            documents: Vec::new(),
            temperature: Some(0.0),
            max_tokens: None,
            response_format: None,
            tools: Some(tools),
        };

        let response = self.send_chat(&wire).await?;

        let selections = response.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|call| {
                    let query = call
                        .parameters
                        .get("query")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string());
                    ToolSelection {
                        name: call.name,
                        query,
                    }
                })
                .collect()
        });

        Ok(RouteReply { selections })
    }
}

/// JSON schema constraining grader replies to a yes/no verdict.
fn binary_score_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "binary_score": {
                "type": "string",
                "enum": ["yes", "no"]
            }
        },
        "required": ["binary_score"]
    })
}

/// Parse a grader reply into a binary score.
///
/// Accepts plain JSON and JSON wrapped in markdown code fences, since
/// models occasionally fence their output despite the response format.
fn parse_binary_score(text: &str) -> AppResult<BinaryScore> {
    let body = strip_fences(text);

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::Llm(format!("Grader returned malformed JSON: {}", e)))?;

    let score = value
        .get("binary_score")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Llm("Grader reply missing binary_score field".to_string()))?;

    match score.to_lowercase().as_str() {
        "yes" => Ok(BinaryScore::Yes),
        "no" => Ok(BinaryScore::No),
        other => Err(AppError::Llm(format!(
            "Unexpected binary_score value: {}",
            other
        ))),
    }
}

fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RouteOption;

    #[test]
    fn test_cohere_client_creation() {
        let client = CohereClient::new("test-key");
        assert_eq!(client.provider_name(), "cohere");
        assert_eq!(client.base_url, DEFAULT_COHERE_URL);
    }

    #[test]
    fn test_parse_binary_score() {
        assert_eq!(
            parse_binary_score(r#"{"binary_score": "yes"}"#).unwrap(),
            BinaryScore::Yes
        );
        assert_eq!(
            parse_binary_score(r#"{"binary_score": "no"}"#).unwrap(),
            BinaryScore::No
        );
        // Case should not matter
        assert_eq!(
            parse_binary_score(r#"{"binary_score": "Yes"}"#).unwrap(),
            BinaryScore::Yes
        );
    }

    #[test]
    fn test_parse_binary_score_fenced() {
        let fenced = "```json\n{\"binary_score\": \"no\"}\n```";
        assert_eq!(parse_binary_score(fenced).unwrap(), BinaryScore::No);
    }

    #[test]
    fn test_parse_binary_score_malformed() {
        assert!(parse_binary_score("not json at all").is_err());
        assert!(parse_binary_score(r#"{"verdict": "yes"}"#).is_err());
        assert!(parse_binary_score(r#"{"binary_score": "maybe"}"#).is_err());
    }

    #[test]
    fn test_chat_request_skips_empty_fields() {
        let wire = CohereChatRequest {
            model: "command-r".to_string(),
            message: "hello".to_string(),
            preamble: None,
            documents: Vec::new(),
            temperature: Some(0.0),
            max_tokens: None,
            response_format: None,
            tools: None,
        };

        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["model"], "command-r");
        assert_eq!(value["message"], "hello");
        assert!(value.get("preamble").is_none());
        assert!(value.get("documents").is_none());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_tool_serialization() {
        let option = RouteOption::new(
            "web_search",
            "Search the internet.",
            "The query to use when searching the internet.",
        );

        let mut parameter_definitions = HashMap::new();
        parameter_definitions.insert(
            "query".to_string(),
            CohereToolParameter {
                description: option.query_description.clone(),
                param_type: "str".to_string(),
                required: true,
            },
        );
        let tool = CohereTool {
            name: option.name.clone(),
            description: option.description.clone(),
            parameter_definitions,
        };

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["name"], "web_search");
        assert_eq!(value["parameter_definitions"]["query"]["type"], "str");
        assert_eq!(value["parameter_definitions"]["query"]["required"], true);
    }

    #[test]
    fn test_tool_call_deserialization() {
        let json = r#"{
            "text": "",
            "tool_calls": [
                {"name": "vectorstore", "parameters": {"query": "agent memory"}}
            ],
            "meta": {"billed_units": {"input_tokens": 50, "output_tokens": 12}}
        }"#;

        let response: CohereChatResponse = serde_json::from_str(json).unwrap();
        let calls = response.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "vectorstore");
        assert_eq!(
            calls[0].parameters.get("query").and_then(|v| v.as_str()),
            Some("agent memory")
        );

        let usage = CohereClient::usage_from(response.meta);
        assert_eq!(usage.input_tokens, 50);
        assert_eq!(usage.output_tokens, 12);
        assert_eq!(usage.total_tokens, 62);
    }
}

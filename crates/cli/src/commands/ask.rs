//! Ask command handler.
//!
//! Runs one question through the answer pipeline: route, gather evidence,
//! generate, validate. The route taken and the validation attempts show up
//! in the logs; stdout carries only the final answer.

use clap::Args;
use std::sync::Arc;
use verity_core::config::{AppConfig, ProviderConfig};
use verity_core::{AppError, AppResult};
use verity_evidence::{create_embedder, NoopSearch, SearchClient, SqliteStore, TavilyClient};
use verity_graph::{
    AnswerGraph, AnswerGrader, DocumentGrader, FallbackGenerator, GroundedGenerator,
    HallucinationGrader, QuestionRouter,
};
use verity_llm::create_client;
use verity_prompt::{
    load_prompt, GENERATE_FALLBACK, GENERATE_GROUNDED, GRADE_ANSWER, GRADE_DOCUMENT,
    GRADE_HALLUCINATION, ROUTER_DECIDE,
};

/// Ask a question through the answer pipeline
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Maximum generation attempts before validation gives up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Question: {}", self.question);

        // Fail early on unusable provider configuration
        config.validate()?;

        let graph = build_graph(config, self.max_attempts)?;
        let answer = graph.run(&self.question).await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer,
                "model": config.model,
                "provider": config.provider,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}

/// Wire the full pipeline from configuration.
fn build_graph(config: &AppConfig, max_attempts: Option<u32>) -> AppResult<AnswerGraph> {
    // 1. Chat client for the active provider
    let provider_config = config.get_provider_config(&config.provider)?;
    let endpoint = match &provider_config {
        Some(ProviderConfig::Cohere { endpoint, .. }) => endpoint.as_deref(),
        Some(ProviderConfig::OpenAI { endpoint, .. }) => endpoint.as_deref(),
        Some(ProviderConfig::Ollama { endpoint, .. }) => Some(endpoint.as_str()),
        None => None,
    };

    let api_key = config.resolve_api_key(&config.provider)?;
    let client =
        create_client(&config.provider, endpoint, api_key.as_deref()).map_err(AppError::Config)?;

    // 2. Evidence store with the configured embedder
    let embedder = create_embedder(
        &config.embedding.provider,
        &config.embedding.model,
        config.embedding.dimensions,
        api_key.as_deref(),
    )?;
    let store = Arc::new(SqliteStore::open(&config.evidence_db_path(), embedder)?);

    // 3. Web search provider; without a key, searches come back empty
    let search: Arc<dyn SearchClient> = match config.resolve_search_api_key() {
        Some(key) => Arc::new(TavilyClient::new(key, config.search.max_results)),
        None => Arc::new(NoopSearch),
    };

    // 4. Prompts, workspace overrides included
    let workspace = &config.workspace;
    let model = &config.model;
    let pipeline = &config.pipeline;

    let router = QuestionRouter::new(
        client.clone(),
        model,
        load_prompt(workspace, ROUTER_DECIDE)?,
        &pipeline.corpus,
    );
    let document_grader =
        DocumentGrader::new(client.clone(), model, load_prompt(workspace, GRADE_DOCUMENT)?);
    let hallucination_grader = HallucinationGrader::new(
        client.clone(),
        model,
        load_prompt(workspace, GRADE_HALLUCINATION)?,
    );
    let answer_grader =
        AnswerGrader::new(client.clone(), model, load_prompt(workspace, GRADE_ANSWER)?);
    let grounded = GroundedGenerator::new(
        client.clone(),
        model,
        load_prompt(workspace, GENERATE_GROUNDED)?,
    );
    let fallback = FallbackGenerator::new(
        client.clone(),
        model,
        load_prompt(workspace, GENERATE_FALLBACK)?,
    );

    Ok(AnswerGraph::new(
        router,
        document_grader,
        hallucination_grader,
        answer_grader,
        grounded,
        fallback,
        store,
        search,
        pipeline.top_k,
        max_attempts.unwrap_or(pipeline.max_generation_attempts),
    ))
}

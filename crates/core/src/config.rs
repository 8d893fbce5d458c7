//! Configuration management for the Verity CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.verity/config.yaml)
//!
//! The configuration is workspace-centric, with most state stored in `.verity/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .verity/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Default LLM provider (e.g., "cohere", "openai", "ollama")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding settings for the evidence store
    pub embedding: EmbeddingSettings,

    /// Web search settings
    pub search: SearchSettings,

    /// Answer pipeline settings
    pub pipeline: PipelineSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Cohere {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// Embedding settings for the evidence store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider ("cohere" or "hashed")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "embed-english-v3.0".to_string(),
            dimensions: 1024,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Environment variable holding the search API key
    pub api_key_env: String,

    /// Number of results to request per search
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 3,
        }
    }
}

/// Answer pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum generation attempts before giving up validation
    pub max_generation_attempts: u32,

    /// Number of evidence chunks to retrieve per question
    pub top_k: usize,

    /// Description of what the evidence store covers, used for routing
    pub corpus: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_generation_attempts: 3,
            top_k: 4,
            corpus: "agents, prompt engineering, and adversarial attacks".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    embedding: Option<EmbeddingConfig>,
    search: Option<SearchConfig>,
    pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingConfig {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchConfig {
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "maxResults")]
    max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PipelineConfig {
    #[serde(rename = "maxGenerationAttempts")]
    max_generation_attempts: Option<u32>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    corpus: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "cohere".to_string(),
            model: "command-r".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            search: SearchSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `VERITY_WORKSPACE`: Override workspace path
    /// - `VERITY_CONFIG`: Path to config file
    /// - `VERITY_PROVIDER`: LLM provider
    /// - `VERITY_MODEL`: Model identifier
    /// - `VERITY_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use verity_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Load from environment variables
        if let Ok(workspace) = std::env::var("VERITY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("VERITY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".verity/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("VERITY_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("VERITY_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("VERITY_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        // Check for NO_COLOR environment variable
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        // Merge workspace settings
        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        // Merge logging settings
        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        // Merge LLM settings
        if let Some(llm) = config_file.llm {
            // Set active provider from YAML
            result.provider = llm.active_provider.clone();

            // Set model from active provider config
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::Cohere { model, .. } => model.clone(),
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };

                // Cohere carries its embedding model alongside the chat model
                if let ProviderConfig::Cohere {
                    embedding_model: Some(embedding_model),
                    ..
                } = provider_config
                {
                    result.embedding.model = embedding_model.clone();
                }
            }

            result.llm = Some(llm);
        }

        // Merge embedding settings
        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
        }

        // Merge search settings
        if let Some(search) = config_file.search {
            if let Some(api_key_env) = search.api_key_env {
                result.search.api_key_env = api_key_env;
            }
            if let Some(max_results) = search.max_results {
                result.search.max_results = max_results;
            }
        }

        // Merge pipeline settings
        if let Some(pipeline) = config_file.pipeline {
            if let Some(max_attempts) = pipeline.max_generation_attempts {
                result.pipeline.max_generation_attempts = max_attempts;
            }
            if let Some(top_k) = pipeline.top_k {
                result.pipeline.top_k = top_k;
            }
            if let Some(corpus) = pipeline.corpus {
                result.pipeline.corpus = corpus;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .verity directory.
    pub fn verity_dir(&self) -> PathBuf {
        self.workspace.join(".verity")
    }

    /// Ensure the .verity directory exists.
    pub fn ensure_verity_dir(&self) -> AppResult<()> {
        let verity_dir = self.verity_dir();
        if !verity_dir.exists() {
            std::fs::create_dir_all(&verity_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .verity directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the path to the evidence database.
    pub fn evidence_db_path(&self) -> PathBuf {
        self.verity_dir().join("evidence.db")
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> AppResult<Option<ProviderConfig>> {
        if let Some(ref llm) = self.llm {
            Ok(llm.providers.get(provider).cloned())
        } else {
            Ok(None)
        }
    }

    /// Resolve the API key for the given provider.
    ///
    /// Checks `VERITY_API_KEY` first, then the environment variable named
    /// in the provider's config, then the provider's conventional variable.
    pub fn resolve_api_key(&self, provider: &str) -> AppResult<Option<String>> {
        // Check explicit VERITY_API_KEY first
        if let Some(ref key) = self.api_key {
            return Ok(Some(key.clone()));
        }

        // Try provider-specific config
        if let Some(provider_config) = self.get_provider_config(provider)? {
            let env_var = match provider_config {
                ProviderConfig::Cohere { api_key_env, .. } => Some(api_key_env),
                ProviderConfig::OpenAI { api_key_env, .. } => Some(api_key_env),
                _ => None,
            };

            if let Some(env_var) = env_var {
                if let Ok(key) = std::env::var(&env_var) {
                    return Ok(Some(key));
                }
            }
        }

        // Fall back to the conventional variable for the provider
        let fallback = match provider {
            "cohere" => Some("COHERE_API_KEY"),
            "openai" => Some("OPENAI_API_KEY"),
            _ => None,
        };

        if let Some(var) = fallback {
            if let Ok(key) = std::env::var(var) {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    /// Resolve the web search API key from the environment.
    pub fn resolve_search_api_key(&self) -> Option<String> {
        std::env::var(&self.search.api_key_env).ok()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        // Check if provider is known
        let provider = &self.provider;
        let known_providers = ["cohere", "openai", "ollama"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        // Validate provider-specific requirements
        match provider.as_str() {
            "cohere" | "openai" => {
                if self.resolve_api_key(provider)?.is_none() {
                    return Err(AppError::Config(format!(
                        "No API key found for provider '{}'. \
                         Set VERITY_API_KEY or the variable named by apiKeyEnv.",
                        provider
                    )));
                }
            }
            _ => {
                // Ollama runs locally and needs no key
            }
        }

        Ok(())
    }
}

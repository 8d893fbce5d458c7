//! Prompt types for the Verity CLI.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};

/// A prompt definition, either compiled in or loaded from YAML.
///
/// The preamble becomes the system message and the template becomes the
/// user message. Both may contain Handlebars placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// System preamble template (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// User message template with Handlebars syntax
    pub template: String,
}

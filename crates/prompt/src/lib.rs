//! Prompt system for the Verity CLI.
//!
//! This crate provides the prompts the answer pipeline runs on:
//! - Compiled-in defaults for routing, grading, and generation
//! - YAML-based overrides from `.verity/prompts/`
//! - Handlebars template rendering

pub mod defaults;
pub mod loader;
pub mod render;
pub mod types;

// Re-export main types
pub use defaults::{
    GENERATE_FALLBACK, GENERATE_GROUNDED, GRADE_ANSWER, GRADE_DOCUMENT, GRADE_HALLUCINATION,
    ROUTER_DECIDE,
};
pub use loader::load_prompt;
pub use render::{render_prompt, RenderedPrompt};
pub use types::PromptDefinition;

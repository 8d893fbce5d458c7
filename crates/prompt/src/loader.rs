//! Prompt loader with workspace overrides.

use crate::defaults;
use crate::types::PromptDefinition;
use std::path::Path;
use verity_core::{AppError, AppResult};

/// Load a prompt definition by id.
///
/// This function first looks for an override file named `<id>.yml` in the
/// workspace's `.verity/prompts/` directory, then falls back to the
/// compiled-in default for that id.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.verity/`
/// * `prompt_id` - Prompt identifier (e.g., "grade.document")
///
/// # Returns
/// A `PromptDefinition` or an error if the id is unknown and no override
/// exists.
///
/// # Example
/// ```no_run
/// use verity_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let workspace = Path::new(".");
/// let prompt = load_prompt(workspace, "grade.document")?;
/// println!("Loaded prompt: {}", prompt.id);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".verity/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to parse prompt YAML {:?}: {}",
                prompt_file, e
            ))
        })?;

        validate_prompt(&definition)?;

        tracing::info!("Loaded prompt override: {}", definition.id);
        return Ok(definition);
    }

    defaults::default_prompt(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt id: {}", prompt_id)))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt id cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    Ok(())
}

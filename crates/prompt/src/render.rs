//! Prompt rendering with Handlebars templates.

use crate::types::PromptDefinition;
use handlebars::Handlebars;
use std::collections::HashMap;
use verity_core::{AppError, AppResult};

/// A fully rendered prompt ready for a chat request.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// Rendered system preamble (optional)
    pub preamble: Option<String>,

    /// Rendered user message
    pub message: String,
}

/// Render a prompt definition with the given variables.
///
/// Both the preamble and the template are rendered, so placeholders like
/// `{{corpus}}` work in either position.
///
/// # Arguments
/// * `definition` - Prompt definition to render
/// * `variables` - Template variables (e.g., "question" -> user input)
///
/// # Example
/// ```no_run
/// use verity_prompt::{load_prompt, render_prompt};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "generate.grounded")?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is agent memory?".to_string());
///
/// let rendered = render_prompt(&prompt, &vars)?;
/// println!("{}", rendered.message);
/// # Ok(())
/// # }
/// ```
pub fn render_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<RenderedPrompt> {
    tracing::debug!("Rendering prompt: {}", definition.id);

    let preamble = match &definition.preamble {
        Some(preamble) => Some(render_template(preamble, variables)?),
        None => None,
    };

    let message = render_template(&definition.template, variables)?;

    Ok(RenderedPrompt { preamble, message })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

use crate::llm::client::TextGenerator;
use crate::llm::options::{GenerationOptions, OptionAdjustment};
use crate::llm::prompt::{build_prompt, PromptBudget};
use crate::types::{Result, RetrievedChunk};
use serde::Serialize;
use tracing::{info, instrument};

/// Everything the generation stage produced.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Prompt actually sent to the model
    pub prompt: String,
    pub prompt_tokens: Option<usize>,
    pub truncated: bool,
    /// Model output without the prompt
    pub completion: String,
    /// Text shown to the user; prompt plus completion when `return_full_text` is set
    pub output: String,
    /// Options after sanitizing
    pub options: GenerationOptions,
    pub adjustments: Vec<OptionAdjustment>,
}

/// Build the prompt from `chunks` and `query` and run the generator on it.
///
/// Conflicting options are neutralized first; with truncation enabled the
/// prompt is cut to leave room for `max_new_tokens`.
#[instrument(skip_all, fields(model = generator.model_name(), chunks = chunks.len()))]
pub async fn generate_answer(
    generator: &dyn TextGenerator,
    chunks: &[RetrievedChunk],
    query: &str,
    options: &GenerationOptions,
) -> Result<Answer> {
    let mut options = options.clone();
    let adjustments = options.sanitize();

    let passages: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let (prompt, prompt_tokens, truncated) = if options.truncation {
        let fitted = PromptBudget::new()?.fit(&passages, query, options.prompt_budget())?;
        (fitted.text, Some(fitted.tokens), fitted.truncated)
    } else {
        (build_prompt(&passages, query), None, false)
    };

    let completion = generator.generate(&prompt, &options).await?;
    info!(chars = completion.len(), truncated, "Generation complete");

    let output = if options.return_full_text {
        format!("{}{}", prompt, completion)
    } else {
        completion.clone()
    };

    Ok(Answer {
        prompt,
        prompt_tokens,
        truncated,
        completion,
        output,
        options,
        adjustments,
    })
}

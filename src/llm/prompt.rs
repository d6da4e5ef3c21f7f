//! Prompt construction and token budgeting

use crate::types::{AppError, Result};
use serde::Serialize;
use tiktoken_rs::CoreBPE;
use tracing::debug;

const CONTEXT_LABEL: &str = "Context:\n";
const QUERY_LABEL: &str = "\n\nQuery:\n";
const ANSWER_CUE: &str = "\n\nAnswer:";

/// Lay out retrieved passages and the query as one prompt.
///
/// Passages are joined with newlines in the order given.
pub fn build_prompt<S: AsRef<str>>(passages: &[S], query: &str) -> String {
    let context = passages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    format_prompt(&context, query)
}

fn format_prompt(context: &str, query: &str) -> String {
    format!("{CONTEXT_LABEL}{context}{QUERY_LABEL}{query}{ANSWER_CUE}")
}

/// A prompt after fitting it into the token budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub text: String,
    pub tokens: usize,
    pub truncated: bool,
}

/// Counts and cuts prompts with the `cl100k_base` encoding.
pub struct PromptBudget {
    bpe: CoreBPE,
}

impl PromptBudget {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| AppError::Internal(format!("failed to load tokenizer: {}", e)))?;
        Ok(Self { bpe })
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Build the prompt, cutting context from its end until it fits in
    /// `budget` tokens.
    ///
    /// The labels, the query and the answer cue are kept whole. If they alone
    /// exceed the budget, only the last `budget` tokens of the prompt are kept.
    pub fn fit<S: AsRef<str>>(&self, passages: &[S], query: &str, budget: usize) -> Result<Prompt> {
        let full = build_prompt(passages, query);
        let tokens = self.count(&full);
        if tokens <= budget {
            return Ok(Prompt {
                text: full,
                tokens,
                truncated: false,
            });
        }

        let frame_tokens = self.count(&format_prompt("", query));
        if frame_tokens >= budget {
            debug!(frame_tokens, budget, "Prompt frame exceeds budget, keeping its tail");
            let encoded = self.bpe.encode_with_special_tokens(&full);
            let text = self.decode_tail(&encoded, budget)?;
            let tokens = self.count(&text);
            return Ok(Prompt {
                text,
                tokens,
                truncated: true,
            });
        }

        let context = passages
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let context_tokens = self.bpe.encode_with_special_tokens(&context);

        // Re-encoding at the joins can differ by a token or two, so shrink
        // until the assembled prompt really fits.
        let mut keep = (budget - frame_tokens).min(context_tokens.len());
        loop {
            let cut = self.decode_head(&context_tokens, keep)?;
            let text = format_prompt(cut.trim_end(), query);
            let tokens = self.count(&text);
            if tokens <= budget || keep == 0 {
                debug!(
                    original = context_tokens.len(),
                    kept = keep,
                    tokens,
                    budget,
                    "Truncated prompt context"
                );
                return Ok(Prompt {
                    text,
                    tokens,
                    truncated: true,
                });
            }
            keep -= 1;
        }
    }

    /// Decode the first `keep` tokens, backing off past a split character.
    fn decode_head(&self, tokens: &[u32], keep: usize) -> Result<String> {
        let mut end = keep.min(tokens.len());
        loop {
            match self.bpe.decode(tokens[..end].to_vec()) {
                Ok(text) => return Ok(text),
                Err(_) if end > 0 => end -= 1,
                Err(e) => return Err(AppError::Internal(e.to_string())),
            }
        }
    }

    /// Decode the last `keep` tokens, moving forward past a split character.
    fn decode_tail(&self, tokens: &[u32], keep: usize) -> Result<String> {
        let mut start = tokens.len().saturating_sub(keep);
        loop {
            match self.bpe.decode(tokens[start..].to_vec()) {
                Ok(text) => return Ok(text),
                Err(_) if start < tokens.len() => start += 1,
                Err(e) => return Err(AppError::Internal(e.to_string())),
            }
        }
    }
}

use crate::utils::toml_config::GenerationConfig;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Decoding settings passed to a [`TextGenerator`](crate::llm::TextGenerator).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub seed: Option<i32>,
    pub max_length: Option<u32>,
    pub truncation: bool,
    /// Model context window in tokens (prompt plus completion)
    pub max_context_tokens: u32,
    /// Prefix the completion with the prompt
    pub return_full_text: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 50,
            do_sample: true,
            temperature: None,
            top_p: None,
            top_k: None,
            seed: None,
            max_length: None,
            truncation: true,
            max_context_tokens: 1024,
            return_full_text: true,
        }
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            do_sample: config.do_sample,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            seed: config.seed,
            max_length: config.max_length,
            truncation: config.truncation,
            max_context_tokens: config.max_context_tokens,
            return_full_text: config.return_full_text,
        }
    }
}

/// A conflicting setting that was changed before generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "adjustment", rename_all = "snake_case")]
pub enum OptionAdjustment {
    DroppedMaxLength { max_length: u32 },
    DroppedSamplingParams { params: Vec<&'static str> },
    SwitchedToGreedy { temperature: f32 },
    DroppedTopP { top_p: f32 },
    DroppedSeed { seed: i32 },
}

impl fmt::Display for OptionAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedMaxLength { max_length } => write!(
                f,
                "max_length={} ignored because max_new_tokens is set",
                max_length
            ),
            Self::DroppedSamplingParams { params } => write!(
                f,
                "{} ignored because sampling is disabled",
                params.join(", ")
            ),
            Self::SwitchedToGreedy { temperature } => write!(
                f,
                "temperature={} disables sampling; using greedy decoding",
                temperature
            ),
            Self::DroppedTopP { top_p } => {
                write!(f, "top_p={} is outside (0, 1] and was ignored", top_p)
            }
            Self::DroppedSeed { seed } => {
                write!(f, "seed={} has no effect without sampling", seed)
            }
        }
    }
}

impl GenerationOptions {
    /// Greedy decoding with the given completion budget.
    pub fn greedy(max_new_tokens: u32) -> Self {
        Self {
            max_new_tokens,
            do_sample: false,
            ..Default::default()
        }
    }

    /// Tokens left for the prompt once the completion budget is reserved.
    pub fn prompt_budget(&self) -> usize {
        self.max_context_tokens.saturating_sub(self.max_new_tokens) as usize
    }

    /// Resolve conflicting settings so generation never fails on them.
    ///
    /// Each change is logged and returned.
    pub fn sanitize(&mut self) -> Vec<OptionAdjustment> {
        let mut adjustments = Vec::new();

        // max_new_tokens is always set, so a total length limit only conflicts
        if let Some(max_length) = self.max_length.take() {
            adjustments.push(OptionAdjustment::DroppedMaxLength { max_length });
        }

        if self.do_sample {
            if let Some(temperature) = self.temperature {
                if temperature <= 0.0 || !temperature.is_finite() {
                    self.do_sample = false;
                    self.temperature = None;
                    adjustments.push(OptionAdjustment::SwitchedToGreedy { temperature });
                }
            }
        }

        if let Some(top_p) = self.top_p {
            if !(top_p > 0.0 && top_p <= 1.0) {
                self.top_p = None;
                adjustments.push(OptionAdjustment::DroppedTopP { top_p });
            }
        }

        if !self.do_sample {
            let mut params = Vec::new();
            if self.temperature.take().is_some() {
                params.push("temperature");
            }
            if self.top_p.take().is_some() {
                params.push("top_p");
            }
            if self.top_k.take().is_some() {
                params.push("top_k");
            }
            if !params.is_empty() {
                adjustments.push(OptionAdjustment::DroppedSamplingParams { params });
            }
            if let Some(seed) = self.seed.take() {
                adjustments.push(OptionAdjustment::DroppedSeed { seed });
            }
        }

        for adjustment in &adjustments {
            warn!(%adjustment, "Adjusted generation option");
        }
        adjustments
    }
}

//! Text generation abstractions and provider selection

use crate::llm::options::GenerationOptions;
use crate::types::{AppError, Result};
use crate::utils::toml_config::GenerationConfig;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// A causal language model that continues a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a continuation of `prompt`.
    ///
    /// Returns only the newly generated text, never the prompt itself.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2:1b".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

/// Provider names accepted in `generation.provider`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            other => Err(AppError::InvalidConfig(format!(
                "unknown provider '{}' (supported: ollama)",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Ollama => f.write_str("ollama"),
        }
    }
}

impl Provider {
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        match config.provider.parse::<ProviderKind>()? {
            ProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: config.resolved_base_url(),
                model: config.model.clone(),
            }),
        }
    }

    /// Create a generator for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's feature was not compiled in or its
    /// configuration is invalid.
    pub fn create_generator(&self) -> Result<Box<dyn TextGenerator>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaGenerator::new(base_url, model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => Err(AppError::InvalidConfig(
                "folio was built without the `ollama` feature".to_string(),
            )),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_config() {
        let config = GenerationConfig {
            provider: "Ollama".to_string(),
            base_url: "http://127.0.0.1:9999".to_string(),
            model: "tinyllama".to_string(),
            ..Default::default()
        };
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(
            provider,
            Provider::Ollama {
                base_url: "http://127.0.0.1:9999".to_string(),
                model: "tinyllama".to_string(),
            }
        );
        assert_eq!(provider.name(), "Ollama");
        assert_eq!(provider.model(), "tinyllama");
    }

    #[test]
    fn test_unknown_provider() {
        let config = GenerationConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Provider::from_config(&config),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn test_create_ollama_generator() {
        let provider = Provider::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:1b".to_string(),
        };
        let generator = provider.create_generator().unwrap();
        assert_eq!(generator.model_name(), "llama3.2:1b");
    }
}

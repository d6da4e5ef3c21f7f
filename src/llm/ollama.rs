use crate::llm::client::TextGenerator;
use crate::llm::options::GenerationOptions;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use tracing::{debug, instrument};

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaGenerator {
    client: Ollama,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: String) -> Result<Self> {
        let (host, port) = split_base_url(base_url)?;
        debug!(%host, port, %model, "Creating Ollama generator");
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }
}

/// Split `scheme://host[:port][/path]` into `scheme://host` and the port.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let base_url = base_url.trim();
    let (scheme, rest) = base_url.split_once("://").unwrap_or(("http", base_url));
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(AppError::InvalidConfig(format!(
            "invalid Ollama base_url '{}'",
            base_url
        )));
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                AppError::InvalidConfig(format!("invalid port in Ollama base_url '{}'", base_url))
            })?;
            (host, port)
        }
        None => (authority, DEFAULT_PORT),
    };

    Ok((format!("{}://{}", scheme, host), port))
}

fn model_options(options: &GenerationOptions) -> Result<ModelOptions> {
    let num_predict = i32::try_from(options.max_new_tokens).map_err(|_| {
        AppError::InvalidConfig(format!(
            "max_new_tokens ({}) is larger than Ollama accepts",
            options.max_new_tokens
        ))
    })?;
    let mut model_options = ModelOptions::default()
        .num_predict(num_predict)
        .num_ctx(options.max_context_tokens as u64);

    if options.do_sample {
        if let Some(temperature) = options.temperature {
            model_options = model_options.temperature(temperature);
        }
        if let Some(top_p) = options.top_p {
            model_options = model_options.top_p(top_p);
        }
        if let Some(top_k) = options.top_k {
            model_options = model_options.top_k(top_k);
        }
        if let Some(seed) = options.seed {
            model_options = model_options.seed(seed);
        }
    } else {
        model_options = model_options.temperature(0.0).top_k(1);
    }

    Ok(model_options)
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    #[instrument(skip(self, prompt, options), fields(model = %self.model, max_new_tokens = options.max_new_tokens))]
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = GenerationRequest::new(self.model.clone(), prompt.to_string())
            .options(model_options(options)?);

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        debug!(chars = response.response.len(), "Ollama completion received");
        Ok(response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:11434", "http://localhost", 11434)]
    #[case("https://ollama.internal:8443/", "https://ollama.internal", 8443)]
    #[case("http://gpu-box", "http://gpu-box", 11434)]
    #[case("127.0.0.1:9000", "http://127.0.0.1", 9000)]
    fn test_split_base_url(#[case] url: &str, #[case] host: &str, #[case] port: u16) {
        assert_eq!(split_base_url(url).unwrap(), (host.to_string(), port));
    }

    #[rstest]
    #[case("http://localhost:notaport")]
    #[case("http://")]
    #[case("")]
    fn test_split_base_url_rejects(#[case] url: &str) {
        assert!(matches!(split_base_url(url), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_max_new_tokens_beyond_i32_is_rejected() {
        let options = GenerationOptions {
            max_new_tokens: i32::MAX as u32 + 1,
            ..GenerationOptions::default()
        };
        assert!(matches!(
            model_options(&options),
            Err(AppError::InvalidConfig(_))
        ));

        let options = GenerationOptions {
            max_new_tokens: i32::MAX as u32,
            ..GenerationOptions::default()
        };
        assert!(model_options(&options).is_ok());
        assert!(model_options(&GenerationOptions::greedy(50)).is_ok());
    }
}

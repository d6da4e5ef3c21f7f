//! Init command implementation
//!
//! Writes a commented `folio.toml` holding the default settings.

use super::output::Output;
use std::fs;
use std::path::Path;

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// The file was written
    Success,
    /// A config file already exists and `force` was not given
    AlreadyExists,
    /// An error occurred while writing
    Error(String),
}

/// Run the init command
pub fn run(path: &Path, force: bool, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing folio");

    if path.exists() && !force {
        output.warning(&format!("{} already exists!", path.display()));
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = fs::write(path, default_config_toml()) {
        output.error(&format!("Failed to write {}: {}", path.display(), e));
        return InitResult::Error(e.to_string());
    }

    output.created("config", &path.display().to_string());
    output.hint("Set document.path or pass --pdf, then run `folio`");
    InitResult::Success
}

/// The file written by `folio init`
pub fn default_config_toml() -> &'static str {
    r#"# folio configuration
# Every key is optional; the values below are the built-in defaults.

[document]
# PDF to read when --pdf is not given
# path = "document.pdf"
query = "What is this document about?"

[chunking]
# Window size and overlap, both in words
chunk_size = 500
chunk_overlap = 50

[embedding]
# all-MiniLM-L6-v2, all-MiniLM-L12-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5
model = "sentence-transformers/all-MiniLM-L6-v2"
show_download_progress = true
# cache_dir = ".fastembed_cache"

[retrieval]
top_k = 2
# "euclidean" or "cosine"
metric = "euclidean"

[generation]
provider = "ollama"
base_url = "http://localhost:11434"
# Environment variable that overrides base_url when set
# base_url_env = "OLLAMA_URL"
model = "llama3.2:1b"
max_new_tokens = 50
do_sample = true
# temperature = 0.8
# top_p = 0.95
# top_k = 40
# seed = 42
truncation = true
max_context_tokens = 1024
# Print the prompt in front of the completion
return_full_text = true

[logging]
level = "info"
# "pretty" or "json"
format = "pretty"
"#
}

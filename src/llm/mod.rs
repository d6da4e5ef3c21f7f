//! Text generation
//!
//! - [`TextGenerator`] - The trait every model backend implements
//! - [`Provider`] - Selects and builds a backend from `[generation]` config
//! - [`GenerationOptions`] - Decoding settings, sanitized before each call
//! - [`prompt`] - Prompt layout and token budgeting
//! - [`generate_answer`] - The generation stage: prompt, call, output
//!
//! Enable backends via Cargo features:
//! - `ollama` - Local Ollama server (default)

/// Generation stage entry point.
pub mod answer;
/// Core generator trait and provider selection.
pub mod client;
pub mod options;
pub mod prompt;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use answer::{generate_answer, Answer};
pub use client::{Provider, ProviderKind, TextGenerator};
pub use options::{GenerationOptions, OptionAdjustment};

//! CLI module for folio
//!
//! Argument parsing for the `folio` binary. Uses clap for argument parsing and
//! owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// folio - ask questions about a PDF
#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "folio - ask questions about a PDF",
    long_about = "Extracts the text of a PDF, splits it into overlapping chunks, embeds and indexes them,\n\
                  retrieves the chunks closest to a query and asks a language model to answer it.\n\n\
                  Run without a subcommand to execute the full pipeline.",
    after_help = "EXAMPLES:\n    \
                  folio init                                   # Write a default folio.toml\n    \
                  folio --pdf paper.pdf                        # Ask the default query\n    \
                  folio run --pdf paper.pdf --query \"Who?\"     # Ask a specific question\n    \
                  folio extract --pdf paper.pdf                # Show extracted text only"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "folio.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Pipeline options used when no subcommand is given
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: extract, chunk, index, retrieve, generate
    Run(RunArgs),

    /// Extract text from a PDF and report per-page results
    Extract {
        /// PDF file to read
        #[arg(long)]
        pdf: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract and chunk a PDF, then print chunk statistics
    Chunk {
        /// PDF file to read
        #[arg(long)]
        pdf: PathBuf,

        /// Window size in words
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Words shared by consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Show the effective configuration
    Config {
        /// Only check that the configuration is valid
        #[arg(long)]
        validate: bool,
    },

    /// Write a default folio.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Overrides for a pipeline run; anything left unset comes from the config file
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// PDF file to read
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Question to ask about the document
    #[arg(short, long)]
    pub query: Option<String>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Window size in words
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Words shared by consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Generation model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum number of tokens to generate
    #[arg(long)]
    pub max_new_tokens: Option<u32>,

    /// Disable sampling
    #[arg(long)]
    pub greedy: bool,

    /// Sampling seed
    #[arg(long)]
    pub seed: Option<i32>,

    /// Print the full run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut crate::utils::toml_config::FolioConfig) {
        if let Some(pdf) = &self.pdf {
            config.document.path = Some(pdf.clone());
        }
        if let Some(query) = &self.query {
            config.document.query = query.clone();
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(size) = self.chunk_size {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunking.chunk_overlap = overlap;
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        if let Some(max_new_tokens) = self.max_new_tokens {
            config.generation.max_new_tokens = max_new_tokens;
        }
        if self.greedy {
            config.generation.do_sample = false;
        }
        if let Some(seed) = self.seed {
            config.generation.seed = Some(seed);
        }
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::FolioConfig;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_flags_run_pipeline() {
        let cli = Cli::parse_from(["folio", "--pdf", "a.pdf", "-k", "3"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.pdf, Some(PathBuf::from("a.pdf")));
        assert_eq!(cli.run.top_k, Some(3));
    }

    #[test]
    fn test_run_subcommand() {
        let cli = Cli::parse_from([
            "folio", "run", "--pdf", "b.pdf", "--query", "Who?", "--greedy", "--json",
        ]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.query.as_deref(), Some("Who?"));
                assert!(args.greedy);
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = FolioConfig::default();
        let args = RunArgs {
            pdf: Some(PathBuf::from("doc.pdf")),
            query: Some("Summary?".to_string()),
            chunk_size: Some(100),
            chunk_overlap: Some(10),
            greedy: true,
            seed: Some(4),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.document.path, Some(PathBuf::from("doc.pdf")));
        assert_eq!(config.document.query, "Summary?");
        assert_eq!(config.chunking.chunk_size, 100);
        assert_eq!(config.chunking.chunk_overlap, 10);
        assert!(!config.generation.do_sample);
        assert_eq!(config.generation.seed, Some(4));
        assert_eq!(config.retrieval.top_k, 2);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["folio", "config", "--config", "other.toml", "--validate"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));
    }
}

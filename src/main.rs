use anyhow::{bail, Context};
use folio::cli::init::{self, InitResult};
use folio::cli::output::{preview, Output};
use folio::cli::{Cli, Commands, RunArgs};
use folio::extract::{self, PageOutcome};
use folio::rag::chunk_document;
use folio::utils::toml_config::{FolioConfig, LoggingConfig, DEFAULT_CONFIG_FILE};
use folio::{PipelineReport, TextChunker};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    if let Some(Commands::Init { force }) = &cli.command {
        return match init::run(&cli.config, *force, output) {
            InitResult::Success => Ok(()),
            InitResult::AlreadyExists => bail!("{} already exists", cli.config.display()),
            InitResult::Error(e) => bail!("init failed: {}", e),
        };
    }

    let config = load_config(&cli.config)?;
    init_tracing(&config.logging, cli.verbose)?;

    match cli.command {
        None => run_pipeline(config, &cli.run, output).await,
        Some(Commands::Run(args)) => run_pipeline(config, &args, output).await,
        Some(Commands::Extract { pdf, json }) => run_extract(&pdf, json, output),
        Some(Commands::Chunk {
            pdf,
            chunk_size,
            chunk_overlap,
        }) => run_chunk(&config, &pdf, chunk_size, chunk_overlap, output),
        Some(Commands::Config { validate }) => {
            if validate {
                output.success(&format!("{} is valid", cli.config.display()));
            } else {
                print!("{}", config.to_toml()?);
            }
            Ok(())
        }
        Some(Commands::Init { .. }) => Ok(()),
    }
}

/// The default file may be absent; a path given explicitly must exist.
fn load_config(path: &Path) -> anyhow::Result<FolioConfig> {
    let config = if path == Path::new(DEFAULT_CONFIG_FILE) {
        FolioConfig::load_or_default(path)
    } else {
        FolioConfig::load(path)
    };
    config.with_context(|| format!("failed to load {}", path.display()))
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("folio=debug,folio_vector=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))
            .context("invalid logging.level")?
    };

    let json = logging.format == "json";
    let pretty_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(json_layer)
        .try_init()
        .context("failed to initialise logging")?;
    Ok(())
}

async fn run_pipeline(
    mut config: FolioConfig,
    args: &RunArgs,
    output: &Output,
) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let Some(pdf) = config.document.path.clone() else {
        bail!("no PDF given: pass --pdf or set document.path in the config file");
    };
    let query = config.document.query.clone();

    let report = execute(&config, &pdf, &query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, output);
    }
    Ok(())
}

#[cfg(feature = "local-embeddings")]
async fn execute(config: &FolioConfig, pdf: &Path, query: &str) -> anyhow::Result<PipelineReport> {
    let mut pipeline = folio::RagPipeline::from_config(config)?;
    Ok(pipeline.run(pdf, query).await?)
}

#[cfg(not(feature = "local-embeddings"))]
async fn execute(
    _config: &FolioConfig,
    _pdf: &Path,
    _query: &str,
) -> anyhow::Result<PipelineReport> {
    bail!("folio was built without the `local-embeddings` feature; no embedding model is available")
}

fn print_report(report: &PipelineReport, output: &Output) {
    output.banner();

    output.header("Extraction");
    output.step(1, 5, "Extracted text");
    print_pages(&report.extraction.pages, output);
    output.block(&preview(&report.text_preview, 300));

    output.step(2, 5, "Chunked document");
    output.kv("words", &report.word_count.to_string());
    output.kv("chunks", &report.chunk_count.to_string());

    output.step(3, 5, "Indexed chunks");
    output.kv("model", &report.embedding_model);
    output.kv("dimensions", &report.dimensions.to_string());

    output.step(4, 5, "Retrieved context");
    output.kv("query", &report.query);
    output.info(&format!(
        "Retrieved {} of {} chunks",
        report.retrieved.len(),
        report.chunk_count
    ));
    for chunk in &report.retrieved {
        output.passage(chunk.rank, chunk.position, chunk.distance, &chunk.text);
    }

    output.step(5, 5, "Generated response");
    for adjustment in &report.answer.adjustments {
        output.warning(&adjustment.to_string());
    }
    if report.answer.truncated {
        output.warning("Prompt was truncated to fit the model context");
    }

    output.header("Response");
    output.block(&report.answer.output);
    output.newline();
}

fn print_pages(pages: &[PageOutcome], output: &Output) {
    let skipped = pages.iter().filter(|p| p.is_skipped()).count();
    output.kv("pages", &format!("{} read, {} skipped", pages.len() - skipped, skipped));
    for page in pages {
        if let PageOutcome::Skipped { page, reason } = page {
            output.warning(&format!("page {}: {}", page, reason));
        }
    }
}

fn run_extract(pdf: &Path, json: bool, output: &Output) -> anyhow::Result<()> {
    let document = extract::extract_pdf(pdf)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    output.header(&format!("Extracted {}", pdf.display()));
    print_pages(&document.report.pages, output);
    output.kv("words", &document.word_count().to_string());
    output.newline();
    println!("{}", document.text);
    Ok(())
}

fn run_chunk(
    config: &FolioConfig,
    pdf: &Path,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    output: &Output,
) -> anyhow::Result<()> {
    let chunker = TextChunker::new(
        chunk_size.unwrap_or(config.chunking.chunk_size),
        chunk_overlap.unwrap_or(config.chunking.chunk_overlap),
    )?;
    let document = extract::extract_pdf(pdf)?;
    let chunks = chunk_document(&chunker, &document.text);

    output.header(&format!("Chunked {}", pdf.display()));
    print_pages(&document.report.pages, output);
    output.kv("words", &document.word_count().to_string());
    output.kv(
        "window",
        &format!(
            "{} words, {} overlap",
            chunker.chunk_size(),
            chunker.chunk_overlap()
        ),
    );
    output.kv("chunks", &chunks.len().to_string());
    for chunk in &chunks {
        output.list_item(&format!(
            "chunk {} ({} words): {}",
            chunk.position,
            chunk.word_count(),
            preview(&chunk.text, 80)
        ));
    }
    Ok(())
}

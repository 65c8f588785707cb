//! # PDF Chunker CLI (`pdfchunk`)
//!
//! Converts PDFs into chunk records, writes them as JSON, and optionally
//! loads them into a Meilisearch index.
//!
//! ## Usage
//!
//! ```bash
//! pdfchunk --config ./config/pdfchunk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfchunk run <pdf>` | Convert, chunk, and export one PDF (`--load` to index it) |
//! | `pdfchunk chunk <file>` | Chunk an already-converted text or markdown file |
//! | `pdfchunk load <json>` | Load an exported records file into the index |
//! | `pdfchunk search "<query>"` | Search the index (keyword, semantic, or hybrid) |
//! | `pdfchunk check` | Show converter and index health |
//!
//! Logs go to stderr; `RUST_LOG` takes precedence over `--verbose`.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pdf_chunker::config::{self, ChunkingConfig, Config, ConverterBackend};
use pdf_chunker::export::{default_output_path, write_records};
use pdf_chunker::extract::create_converter;
use pdf_chunker::index::{ChunkIndex, MeilisearchIndex, SearchMode, SearchRequest};
use pdf_chunker::{pipeline, search, services};

/// PDF Chunker: split PDF documents into heading-aware, overlapping
/// chunks ready for a search index.
#[derive(Parser)]
#[command(
    name = "pdfchunk",
    about = "Split PDF documents into search-ready chunk records",
    version,
    long_about = "pdfchunk converts a PDF to markdown (via docling-serve or local text \
    extraction), normalizes whitespace, splits the text on section headings and into \
    overlapping character windows, and writes flat JSON records that can be loaded \
    into a Meilisearch index."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pdfchunk.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/pdfchunk.toml")]
    config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one PDF.
    ///
    /// Writes records to `<pdf stem>.chunks.json` next to the input unless
    /// `--output` is given.
    Run {
        /// The PDF to process.
        pdf: PathBuf,

        /// Output JSON path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also load the records into the configured index.
        #[arg(long)]
        load: bool,

        /// Override `conversion.backend`.
        #[arg(long, value_enum)]
        backend: Option<ConverterBackend>,

        #[command(flatten)]
        chunking: ChunkArgs,
    },

    /// Chunk a text or markdown file that was converted elsewhere.
    ///
    /// Prints the records to stdout unless `--output` is given.
    Chunk {
        /// The text or markdown file.
        input: PathBuf,

        /// Output JSON path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        chunking: ChunkArgs,
    },

    /// Load an exported records file into the configured index.
    Load {
        /// JSON file written by `run` or `chunk`.
        input: PathBuf,
    },

    /// Search the indexed chunks.
    ///
    /// Prints one line per hit: rank, score, chunk id, section title, and
    /// an excerpt of the chunk text.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of hits to return.
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Search mode. Defaults to `hybrid` when `[index.embedder]` is
        /// configured, `keyword` otherwise; semantic and hybrid require it.
        #[arg(long, value_enum)]
        mode: Option<SearchMode>,

        /// Share of the vector ranking in hybrid mode (0.0 to 1.0).
        #[arg(long, default_value_t = 0.5)]
        semantic_ratio: f64,
    },

    /// Check converter and index health.
    Check,
}

/// Command-line overrides for the `[chunking]` section.
#[derive(Args)]
struct ChunkArgs {
    /// Maximum chunk length in characters.
    #[arg(long)]
    max_chars: Option<usize>,

    /// Characters shared between consecutive windows of a section.
    #[arg(long)]
    overlap: Option<usize>,

    /// Treat the whole document as one section.
    #[arg(long)]
    no_header_split: bool,
}

impl ChunkArgs {
    fn apply(&self, chunking: &mut ChunkingConfig) {
        if let Some(max_chars) = self.max_chars {
            chunking.max_chars = max_chars;
        }
        if let Some(overlap) = self.overlap {
            chunking.overlap_chars = overlap;
        }
        if self.no_header_split {
            chunking.split_on_headers = false;
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "debug,hyper=info,hyper_util=info,reqwest=info,rustls=info,h2=info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

/// Apply chunking flags on top of the loaded config and re-check it.
fn with_overrides(mut cfg: Config, chunking: &ChunkArgs) -> Result<Config> {
    chunking.apply(&mut cfg.chunking);
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Run {
            pdf,
            output,
            load,
            backend,
            chunking,
        } => {
            let mut cfg = with_overrides(cfg, &chunking)?;
            if let Some(backend) = backend {
                cfg.conversion.backend = backend;
                cfg.validate()?;
            }

            // Build the index client first so a missing key fails before conversion.
            let index = if load {
                let index = MeilisearchIndex::new(&cfg.index)?;
                index.settings()?;
                Some(index)
            } else {
                None
            };
            let converter = create_converter(&cfg.conversion)?;
            let output = output.unwrap_or_else(|| default_output_path(&pdf));

            let records = pipeline::run_pipeline(
                &cfg,
                &pdf,
                converter.as_ref(),
                index.as_ref().map(|i| i as &dyn ChunkIndex),
                Some(&output),
            )
            .await?;

            println!("Chunks: {}", records.len());
            println!("Output: {}", output.display());
            if let Some(index) = &index {
                println!("Loaded into index '{}'.", index.name());
            }
        }
        Commands::Chunk {
            input,
            output,
            chunking,
        } => {
            let cfg = with_overrides(cfg, &chunking)?;
            let records = pipeline::chunk_text_file(&cfg, &input)?;
            write_records(&records, output.as_deref())?;
            if let Some(path) = &output {
                println!("Chunks: {}", records.len());
                println!("Output: {}", path.display());
            }
        }
        Commands::Load { input } => {
            let index = MeilisearchIndex::new(&cfg.index)?;
            let count = pipeline::load_records_file(&index, &input).await?;
            println!("Loaded {} records into index '{}'.", count, index.name());
        }
        Commands::Search {
            query,
            limit,
            mode,
            semantic_ratio,
        } => {
            let index = MeilisearchIndex::new(&cfg.index)?;
            let request = SearchRequest {
                query,
                limit,
                mode: mode.unwrap_or_else(|| search::default_mode(&cfg.index)),
                semantic_ratio,
            };
            search::run_search(&index, &request).await?;
        }
        Commands::Check => {
            services::list_services(&cfg).await?;
        }
    }

    Ok(())
}

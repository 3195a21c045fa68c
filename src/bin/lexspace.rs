//! LEXSPACE CLI
//!
//! Finds the words most conceptually distant from (or similar to) a word
//! in a pre-trained embedding model.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexspace::{load_path, negate, Config, Format, Neighbor};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// LEXSPACE - Embedding Nearest-Neighbor Queries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the pre-trained model (word2vec text or binary)
    #[arg(short, long, default_value = "GoogleNews-vectors-negative300.bin")]
    model: PathBuf,

    /// Model file layout (auto, text, binary)
    #[arg(long, default_value_t = Format::Auto)]
    format: Format,

    /// Load only the first N vocabulary entries
    #[arg(long)]
    limit: Option<usize>,

    /// Number of words to print
    #[arg(short = 'n', long, default_value_t = 10)]
    top_n: usize,

    /// Scan shards per query (0 = one per CPU core)
    #[arg(long, default_value_t = 1)]
    shards: usize,

    /// Replace invalid UTF-8 in vocabulary tokens instead of failing
    #[arg(long, default_value_t = false)]
    lossy_utf8: bool,

    /// Log level for the lexspace crate
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Words closest to the negation of WORD's vector
    Distant { word: String },

    /// Words closest to WORD's vector, excluding WORD
    Similar { word: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries results
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("lexspace={}", args.log_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::default()
        .with_model_path(args.model.clone())
        .with_format(args.format)
        .with_limit(args.limit)
        .with_top_n(args.top_n)
        .with_shards(args.shards)
        .with_lossy_utf8(args.lossy_utf8);

    info!("Loading model from {}", config.model_path.display());
    let space = load_path(&config.model_path, &config.load_options())
        .with_context(|| format!("failed to load model {}", config.model_path.display()))?;

    let word = match &args.command {
        Command::Distant { word } | Command::Similar { word } => word.as_str(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !space.contains(word) {
        write_not_found(&mut out, word)?;
        return Ok(());
    }

    match args.command {
        Command::Distant { ref word } => {
            let probe = negate(space.vector_of(word)?);
            debug!(%word, top_n = config.top_n, shards = config.shards, "distant query");
            let neighbors = space.most_similar_parallel(&probe, config.top_n, config.shards)?;
            write_neighbors(
                &mut out,
                &format!("Most conceptually distant words from '{}':", word),
                &neighbors,
            )?;
        }
        Command::Similar { ref word } => {
            debug!(%word, top_n = config.top_n, "similar query");
            let neighbors = space.similar_to_token(word, config.top_n)?;
            write_neighbors(&mut out, &format!("Most similar words to '{}':", word), &neighbors)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_not_found(out: &mut impl Write, word: &str) -> io::Result<()> {
    writeln!(out, "'{}' not found in the model vocabulary.", word)
}

fn write_neighbors(out: &mut impl Write, title: &str, neighbors: &[Neighbor]) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    for neighbor in neighbors {
        writeln!(out, "{}: {:.4}", neighbor.token, neighbor.score)?;
    }
    Ok(())
}

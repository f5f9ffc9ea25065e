//! CLI entry point for the index builder batch job.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use prepmate_embeddings::{DEFAULT_DIMENSION, EmbeddingEncoder, HashEncoder, OpenAiEncoder};
use prepmate_index_builder::IndexBuilder;
use prepmate_websearch::DuckDuckGoProvider;

/// Build and publish the prepmate index snapshot from seed topics.
#[derive(Parser, Debug)]
#[command(name = "prepmate-index-builder", version)]
struct Cli {
    /// File with one seed topic per line.
    #[arg(long)]
    topics: PathBuf,

    /// Directory the snapshot is published into.
    #[arg(long)]
    out: PathBuf,

    /// Search results collected per topic.
    #[arg(long, default_value_t = 5)]
    results_per_topic: usize,

    /// Which embedding encoder to use.
    #[arg(long, value_enum, default_value_t = EncoderKind::Openai)]
    encoder: EncoderKind,

    /// Embedding dimension.
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncoderKind {
    /// OpenAI embeddings API (requires OPENAI_API_KEY).
    Openai,
    /// Deterministic local hash encoder.
    Hash,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let topics = read_topics(&cli.topics)
        .with_context(|| format!("reading topics from {}", cli.topics.display()))?;
    if topics.is_empty() {
        bail!("no topics found in {}", cli.topics.display());
    }

    let encoder: Arc<dyn EmbeddingEncoder> = match cli.encoder {
        EncoderKind::Openai => {
            let encoder = OpenAiEncoder::new().with_dimension(cli.dimension);
            if !encoder.is_available() {
                bail!("OPENAI_API_KEY is not set; use --encoder hash for a local build");
            }
            Arc::new(encoder)
        }
        EncoderKind::Hash => Arc::new(HashEncoder::with_dimension(cli.dimension)),
    };

    let search = Arc::new(DuckDuckGoProvider::new());

    let builder =
        IndexBuilder::new(encoder, search).with_results_per_topic(cli.results_per_topic);

    info!("Building index from {} topics", topics.len());
    let snapshot = builder.build(&topics).await?;

    snapshot
        .save(&cli.out)
        .await
        .with_context(|| format!("publishing snapshot to {}", cli.out.display()))?;

    info!(
        "Published snapshot with {} documents to {}",
        snapshot.len(),
        cli.out.display()
    );
    Ok(())
}

fn read_topics(path: &PathBuf) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

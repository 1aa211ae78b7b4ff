//! Framework vectorizer
//!
//! Embeds framework chunks that have no embedding yet, writes them back and
//! runs a sample similarity search.
//!
//! Run with: cargo run -p course-align --bin course-align-vectorize

use anyhow::{bail, Context};
use clap::Parser;
use course_align::{
    config::AlignConfig,
    providers::{EmbeddingProvider, HuggingFaceEmbedder},
    FrameworkIndex,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "course-align-vectorize", version, about = "Embed framework chunks")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Framework chunk file (overrides framework.chunks_path)
    #[arg(long)]
    chunks: Option<PathBuf>,

    /// Report pending chunks without calling the embedding service
    #[arg(long)]
    dry_run: bool,

    /// Query for the post-run similarity search
    #[arg(long, default_value = "bias in AI education")]
    query: String,

    /// Minimum similarity for the sample search
    #[arg(long, default_value_t = 0.3)]
    threshold: f32,

    /// Results shown by the sample search
    #[arg(long, default_value_t = 3)]
    top: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_align=info,course_align_vectorize=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AlignConfig::load(args.config.as_deref())?;
    let path = args.chunks.unwrap_or(config.framework.chunks_path.clone());

    let mut index = FrameworkIndex::load(&path)
        .with_context(|| format!("loading framework chunks from {}", path.display()))?;
    let pending = index.pending().len();
    tracing::info!("{} chunks loaded, {} need embeddings", index.len(), pending);

    if args.dry_run {
        for id in index.pending() {
            tracing::info!("  pending: {}", id);
        }
        return Ok(());
    }

    let Some(api_key) = config.embeddings.api_key() else {
        bail!("{} is not set", config.embeddings.api_key_env);
    };
    let embedder = HuggingFaceEmbedder::with_api_key(&config.embeddings, Some(api_key))?;

    if pending > 0 {
        let (embedded, failed) = index.vectorize(&embedder).await;
        tracing::info!("Vectorization complete: {} embedded, {} failed", embedded, failed);
        index
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let query = embedder.embed(&args.query).await?;
    let matches = index.search(&query, args.threshold, args.top);
    tracing::info!("Sample search for '{}': {} matches", args.query, matches.len());
    for (rank, chunk) in matches.iter().enumerate() {
        let preview: String = chunk.content.chars().take(150).collect();
        tracing::info!(
            "{}. {} [{}] similarity {:.3}: {}...",
            rank + 1,
            chunk.id,
            chunk.category,
            chunk.similarity.unwrap_or_default(),
            preview
        );
    }

    Ok(())
}

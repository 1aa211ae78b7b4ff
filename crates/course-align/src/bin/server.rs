//! Course alignment server binary
//!
//! Run with: cargo run -p course-align --bin course-align-server

use clap::Parser;
use course_align::{config::AlignConfig, server::AlignServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "course-align-server", version, about = "Course framework alignment server")]
struct Args {
    /// TOML configuration file (defaults to $COURSE_ALIGN_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_align=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                       Course Align                        ║
║          Framework Alignment for Course Materials         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = AlignConfig::load(args.config.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Similarity floor: {}", config.classification.similarity_floor);
    tracing::info!("  - Framework file: {}", config.framework.chunks_path.display());
    tracing::info!("  - Documents: {}", config.storage.documents_dir.display());

    let server = AlignServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload-files     - Upload course files");
    println!("  POST /api/analyze-course   - Analyze a submission");
    println!("  GET  /api/submissions/:id  - Submission and latest analysis");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

//! HTTP server binary for pdf2quiz.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use common::QuizArgs;
use pdf2quiz::server::{self, AppState};
use pdf2quiz::QuizGenerator;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

/// Serve quiz generation over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz-server",
    version,
    about = "HTTP service: POST a PDF to /api/process-pdf, get quiz questions back"
)]
struct Cli {
    /// Port to listen on (all interfaces).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory with a static front-end, served for unmatched paths.
    #[arg(long, env = "PDF2QUIZ_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,

    #[command(flatten)]
    quiz: QuizArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    common::init_tracing("info,tower_http=info");

    let config = cli.quiz.builder().build().context("Invalid configuration")?;
    let generator = QuizGenerator::from_config(&config).context("Failed to set up the model")?;
    info!("Using {:?}", generator);

    let app = server::router(AppState::new(generator), cli.public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on port {}", cli.port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

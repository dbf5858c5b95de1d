//! CLI binary for pdf2quiz.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`,
//! reports progress on stdout and prints the quiz.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use common::QuizArgs;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2quiz::{generate_quiz, ProgressCallback, QuizProgressCallback};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const RULE_WIDTH: usize = 50;

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per stage and spins while the model is thinking.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl QuizProgressCallback for CliProgressCallback {
    fn on_start(&self, pdf_path: &Path) {
        println!("Processing PDF: {}", pdf_path.display());
    }

    fn on_pages_rendered(&self, page_count: usize) {
        println!("Converted {page_count} pages to images");
    }

    fn on_generation_start(&self, attachment_count: usize) {
        println!("Generating quiz questions...");

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("waiting for the model ({attachment_count} attachment(s))"));
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn on_complete(&self, _chars: usize) {
        self.stop_spinner();
    }

    fn on_error(&self, _error: &str) {
        self.stop_spinner();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Page images (default), Gemini 2.0 Flash
  pdf2quiz chapter3.pdf

  # Send the PDF itself instead of rendered pages
  pdf2quiz --mode document chapter3.pdf

  # Another vision provider via edgequake-llm
  pdf2quiz --provider openai --model gpt-4.1-mini chapter3.pdf

  # Machine-readable output
  pdf2quiz --json chapter3.pdf > quiz.json

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY          Gemini API key (GEMINI_API_KEY also accepted)
  PDF2QUIZ_MODE           images | document
  PDF2QUIZ_PROVIDER       Provider name (default: gemini)
  PDF2QUIZ_MODEL          Model ID (default: gemini-2.0-flash)
  PDF2QUIZ_RASTERIZER     pdftoppm | pdfium
  RUST_LOG                Override log filter

Variables may also be placed in a .env file in the working directory.

SETUP:
  1. Install poppler-utils (provides pdftoppm), or build with --features pdfium.
  2. export GOOGLE_API_KEY=...
  3. pdf2quiz document.pdf
"#;

/// Generate multiple-choice quiz questions from a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Generate multiple-choice quiz questions from a PDF using a vision LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file.
    input: String,

    #[command(flatten)]
    quiz: QuizArgs,

    /// Output structured JSON (quiz + stats) instead of text.
    #[arg(long, env = "PDF2QUIZ_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2QUIZ_VERBOSE")]
    verbose: bool,

    /// Print only the quiz.
    #[arg(short, long, env = "PDF2QUIZ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Progress lines already cover the stages; library INFO logs would
    // repeat them.
    let show_progress = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if show_progress || cli.quiet {
        "error"
    } else {
        "info"
    };
    common::init_tracing(filter);

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = cli.quiz.builder();
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = generate_quiz(&cli.input, &config)
        .await
        .context("Quiz generation failed")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else if cli.quiet {
        writeln!(handle, "{}", output.quiz_questions).context("Failed to write to stdout")?;
    } else {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(
            handle,
            "\nGenerated Quiz Questions:\n{rule}\n{}\n{rule}",
            output.quiz_questions
        )
        .context("Failed to write to stdout")?;
    }

    Ok(())
}

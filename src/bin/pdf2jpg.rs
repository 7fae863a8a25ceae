//! `pdf2jpg`: flatten every PDF in a folder into one tall JPEG per document.
//!
//! A thin shim over [`resume_vlm::flatten_folder`] that maps CLI flags to a
//! `FlattenConfig` and prints the batch summary.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use common::CliProgressCallback;
use resume_vlm::{flatten_folder, FlattenConfig, ProgressCallback};
use std::path::PathBuf;

const AFTER_HELP: &str = r#"EXAMPLES:
  pdf2jpg pdfs/ resumes/
  pdf2jpg pdfs/ resumes/ --dpi 300 --quality 90
  pdf2jpg pdfs/ resumes/ --json > flatten.json

PDFIUM:
  pdf2jpg loads the pdfium shared library at runtime. It looks in the working
  directory first, then on the system library path. Point it elsewhere with
  PDFIUM_LIB_PATH=/path/to/dir pdf2jpg ...
"#;

/// Flatten multi-page PDFs into single tall JPEG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpg",
    version,
    about = "Flatten every PDF in a folder into one tall JPEG per document",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing *.pdf files (not searched recursively).
    input_dir: PathBuf,

    /// Folder receiving <stem>.jpg images; created if missing.
    output_dir: PathBuf,

    /// Rendering DPI (36–600).
    #[arg(long, env = "PDF2JPG_DPI", default_value_t = resume_vlm::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2JPG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Cap on a rendered page's width and height in pixels.
    #[arg(long, env = "PDF2JPG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Directory holding the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Print the batch summary as JSON on stdout.
    #[arg(long, env = "PDF2JPG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    common::init_tracing(cli.verbose, cli.quiet, show_progress);

    let mut builder = FlattenConfig::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir)
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality);
    if let Some(px) = cli.max_pixels {
        builder = builder.max_page_pixels(px);
    }
    if let Some(ref dir) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir);
    }
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new("PDFs", "Flattening");
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let summary = flatten_folder(&config).await.with_context(|| {
        format!(
            "Failed to flatten PDFs from {} into {}",
            cli.input_dir.display(),
            cli.output_dir.display()
        )
    })?;

    common::report(&summary, cli.json, cli.quiet, show_progress)
}

//! `resume2csv`: read résumé images with a Vision LLM and append one CSV row each.
//!
//! A thin shim over [`resume_vlm::ResumeExtractor`] that maps CLI flags to an
//! `ExtractConfig` and prints the batch summary.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use common::CliProgressCallback;
use resume_vlm::config::{DEFAULT_MODEL, DEFAULT_PROVIDER};
use resume_vlm::{ExtractConfig, ProgressCallback, ResumeExtractor};
use std::path::PathBuf;

const AFTER_HELP: &str = r#"EXAMPLES:
  resume2csv resumes/
  resume2csv resumes/ -o out/candidates.csv --ext .png
  resume2csv resumes/ --provider openai --model gpt-4.1-mini

ENVIRONMENT:
  GEMINI_API_KEY    Key for the default gemini provider.
  GOOGLE_API_KEY    Accepted as GEMINI_API_KEY when that one is unset.
  A .env file in the working directory is loaded before flags are parsed.

OUTPUT:
  Rows are appended. The header row is written only when the CSV is new or
  empty. Files that fail are logged and left out of the CSV.
"#;

/// Extract structured résumé fields from images into a CSV file.
#[derive(Parser, Debug)]
#[command(
    name = "resume2csv",
    version,
    about = "Extract structured résumé fields from images into a CSV file using Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing résumé images (not searched recursively).
    folder: PathBuf,

    /// CSV file rows are appended to.
    #[arg(short, long, env = "RESUME2CSV_OUTPUT", default_value = "output/resumes.csv")]
    output: PathBuf,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// LLM model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Image suffixes to pick up, matched case-sensitively. Repeatable or comma-separated.
    #[arg(long = "ext", env = "RESUME2CSV_EXT", value_delimiter = ',',
          default_values_t = [".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()])]
    extensions: Vec<String>,

    /// Path to a text file containing a custom extraction prompt.
    #[arg(long, env = "RESUME2CSV_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per résumé.
    #[arg(long, env = "RESUME2CSV_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "RESUME2CSV_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Retries per image on LLM failure.
    #[arg(long, env = "RESUME2CSV_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-image LLM call timeout in seconds. Unlimited when unset.
    #[arg(long, env = "RESUME2CSV_API_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    api_timeout: Option<u64>,

    /// Print the batch summary as JSON on stdout.
    #[arg(long, env = "RESUME2CSV_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RESUME2CSV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME2CSV_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // The gemini provider reads GEMINI_API_KEY; accept GOOGLE_API_KEY too.
    // Set before the runtime spawns any threads.
    if std::env::var_os("GEMINI_API_KEY").is_none() {
        if let Some(key) = std::env::var_os("GOOGLE_API_KEY") {
            std::env::set_var("GEMINI_API_KEY", key);
        }
    }

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    common::init_tracing(cli.verbose, cli.quiet, show_progress);

    let mut builder = ExtractConfig::builder()
        .csv_path(&cli.output)
        .provider_name(&cli.provider)
        .model(&cli.model)
        .extensions(cli.extensions.iter().cloned())
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries);
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt from {}", path.display()))?;
        builder = builder.system_prompt(prompt);
    }
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new("résumés", "Extracting");
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let mut extractor = ResumeExtractor::new(config).context("Failed to set up the LLM provider")?;
    let summary = extractor
        .process_resume_folder(&cli.folder)
        .await
        .with_context(|| format!("Failed to process résumés in {}", cli.folder.display()))?;

    if !cli.json && !cli.quiet {
        eprintln!("Rows appended to {}", extractor.csv_path().display());
    }
    common::report(&summary, cli.json, cli.quiet, show_progress)
}

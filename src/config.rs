//! Configuration types for the two batch pipelines.
//!
//! [`FlattenConfig`] drives the PDF Flattener and [`ExtractConfig`] drives the
//! Resume Extractor. Both are built through a builder that clamps numeric
//! knobs and validates the rest in `build()`. Nothing here reads the process
//! environment: the binaries map flags and env vars onto the builders, and
//! the library receives the finished struct.

use crate::error::ResumeError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default rasterisation resolution for résumé pages.
pub const DEFAULT_DPI: u32 = 200;

/// Default provider and model for résumé extraction.
pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

// ── Flattener ────────────────────────────────────────────────────────────

/// Configuration for flattening a directory of PDFs into JPEGs.
///
/// # Example
/// ```rust
/// use resume_vlm::FlattenConfig;
///
/// let config = FlattenConfig::builder()
///     .input_dir("pdfs")
///     .output_dir("resumes")
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct FlattenConfig {
    /// Directory scanned (non-recursively) for `*.pdf`.
    pub input_dir: PathBuf,

    /// Directory receiving `<stem>.jpg`. Created if absent.
    pub output_dir: PathBuf,

    /// Rendering DPI. Range: 36–600. Default: 200.
    pub dpi: u32,

    /// Optional cap on either edge of a rendered page, in pixels.
    ///
    /// Every page of a document is held in memory until the merge, so a
    /// poster-sized page at 200 DPI can be very large. `None` renders at the
    /// exact DPI.
    pub max_page_pixels: Option<u32>,

    /// JPEG quality for the merged image. Range: 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Directory containing the pdfium shared library.
    /// If None, the working directory and then the system library path are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("resumes"),
            dpi: DEFAULT_DPI,
            max_page_pixels: None,
            jpeg_quality: 75,
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FlattenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("dpi", &self.dpi)
            .field("max_page_pixels", &self.max_page_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl FlattenConfig {
    /// Create a new builder for `FlattenConfig`.
    pub fn builder() -> FlattenConfigBuilder {
        FlattenConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FlattenConfig`].
#[derive(Debug)]
pub struct FlattenConfigBuilder {
    config: FlattenConfig,
}

impl FlattenConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(36, 600);
        self
    }

    pub fn max_page_pixels(mut self, px: u32) -> Self {
        self.config.max_page_pixels = Some(px.max(100));
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FlattenConfig, ResumeError> {
        let c = &self.config;
        if c.dpi < 36 || c.dpi > 600 {
            return Err(ResumeError::InvalidConfig(format!(
                "DPI must be 36–600, got {}",
                c.dpi
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(ResumeError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Extractor ────────────────────────────────────────────────────────────

/// Configuration for extracting résumé fields from a folder of images.
///
/// # Example
/// ```rust
/// use resume_vlm::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .csv_path("out/resumes.csv")
///     .extensions([".png"])
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// CSV file rows are appended to. Parent directories are created.
    /// Default: `output/resumes.csv`.
    pub csv_path: PathBuf,

    /// LLM provider name passed to `ProviderFactory`. Default: "gemini".
    pub provider_name: String,

    /// Model identifier. Default: "gemini-1.5-flash".
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens per reply. Default: 4096.
    ///
    /// A dense two-page résumé rendered as JSON rarely exceeds 1 500 tokens;
    /// the headroom avoids truncating the closing brace.
    pub max_tokens: usize,

    /// Retries per image after a failed model call. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: None (wait indefinitely).
    pub api_timeout_secs: Option<u64>,

    /// File-name suffixes to pick up, matched case-sensitively.
    /// Default: `.jpg`, `.jpeg`, `.png`.
    pub extensions: Vec<String>,

    /// Custom extraction prompt. If None, uses [`crate::prompts::RESUME_EXTRACTION_PROMPT`].
    pub system_prompt: Option<String>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("output/resumes.csv"),
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: None,
            extensions: vec![".jpg".into(), ".jpeg".into(), ".png".into()],
            system_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("csv_path", &self.csv_path)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.csv_path = path.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ResumeError> {
        let c = &self.config;
        if c.csv_path.as_os_str().is_empty() {
            return Err(ResumeError::InvalidConfig("CSV path must not be empty".into()));
        }
        if c.extensions.is_empty() {
            return Err(ResumeError::InvalidConfig(
                "At least one image extension is required".into(),
            ));
        }
        if c.extensions.iter().any(|e| e.is_empty()) {
            return Err(ResumeError::InvalidConfig(
                "Image extensions must not be empty strings".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ResumeError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(ResumeError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

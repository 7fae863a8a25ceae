//! Resume Extractor: résumé images in, CSV rows out.
//!
//! A [`ResumeExtractor`] owns its model client and its open CSV file. Each
//! image goes through the same steps:
//!
//! ```text
//! image ──▶ encode ──▶ model ──▶ strip fences ──▶ JSON ──▶ phone cleanup ──▶ CSV row
//! ```
//!
//! Images are processed strictly one after another. A failure on one image
//! (unreadable file, model error, reply that is not JSON) is recorded in the
//! [`BatchSummary`] and the batch moves on; nothing is retried unless
//! `max_retries` is set.

use crate::config::ExtractConfig;
use crate::csv_sink::CsvSink;
use crate::error::ResumeError;
use crate::flatten::display_name;
use crate::output::{BatchSummary, ParsedResume, ProcessedFile, ResumeRecord};
use crate::pipeline::llm::{ProviderModel, VisionModel};
use crate::pipeline::{encode, input, postprocess};
use crate::prompts::RESUME_EXTRACTION_PROMPT;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parses résumé images with a vision model and appends rows to a CSV file.
pub struct ResumeExtractor<M = ProviderModel> {
    model: M,
    sink: CsvSink,
    config: ExtractConfig,
}

impl ResumeExtractor<ProviderModel> {
    /// Connect to the configured provider and open the CSV file.
    ///
    /// # Example
    /// ```rust,no_run
    /// use resume_vlm::{ExtractConfig, ResumeExtractor};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ExtractConfig::builder().csv_path("csv_file.csv").build()?;
    /// let mut extractor = ResumeExtractor::new(config)?;
    /// let summary = extractor.process_resume_folder("resumes").await?;
    /// println!("{}/{} parsed", summary.successful, summary.total);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ExtractConfig) -> Result<Self, ResumeError> {
        let model = ProviderModel::from_config(&config)?;
        Self::with_model(model, config)
    }
}

impl<M: VisionModel> ResumeExtractor<M> {
    /// Use an explicit model client, e.g. a test double.
    pub fn with_model(model: M, config: ExtractConfig) -> Result<Self, ResumeError> {
        let sink = CsvSink::open(&config.csv_path)?;
        debug!("CSV output: {}", sink.path().display());
        Ok(Self {
            model,
            sink,
            config,
        })
    }

    pub fn csv_path(&self) -> &Path {
        self.sink.path()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Send one image to the model and decode its reply.
    ///
    /// Never fails at the call site: open, network and decode errors are
    /// returned inside [`ParsedResume::outcome`].
    pub async fn parse_resume_from_image(&self, image_path: impl AsRef<Path>) -> ParsedResume {
        let image_path = image_path.as_ref();
        let prompt = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(RESUME_EXTRACTION_PROMPT);

        let outcome = match encode::load_image(image_path) {
            Ok(image) => match self.model.read_image(prompt, image).await {
                Ok(reply) => postprocess::decode_resume(&reply),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        ParsedResume {
            filename: display_name(image_path),
            outcome,
        }
    }

    /// Append one record as a CSV row. Missing fields are already empty strings.
    pub fn append_parsed_resume(
        &mut self,
        filename: &str,
        record: &ResumeRecord,
    ) -> Result<(), ResumeError> {
        self.sink.append(filename, record)
    }

    /// Parse every image in `folder` whose name ends with one of the
    /// configured extensions, appending a row for each success.
    ///
    /// # Errors
    /// Only fatal conditions: the folder cannot be listed or the CSV file
    /// cannot be written.
    pub async fn process_resume_folder(
        &mut self,
        folder: impl AsRef<Path>,
    ) -> Result<BatchSummary, ResumeError> {
        let extensions = self.config.extensions.clone();
        self.process_resume_folder_with(folder, extensions.as_slice()).await
    }

    /// Like [`process_resume_folder`](Self::process_resume_folder), but with
    /// an explicit suffix list for this call, e.g. `&[".png"]`. Suffixes are
    /// matched case-sensitively and a file matching two of them is processed
    /// twice.
    pub async fn process_resume_folder_with<S: AsRef<str>>(
        &mut self,
        folder: impl AsRef<Path>,
        extensions: &[S],
    ) -> Result<BatchSummary, ResumeError> {
        let batch_start = Instant::now();
        let image_files = input::list_with_suffixes(folder.as_ref(), extensions)?;
        let total = image_files.len();
        let mut summary = BatchSummary::with_total(total);

        info!("Found {} resume images to process...", total);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        for (idx, image_path) in image_files.into_iter().enumerate() {
            let index = idx + 1;
            let name = display_name(&image_path);
            info!("Processing {}/{}: {}", index, total, name);
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_item_start(index, total, &name);
            }

            let parsed = self.parse_resume_from_image(&image_path).await;
            match parsed.outcome {
                Ok(record) => {
                    self.append_parsed_resume(&parsed.filename, &record)?;
                    let csv_path = self.sink.path().to_path_buf();
                    info!("✓ Added to CSV → {}", csv_path.display());
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_item_complete(index, total, &name, &csv_path.display().to_string());
                    }
                    let candidate = if record.name.is_empty() {
                        "Unknown".to_string()
                    } else {
                        record.name
                    };
                    summary.record_success(ProcessedFile {
                        source: image_path,
                        output: csv_path,
                        name: Some(candidate),
                    });
                }
                Err(e) => {
                    warn!("✗ Failed: {}", e);
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_item_error(index, total, &name, &e.to_string());
                    }
                    summary.record_failure(image_path, e);
                }
            }
        }

        info!(
            "Parsed {}/{} resumes in {}ms",
            summary.successful,
            total,
            batch_start.elapsed().as_millis()
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(total, summary.successful);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ItemError};
    use edgequake_llm::ImageData;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    /// Replies with a fixed string and remembers the prompts it was given.
    struct FixedModel {
        reply: Result<String, ItemError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl VisionModel for FixedModel {
        async fn read_image(&self, prompt: &str, _image: ImageData) -> Result<String, ItemError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn config_in(dir: &Path) -> ExtractConfig {
        ExtractConfig::builder()
            .csv_path(dir.join("out/resumes.csv"))
            .build()
            .unwrap()
    }

    #[test]
    fn construction_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let extractor =
            ResumeExtractor::with_model(FixedModel::replying("{}"), config_in(dir.path())).unwrap();
        let text = std::fs::read_to_string(extractor.csv_path()).unwrap();
        assert!(text.starts_with("filename,name,email,number,"));
    }

    #[tokio::test]
    async fn parse_success_normalises_number() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "asha.png");
        let model = FixedModel::replying(
            "```json\n{\"name\":\"Asha\",\"number\":\"+91-98765 43210\"}\n```",
        );
        let extractor = ResumeExtractor::with_model(model, config_in(dir.path())).unwrap();

        let parsed = extractor.parse_resume_from_image(&image).await;
        assert!(parsed.is_success());
        assert_eq!(parsed.filename, "asha.png");
        let record = parsed.record().unwrap();
        assert_eq!(record.name, "Asha");
        assert_eq!(record.number, "9876543210");
    }

    #[tokio::test]
    async fn parse_uses_prompt_override() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "a.png");
        let config = ExtractConfig::builder()
            .csv_path(dir.path().join("r.csv"))
            .system_prompt("Only the name, as JSON.")
            .build()
            .unwrap();
        let extractor =
            ResumeExtractor::with_model(FixedModel::replying("{\"name\":\"A\"}"), config).unwrap();

        extractor.parse_resume_from_image(&image).await;
        assert_eq!(
            *extractor.model().prompts.lock().unwrap(),
            vec!["Only the name, as JSON.".to_string()]
        );
    }

    #[tokio::test]
    async fn parse_model_error_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "a.png");
        let model = FixedModel {
            reply: Err(ItemError::LlmFailed {
                detail: "quota exceeded".into(),
            }),
            prompts: Mutex::new(Vec::new()),
        };
        let extractor = ResumeExtractor::with_model(model, config_in(dir.path())).unwrap();

        let parsed = extractor.parse_resume_from_image(&image).await;
        let err = parsed.error().unwrap();
        assert_eq!(err.kind(), ErrorKind::ExternalService);
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn unreadable_image_never_reaches_model() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("scan.jpg");
        std::fs::write(&bogus, b"\x00\x01not-a-jpeg").unwrap();
        let extractor =
            ResumeExtractor::with_model(FixedModel::replying("{}"), config_in(dir.path())).unwrap();

        let parsed = extractor.parse_resume_from_image(&bogus).await;
        assert!(matches!(
            parsed.outcome,
            Err(ItemError::ImageOpenFailed { .. })
        ));
        assert!(extractor.model().prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_missing_skills_writes_nine_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor =
            ResumeExtractor::with_model(FixedModel::replying("{}"), config_in(dir.path())).unwrap();

        let record = postprocess::decode_resume(
            r#"{"name":"A","email":"a@x.io","number":"9876543210","education":"BSc",
                "work_experience":"Intern","projects":"P","certifications":"C"}"#,
        )
        .unwrap();
        extractor.append_parsed_resume("a.png", &record).unwrap();

        let mut reader = csv::Reader::from_path(extractor.csv_path()).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 9);
        assert_eq!(&row[0], "a.png");
        assert_eq!(&row[7], "C");
        assert_eq!(&row[8], "");
    }

    #[tokio::test]
    async fn empty_folder_gives_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor =
            ResumeExtractor::with_model(FixedModel::replying("{}"), config_in(dir.path())).unwrap();
        let summary = extractor
            .process_resume_folder(dir.path().join("missing"))
            .await
            .unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary.failed_files.is_empty());
    }

    #[tokio::test]
    async fn blank_name_reported_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("resumes");
        std::fs::create_dir(&images).unwrap();
        write_png(&images, "anon.png");
        let mut extractor = ResumeExtractor::with_model(
            FixedModel::replying("{\"email\":\"x@y.z\"}"),
            config_in(dir.path()),
        )
        .unwrap();

        let summary = extractor.process_resume_folder(&images).await.unwrap();
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.processed_files[0].name.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn present_but_empty_name_is_unknown_in_summary_only() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("resumes");
        std::fs::create_dir(&images).unwrap();
        write_png(&images, "blank.png");
        let mut extractor = ResumeExtractor::with_model(
            FixedModel::replying("{\"name\":\"\",\"email\":\"x@y.z\"}"),
            config_in(dir.path()),
        )
        .unwrap();

        let summary = extractor.process_resume_folder(&images).await.unwrap();
        assert_eq!(summary.processed_files[0].name.as_deref(), Some("Unknown"));

        let mut reader = csv::Reader::from_path(extractor.csv_path()).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "");
        assert_eq!(&row[2], "x@y.z");
    }

    #[tokio::test]
    async fn per_call_extensions_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("resumes");
        std::fs::create_dir(&images).unwrap();
        write_png(&images, "a.png");
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
            .save(images.join("b.jpg"))
            .unwrap();
        let mut extractor = ResumeExtractor::with_model(
            FixedModel::replying("{\"name\":\"A\"}"),
            config_in(dir.path()),
        )
        .unwrap();

        let summary = extractor
            .process_resume_folder_with(&images, &[".png"])
            .await
            .unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.processed_files[0].source, images.join("a.png"));

        let summary = extractor.process_resume_folder(&images).await.unwrap();
        assert_eq!(summary.total, 2);
    }
}

//! VLM interaction: send one résumé image plus the extraction prompt, get text back.
//!
//! [`VisionModel`] is the seam between the extractor and the network. The
//! production implementation, [`ProviderModel`], drives an `edgequake-llm`
//! provider; tests substitute a scripted model so the whole extractor runs
//! without an API key.
//!
//! By default a call is made exactly once with no deadline. Retries (with
//! exponential backoff, `retry_backoff_ms * 2^attempt`) and a per-call timeout
//! are opt-in through [`ExtractConfig`].

use crate::config::ExtractConfig;
use crate::error::{ItemError, ResumeError};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// A multimodal model that answers a prompt about an image.
pub trait VisionModel: Send + Sync {
    /// Return the model's raw text reply.
    fn read_image(
        &self,
        prompt: &str,
        image: ImageData,
    ) -> impl Future<Output = Result<String, ItemError>> + Send;
}

/// [`VisionModel`] backed by an `edgequake-llm` provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
    timeout_secs: Option<u64>,
}

impl ProviderModel {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ExtractConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            timeout_secs: config.api_timeout_secs,
        }
    }

    /// Resolve the provider named in `config` and wrap it.
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ResumeError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    async fn call_once(&self, messages: &[ChatMessage]) -> Result<String, ItemError> {
        let call = self.provider.chat(messages, Some(&self.options));
        let response = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), call)
                .await
                .map_err(|_| ItemError::Timeout { secs })?,
            None => call.await,
        }
        .map_err(|e| ItemError::LlmFailed {
            detail: e.to_string(),
        })?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

impl VisionModel for ProviderModel {
    /// ## Message Layout
    ///
    /// 1. **System message** — the extraction prompt (or the configured override)
    /// 2. **User message** — the résumé PNG as an image attachment, empty text
    async fn read_image(&self, prompt: &str, image: ImageData) -> Result<String, ItemError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(prompt),
            ChatMessage::user_with_images("", vec![image]),
        ];

        let mut attempt = 0u32;
        loop {
            match self.call_once(&messages).await {
                Ok(text) => {
                    debug!("Model replied in {:?}", start.elapsed());
                    return Ok(text);
                }
                Err(e) if attempt < self.max_retries => {
                    let backoff = self.retry_backoff_ms.saturating_mul(2u64.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        "Attempt {} failed — {}; retry {}/{} after {}ms",
                        attempt, e, attempt, self.max_retries, backoff
                    );
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Use the pre-built provider if there is one, otherwise ask
/// [`ProviderFactory`] for `provider_name` / `model`. The factory reads the
/// provider's API key (`GEMINI_API_KEY` for Gemini) from the environment.
pub fn resolve_provider(config: &ExtractConfig) -> Result<Arc<dyn LLMProvider>, ResumeError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    ProviderFactory::create_llm_provider(&config.provider_name, &config.model).map_err(|e| {
        ResumeError::ProviderNotConfigured {
            provider: config.provider_name.clone(),
            hint: format!(
                "{e}\nSet GEMINI_API_KEY (GOOGLE_API_KEY in a .env file is also accepted \
                 by resume2csv) or choose another provider with --provider."
            ),
        }
    })
}

/// Build `CompletionOptions` from the extraction config.
fn build_options(config: &ExtractConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edgequake_llm::{LLMResponse, LlmError};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails its first `failures` calls, optionally stalling before each reply.
    struct StubProvider {
        failures: AtomicU32,
        calls: AtomicU32,
        delay: Option<Duration>,
    }

    impl StubProvider {
        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                delay: None,
            })
        }

        fn stalling(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicU32::new(0),
                calls: AtomicU32::new(0),
                delay: Some(delay),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(LlmError::NetworkError("connection reset".into()));
            }
            Ok(LLMResponse::new(r#"{"name": "A"}"#, "stub-model"))
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    fn image() -> ImageData {
        ImageData::new("", "image/png")
    }

    fn retrying(max_retries: u32) -> ExtractConfig {
        ExtractConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(500)
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_doubling_backoff_then_succeeds() {
        let stub = StubProvider::failing(2);
        let model = ProviderModel::new(stub.clone(), &retrying(2));

        let start = tokio::time::Instant::now();
        let reply = model.read_image("prompt", image()).await.unwrap();

        assert_eq!(reply, r#"{"name": "A"}"#);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
        // 500ms before the second call, 1000ms before the third.
        let waited = start.elapsed();
        assert!(
            waited >= Duration::from_millis(1500) && waited < Duration::from_millis(1600),
            "waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let stub = StubProvider::failing(5);
        let model = ProviderModel::new(stub.clone(), &retrying(2));

        let err = model.read_image("prompt", image()).await.unwrap_err();

        assert!(
            matches!(err, ItemError::LlmFailed { ref detail } if detail.contains("connection reset")),
            "{err:?}"
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn no_retry_by_default() {
        let stub = StubProvider::failing(1);
        let model = ProviderModel::new(stub.clone(), &ExtractConfig::default());

        assert!(model.read_image("prompt", image()).await.is_err());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let stub = StubProvider::stalling(Duration::from_secs(30));
        let config = ExtractConfig::builder().api_timeout_secs(2).build().unwrap();
        let model = ProviderModel::new(stub.clone(), &config);

        let err = model.read_image("prompt", image()).await.unwrap_err();

        assert!(matches!(err, ItemError::Timeout { secs: 2 }), "{err:?}");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pre_built_provider_wins_over_factory() {
        let stub: Arc<dyn LLMProvider> = StubProvider::failing(0);
        let config = ExtractConfig::builder()
            .provider(stub)
            .provider_name("no-such-provider")
            .build()
            .unwrap();

        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "stub");
    }

    #[test]
    fn build_options_defaults() {
        let config = ExtractConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn build_options_follow_config() {
        let config = ExtractConfig::builder()
            .temperature(0.0)
            .max_tokens(1024)
            .build()
            .unwrap();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(1024));
    }
}

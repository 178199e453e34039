//! Model calls: provider resolution, message building, timeout and retries.
//!
//! Retries use exponential backoff (`retry_backoff_ms * 2^(attempt-1)`): with
//! the defaults the waits are 500 ms, 1 s, 2 s. Each attempt is bounded by
//! `api_timeout_secs`.

use crate::config::SuiteConfig;
use crate::error::{AssistError, DocSuiteError};
use crate::prompts::SYSTEM_PROMPT;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Model used with an OpenAI key when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Model used with an Anthropic key when none is configured.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Text of a successful completion plus token accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub retries: u32,
}

/// A configured provider together with the call options.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &"<dyn LLMProvider>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ModelClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SuiteConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    /// Resolve a provider from `config` and wrap it.
    pub fn from_config(config: &SuiteConfig) -> Result<Self, DocSuiteError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    /// Text-only completion of `prompt`.
    pub async fn complete(&self, prompt: &str) -> Result<Completion, AssistError> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        self.chat_with_retries(&messages).await
    }

    /// Completion of `prompt` about one attached image.
    pub async fn complete_with_image(
        &self,
        prompt: &str,
        image: ImageData,
    ) -> Result<Completion, AssistError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user_with_images(prompt, vec![image]),
        ];
        self.chat_with_retries(&messages).await
    }

    async fn chat_with_retries(&self, messages: &[ChatMessage]) -> Result<Completion, AssistError> {
        let start = Instant::now();
        let options = self.options();
        let limit = Duration::from_secs(self.api_timeout_secs);
        let mut last_err: Option<AssistError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(self.retry_backoff_ms, attempt);
                warn!("Retry {}/{} after {}ms", attempt, self.max_retries, backoff);
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(limit, self.provider.chat(messages, Some(&options))).await {
                Ok(Ok(response)) => {
                    debug!(
                        "{} input tokens, {} output tokens, {:?}",
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    return Ok(Completion {
                        content: response.content,
                        input_tokens: response.prompt_tokens,
                        output_tokens: response.completion_tokens,
                        retries: attempt,
                    });
                }
                Ok(Err(e)) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(AssistError::LlmFailed {
                        retries: attempt,
                        detail: e.to_string(),
                    });
                }
                Err(_) => {
                    warn!("Attempt {} timed out after {}s", attempt + 1, self.api_timeout_secs);
                    last_err = Some(AssistError::Timeout {
                        secs: self.api_timeout_secs,
                    });
                }
            }
        }

        Err(match last_err {
            Some(AssistError::LlmFailed { detail, .. }) => AssistError::LlmFailed {
                retries: self.max_retries,
                detail,
            },
            Some(other) => other,
            None => AssistError::LlmFailed {
                retries: self.max_retries,
                detail: "Unknown error".into(),
            },
        })
    }

    fn options(&self) -> CompletionOptions {
        build_options(self.temperature, self.max_tokens)
    }
}

/// Wait before retry number `attempt` (1-based), saturating instead of
/// overflowing for large retry counts.
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DocSuiteError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocSuiteError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn env_set(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. `config.provider`, used as-is
/// 2. `config.provider_name` with `config.model`
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` when both are set
/// 4. `ANTHROPIC_API_KEY`, then `OPENAI_API_KEY`
/// 5. `ProviderFactory::from_env()`
pub fn resolve_provider(config: &SuiteConfig) -> Result<Arc<dyn LLMProvider>, DocSuiteError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(match name.as_str() {
            "anthropic" => DEFAULT_ANTHROPIC_MODEL,
            _ => DEFAULT_OPENAI_MODEL,
        });
        return create_provider(name, model);
    }

    if let (Some(prov), Some(model)) = (env_set("EDGEQUAKE_LLM_PROVIDER"), env_set("EDGEQUAKE_MODEL")) {
        return create_provider(&prov, &model);
    }

    if env_set("ANTHROPIC_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(DEFAULT_ANTHROPIC_MODEL);
        return create_provider("anthropic", model);
    }
    if env_set("OPENAI_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocSuiteError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

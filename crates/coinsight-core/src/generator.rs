use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::fetch_json;
use crate::data_source::{SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::ProviderId;

/// Local completion server started by `llama-server` on its default port.
pub const DEFAULT_GENERATOR_URL: &str = "http://127.0.0.1:8080";

/// Output limit for answers to user questions.
pub const INSIGHT_MAX_TOKENS: u32 = 300;

/// Output limit for news digests.
pub const SUMMARY_MAX_TOKENS: u32 = 200;

/// Local models are slow on CPU; completions get a longer timeout than data
/// requests.
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 120_000;

/// Text-generation contract: prompt in, completion text out.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str, max_tokens: u32) -> SourceFuture<'a, String>;
}

/// Client for an OpenAI-compatible `/v1/completions` endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl CompletionClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_GENERATOR_URL),
            auth: HttpAuth::None,
            timeout_ms: DEFAULT_GENERATION_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.auth = match api_key {
            Some(key) if !key.trim().is_empty() => HttpAuth::BearerToken(key),
            _ => HttpAuth::None,
        };
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, SourceError> {
        let body = serde_json::to_string(&CompletionRequest { prompt, max_tokens })
            .map_err(|e| SourceError::internal(format!("failed to encode completion request: {e}")))?;
        let request = HttpRequest::post(format!("{}/v1/completions", self.base_url))
            .with_json_body(body)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response: CompletionResponse =
            fetch_json(self.http_client.as_ref(), ProviderId::Generator, request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_owned())
            .ok_or_else(|| SourceError::upstream_unavailable("generator returned no choices"))
    }
}

impl TextGenerator for CompletionClient {
    fn generate<'a>(&'a self, prompt: &'a str, max_tokens: u32) -> SourceFuture<'a, String> {
        Box::pin(self.complete(prompt, max_tokens))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

use crate::types::{Result, SummarizerConfig, SummaryResult, UnavailableReason};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Trait for services that turn a text body into a short summary.
///
/// Implementations never fail: every outcome, including transport errors,
/// comes back as a [`SummaryResult`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Get the name of this adapter
    fn adapter_name(&self) -> String;

    /// Summarize `text`, authorizing with `credential`.
    ///
    /// A missing or blank credential yields
    /// `Unavailable(MissingCredential)` without touching the network.
    async fn summarize(&self, text: &str, credential: Option<&str>) -> SummaryResult;
}

/// Returns the usable credential, or `None` if it is absent or blank.
pub fn usable_credential(credential: Option<&str>) -> Option<&str> {
    credential.map(str::trim).filter(|c| !c.is_empty())
}

/// Maps extracted completion text onto a result; blank text is `Empty`.
pub fn classify_completion(text: String) -> SummaryResult {
    if text.trim().is_empty() {
        SummaryResult::Unavailable(UnavailableReason::Empty)
    } else {
        SummaryResult::Success(text)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for a chat-completion style endpoint (`{api_base}/chat/completions`)
pub struct ChatCompletionSummarizer {
    client: Client,
    config: SummarizerConfig,
    endpoint: String,
}

impl ChatCompletionSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request_completion(&self, text: &str, credential: &str) -> SummaryResult {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return SummaryResult::upstream_failure("timeout"),
            Err(e) => return SummaryResult::upstream_failure(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return SummaryResult::upstream_failure(format!("HTTP {}: {}", status.as_u16(), snippet));
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => return SummaryResult::upstream_failure(format!("invalid response: {}", e)),
        };

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        classify_completion(text)
    }
}

#[async_trait]
impl Summarizer for ChatCompletionSummarizer {
    fn adapter_name(&self) -> String {
        format!("Chat completion ({})", self.config.model)
    }

    async fn summarize(&self, text: &str, credential: Option<&str>) -> SummaryResult {
        let Some(credential) = usable_credential(credential) else {
            debug!("No credential supplied, skipping summarization request");
            return SummaryResult::Unavailable(UnavailableReason::MissingCredential);
        };

        debug!("Requesting summary from {} ({} chars)", self.endpoint, text.chars().count());
        let result = self.request_completion(text, credential).await;

        match &result {
            SummaryResult::Success(summary) => info!("Received summary ({} chars)", summary.chars().count()),
            SummaryResult::Unavailable(reason) => warn!("Summary unavailable: {}", reason),
        }
        result
    }
}

/// Scripted summarizer for development and testing
pub struct MockSummarizer {
    reply: SummaryResult,
    response_delay_ms: u64,
    calls: AtomicUsize,
}

impl MockSummarizer {
    /// Answers every authorized call with `text`; blank text classifies as `Empty`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: classify_completion(text.into()),
            response_delay_ms: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            reply: SummaryResult::upstream_failure(detail),
            response_delay_ms: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }

    /// Number of calls that got past the credential gate
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn adapter_name(&self) -> String {
        "Mock summarizer".to_string()
    }

    async fn summarize(&self, _text: &str, credential: Option<&str>) -> SummaryResult {
        if usable_credential(credential).is_none() {
            return SummaryResult::Unavailable(UnavailableReason::MissingCredential);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }
        self.reply.clone()
    }
}

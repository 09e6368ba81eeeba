use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One feed entry as the parsing layer exposes it, before normalization.
///
/// Every field is optional; the normalizer decides which absences are fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub link: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Canonical record for one feed entry.
///
/// Built by the normalizer and never mutated. Derived data such as generated summaries
/// lives outside the record, keyed by [`Paper::link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    title: String,
    authors: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: String,
    published_at: String,
    link: String,
    categories: BTreeSet<String>,
}

impl Paper {
    pub(crate) fn new(
        title: String,
        authors: Vec<String>,
        abstract_text: String,
        published_at: String,
        link: String,
        categories: BTreeSet<String>,
    ) -> Self {
        Self {
            title,
            authors,
            abstract_text,
            published_at,
            link,
            categories,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Raw feed timestamp, empty when the feed supplied none.
    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    /// Stable identifier of the record within one fetch.
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Parses the raw timestamp as RFC 2822, then RFC 3339.
    pub fn published_date(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.published_at.trim();
        if raw.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
    }
}

/// Outcome of one summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SummaryResult {
    Success(String),
    Unavailable(UnavailableReason),
}

impl SummaryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SummaryResult::Success(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryResult::Success(text) => Some(text),
            SummaryResult::Unavailable(_) => None,
        }
    }

    pub fn upstream_failure(detail: impl Into<String>) -> Self {
        SummaryResult::Unavailable(UnavailableReason::UpstreamFailure(detail.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    MissingCredential,
    UpstreamFailure(String),
    Empty,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::MissingCredential => write!(f, "no API credential configured"),
            UnavailableReason::UpstreamFailure(detail) => write!(f, "summarization failed: {}", detail),
            UnavailableReason::Empty => write!(f, "summarization returned no text"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Extra attempts after the first one; only transport errors and 5xx are retried.
    pub max_retries: u32,
    /// Initial backoff interval, doubled per retry.
    pub retry_delay_ms: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Paper-Digest/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 1_000,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a research assistant. Translate the paper abstract \
provided by the user into Chinese and distill it into a concise summary that highlights exactly \
three key points.";

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_base: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.3,
            max_tokens: 500,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on summarization calls in flight at once.
    pub concurrency: usize,
    pub summary_timeout_seconds: u64,
    pub cache_summaries: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            summary_timeout_seconds: 60,
            cache_summaries: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed feed document: {0}")]
    Malformed(String),

    #[error("feed is empty")]
    Empty,

    #[error("feed size exceeds limit: {size_mb}MB")]
    TooLarge { size_mb: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Title,
    Abstract,
    Link,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::Title => "title",
            RequiredField::Abstract => "abstract",
            RequiredField::Link => "link",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum NormalizeError {
    #[error("entry is missing required field `{0}`")]
    MissingField(RequiredField),
}

/// An entry the normalizer rejected, with its position in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub index: usize,
    pub error: NormalizeError,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;

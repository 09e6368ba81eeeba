use crate::cache::{CachedSummary, CredentialFingerprint, SummaryCache};
use crate::filter::filter_papers;
use crate::llm_adapter::{usable_credential, Summarizer};
use crate::normalizer::normalize_all;
use crate::traits::FeedSource;
use crate::types::{
    DigestError, FetchError, Paper, PipelineConfig, Result, SkippedEntry, SummaryResult,
    UnavailableReason,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Normalized result of one fetch.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub papers: Vec<Paper>,
    pub skipped: Vec<SkippedEntry>,
    pub error: Option<FetchError>,
}

impl FeedSnapshot {
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Per-invocation inputs supplied by the surrounding application.
#[derive(Clone, Default)]
pub struct DigestRequest {
    pub query: Option<String>,
    pub credential: Option<String>,
    pub summarize: bool,
}

impl fmt::Debug for DigestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestRequest")
            .field("query", &self.query)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("summarize", &self.summarize)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DigestEntry {
    pub paper: Paper,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub query: Option<String>,
    /// Papers in the snapshot before filtering
    pub total: usize,
    pub entries: Vec<DigestEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub fetch_error: Option<String>,
}

impl Digest {
    pub fn matched(&self) -> usize {
        self.entries.len()
    }
}

/// Sequences fetch, normalize, filter and on-demand summarization.
pub struct DigestPipeline {
    source: Box<dyn FeedSource>,
    summarizer: Arc<dyn Summarizer>,
    cache: SummaryCache,
    config: PipelineConfig,
}

impl DigestPipeline {
    pub fn new(
        source: Box<dyn FeedSource>,
        summarizer: Arc<dyn Summarizer>,
        config: PipelineConfig,
    ) -> Self {
        info!(
            "Creating digest pipeline: source={}, summarizer={}",
            source.source_name(),
            summarizer.adapter_name()
        );
        Self {
            source,
            summarizer,
            cache: SummaryCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetches and normalizes one snapshot of the feed.
    ///
    /// A fetch failure yields an empty snapshot with the error attached.
    pub async fn load(&self) -> FeedSnapshot {
        let fetched_at = Utc::now();
        let source = self.source.source_uri().to_string();

        match self.source.pull().await {
            Ok(entries) => {
                let (papers, skipped) = normalize_all(&entries);
                info!(
                    "Loaded {} papers from {} ({} skipped)",
                    papers.len(),
                    self.source.source_name(),
                    skipped.len()
                );
                FeedSnapshot {
                    source,
                    fetched_at,
                    papers,
                    skipped,
                    error: None,
                }
            }
            Err(e) => {
                error!("Failed to load feed {}: {}", source, e);
                FeedSnapshot {
                    source,
                    fetched_at,
                    papers: Vec::new(),
                    skipped: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    pub fn filter(&self, snapshot: &FeedSnapshot, query: &str) -> Vec<Paper> {
        filter_papers(&snapshot.papers, query)
    }

    /// Summarizes one paper's abstract, serving repeats from the cache.
    ///
    /// Cached text is reused only when it was generated under the same
    /// credential. Calls for the same link are serialized so at most one
    /// upstream request per link is in flight.
    pub async fn summarize(&self, paper: &Paper, credential: Option<&str>) -> SummaryResult {
        let Some(credential) = usable_credential(credential) else {
            return SummaryResult::Unavailable(UnavailableReason::MissingCredential);
        };

        if !self.config.cache_summaries {
            return self.call_summarizer(paper, credential).await;
        }

        let fingerprint = CredentialFingerprint::of(credential);
        let slot = self.cache.slot(paper.link()).await;
        let mut cached = slot.lock().await;

        if let Some(text) = cached.as_ref().and_then(|c| c.for_credential(&fingerprint)) {
            debug!("Summary cache hit for {}", paper.link());
            return SummaryResult::Success(text.to_string());
        }

        if cached.is_some() {
            debug!("Credential changed since {} was summarized, bypassing cache", paper.link());
        }

        let result = self.call_summarizer(paper, credential).await;
        if let Some(text) = result.text() {
            *cached = Some(CachedSummary {
                fingerprint,
                text: text.to_string(),
            });
        }
        result
    }

    /// Summarizes every paper concurrently; results follow input order.
    pub async fn summarize_all(&self, papers: &[Paper], credential: Option<&str>) -> Vec<SummaryResult> {
        let Some(credential) = usable_credential(credential) else {
            debug!("No credential, marking {} papers as unavailable", papers.len());
            return vec![SummaryResult::Unavailable(UnavailableReason::MissingCredential); papers.len()];
        };

        let concurrency = self.config.concurrency.max(1);
        info!("Summarizing {} papers ({} at a time)", papers.len(), concurrency);

        let results: Vec<SummaryResult> = stream::iter(papers)
            .map(|paper| self.summarize(paper, Some(credential)))
            .buffered(concurrency)
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!("Summarized {} of {} papers", succeeded, results.len());
        results
    }

    /// Loads, filters and optionally summarizes in one pass.
    pub async fn run(&self, request: &DigestRequest) -> Digest {
        debug!("Running digest: {:?}", request);
        let snapshot = self.load().await;
        if snapshot.is_empty() {
            warn!("No papers available from {}", snapshot.source);
        }
        let query = request.query.as_deref().unwrap_or("");
        let papers = self.filter(&snapshot, query);

        let summaries: Vec<Option<SummaryResult>> = if request.summarize {
            self.summarize_all(&papers, request.credential.as_deref())
                .await
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; papers.len()]
        };

        let entries = papers
            .into_iter()
            .zip(summaries)
            .map(|(paper, summary)| DigestEntry { paper, summary })
            .collect();

        Digest {
            source: snapshot.source,
            fetched_at: snapshot.fetched_at,
            query: request.query.clone().filter(|q| !q.is_empty()),
            total: snapshot.papers.len(),
            entries,
            skipped: snapshot.skipped,
            fetch_error: snapshot.error.map(|e| e.to_string()),
        }
    }

    /// Number of links with a cached summary
    pub async fn cached_summaries(&self) -> usize {
        self.cache.len().await
    }

    pub async fn clear_summaries(&self) {
        self.cache.clear().await;
    }

    async fn call_summarizer(&self, paper: &Paper, credential: &str) -> SummaryResult {
        let limit = Duration::from_secs(self.config.summary_timeout_seconds);
        match tokio::time::timeout(limit, self.summarizer.summarize(paper.abstract_text(), Some(credential))).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Summarization of {} timed out after {:?}", paper.link(), limit);
                SummaryResult::upstream_failure("timeout")
            }
        }
    }
}

/// Pipeline builder for easier configuration
#[derive(Default)]
pub struct PipelineBuilder {
    source: Option<Box<dyn FeedSource>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: Box<dyn FeedSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DigestPipeline> {
        let source = self
            .source
            .ok_or_else(|| DigestError::Config("pipeline needs a feed source".to_string()))?;
        let summarizer = self
            .summarizer
            .ok_or_else(|| DigestError::Config("pipeline needs a summarizer".to_string()))?;
        Ok(DigestPipeline::new(source, summarizer, self.config))
    }
}

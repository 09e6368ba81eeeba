use crate::parser::FeedParser;
use crate::traits::FeedSource;
use crate::types::{FetchConfig, FetchError, RawEntry, Result};
use crate::Fetcher;
use async_trait::async_trait;
use tracing::{error, info};

pub const ARXIV_CS_AI_URL: &str = "http://export.arxiv.org/rss/cs.AI";

/// Feed source reading one syndication endpoint, arXiv listings by default
pub struct ArxivFeedSource {
    url: String,
    title: Option<String>,
    fetcher: Fetcher,
}

impl ArxivFeedSource {
    pub fn new(url: String, fetch_config: FetchConfig) -> Result<Self> {
        // Only the syntax is checked; reachability is discovered on pull.
        url::Url::parse(&url)?;
        let fetcher = Fetcher::new(fetch_config)?;

        Ok(Self {
            url,
            title: None,
            fetcher,
        })
    }

    /// The arXiv Artificial Intelligence listing
    pub fn cs_ai(fetch_config: FetchConfig) -> Result<Self> {
        Self::new(ARXIV_CS_AI_URL.to_string(), fetch_config)
            .map(|source| source.with_title("arXiv cs.AI".to_string()))
    }

    /// Any arXiv subject listing, e.g. `cs.LG` or `stat.ML`
    pub fn category(category: &str, fetch_config: FetchConfig) -> Result<Self> {
        let url = format!("http://export.arxiv.org/rss/{}", category);
        Self::new(url, fetch_config).map(|source| source.with_title(format!("arXiv {}", category)))
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }
}

#[async_trait]
impl FeedSource for ArxivFeedSource {
    fn source_uri(&self) -> &str {
        &self.url
    }

    fn source_name(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            // Fall back to the host name
            if let Ok(parsed) = url::Url::parse(&self.url) {
                if let Some(domain) = parsed.domain() {
                    return format!("Feed ({})", domain);
                }
            }
            "Feed".to_string()
        })
    }

    async fn pull(&self) -> std::result::Result<Vec<RawEntry>, FetchError> {
        info!("Pulling feed: {}", self.url);

        let content = self.fetcher.fetch_document(&self.url).await?;

        if !FeedParser::is_valid_feed_content(&content) {
            error!("Response from {} does not look like an RSS or Atom document", self.url);
            return Err(FetchError::Malformed(
                "document has no RSS or Atom markers".to_string(),
            ));
        }

        let entries = FeedParser::parse_entries(&content)?;
        info!("Pulled {} raw entries from {}", entries.len(), self.source_name());
        Ok(entries)
    }
}

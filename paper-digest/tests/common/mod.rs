#![allow(dead_code)]

use async_trait::async_trait;
use paper_digest::{FeedSource, FetchError, RawEntry, Summarizer, SummaryResult};
use paper_digest::llm_adapter::usable_credential;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn raw_entry(title: &str, summary: &str, link: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        summary: Some(summary.to_string()),
        link: Some(link.to_string()),
        ..RawEntry::default()
    }
}

pub fn sample_entries() -> Vec<RawEntry> {
    vec![
        RawEntry {
            authors: Some(vec!["Alice".to_string(), "Bob".to_string()]),
            ..raw_entry("Deep Learning for X", "We study Y", "http://a/1")
        },
        raw_entry("Graph Neural Networks", "Message passing on graphs with AI planners.", "http://a/2"),
        raw_entry("Robust Planning", "A deep dive into search under uncertainty.", "http://a/3"),
    ]
}

/// Feed source serving a fixed snapshot or a fixed error.
pub struct StaticFeedSource {
    result: Result<Vec<RawEntry>, FetchError>,
    pulls: AtomicUsize,
}

impl StaticFeedSource {
    pub fn entries(entries: Vec<RawEntry>) -> Self {
        Self {
            result: Ok(entries),
            pulls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            pulls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    fn source_uri(&self) -> &str {
        "memory://static"
    }

    fn source_name(&self) -> String {
        "Static test feed".to_string()
    }

    async fn pull(&self) -> Result<Vec<RawEntry>, FetchError> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Echoes its input back after a delay that shrinks as the text grows, so
/// later calls in a batch finish first.
pub struct EchoSummarizer {
    calls: AtomicUsize,
}

impl EchoSummarizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for EchoSummarizer {
    fn adapter_name(&self) -> String {
        "Echo summarizer".to_string()
    }

    async fn summarize(&self, text: &str, credential: Option<&str>) -> SummaryResult {
        if usable_credential(credential).is_none() {
            return SummaryResult::Unavailable(paper_digest::UnavailableReason::MissingCredential);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = 200u64.saturating_sub(text.len() as u64 * 3);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        SummaryResult::Success(format!("summary: {}", text))
    }
}

pub const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv cs.AI</title>
  <id>urn:test:feed</id>
  <updated>2024-05-01T00:00:00Z</updated>
  <entry>
    <title>Deep Learning for X</title>
    <id>urn:test:1</id>
    <link href="http://a/1"/>
    <author><name>Alice</name></author>
    <author><name>Bob</name></author>
    <summary>We study Y</summary>
    <published>2024-05-01T12:00:00Z</published>
    <updated>2024-05-01T12:00:00Z</updated>
    <category term="cs.AI"/>
    <category term="cs.LG"/>
  </entry>
  <entry>
    <title>Planning with Language Models</title>
    <id>urn:test:2</id>
    <link href="http://a/2"/>
    <author><name>Carol</name></author>
    <summary>Agents that plan.</summary>
    <updated>2024-05-02T08:30:00Z</updated>
  </entry>
</feed>
"#;

pub const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>cs.AI updates on arXiv.org</title>
    <link>http://arxiv.org/</link>
    <description>Computer Science -- Artificial Intelligence</description>
    <item>
      <title>Graph Reasoning at Scale</title>
      <link>http://a/10</link>
      <description>We scale graph reasoning.</description>
      <pubDate>Wed, 01 May 2024 12:00:00 GMT</pubDate>
      <category>cs.AI</category>
    </item>
    <item>
      <link>http://a/11</link>
      <description>An entry without a title.</description>
    </item>
    <item>
      <title>Graph Reasoning at Scale</title>
      <link>http://a/10</link>
      <description>We scale graph reasoning.</description>
    </item>
  </channel>
</rss>
"#;

pub const EMPTY_RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>cs.AI updates on arXiv.org</title>
    <link>http://arxiv.org/</link>
    <description>Nothing today</description>
  </channel>
</rss>
"#;

pub fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

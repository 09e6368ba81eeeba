use crate::types::{FetchError, RawEntry};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct FeedParser;

impl FeedParser {
    /// Parses a syndication document into raw entries in document order.
    ///
    /// Timestamps are handed through as the text the feed carried, whether or not
    /// it is a date chrono understands.
    pub fn parse_entries(content: &str) -> Result<Vec<RawEntry>, FetchError> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let timestamps = TimestampTable::default();
        let feed = parser::Builder::new()
            .timestamp_parser(timestamps.recorder())
            .build()
            .parse(content.as_bytes())
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        if feed.entries.is_empty() {
            return Err(FetchError::Empty);
        }

        let raw_dates = timestamps.into_texts()?;
        let entries: Vec<RawEntry> = feed
            .entries
            .into_iter()
            .map(|entry| Self::raw_entry(entry, &raw_dates))
            .collect();

        info!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn raw_entry(entry: feed_rs::model::Entry, raw_dates: &[String]) -> RawEntry {
        let authors = if entry.authors.is_empty() {
            None
        } else {
            Some(entry.authors.into_iter().map(|a| a.name).collect())
        };

        let categories = if entry.categories.is_empty() {
            None
        } else {
            Some(entry.categories.into_iter().map(|c| c.term).collect())
        };

        // Atom entries may only carry <updated>.
        let published = entry
            .published
            .or(entry.updated)
            .and_then(|slot| raw_dates.get(slot.timestamp() as usize).cloned());

        RawEntry {
            title: entry.title.map(|t| t.content),
            authors,
            summary: entry.summary.map(|s| s.content),
            published,
            link: entry.links.into_iter().next().map(|l| l.href),
            categories,
        }
    }

    /// Cheap sniff for RSS/Atom markers before handing content to the parser.
    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
    }
}

/// Every timestamp string feed-rs meets during one parse, in the order it met them.
///
/// The recorder hands feed-rs a placeholder instant whose epoch second is the text's
/// index in the table, so each parsed `DateTime` maps back to its source text.
#[derive(Default)]
struct TimestampTable {
    texts: Arc<Mutex<Vec<String>>>,
}

impl TimestampTable {
    fn recorder(&self) -> impl Fn(&str) -> Option<DateTime<Utc>> + Send + Sync + 'static {
        let texts = Arc::clone(&self.texts);
        move |text: &str| {
            let mut texts = texts.lock().ok()?;
            let index = texts.len() as i64;
            texts.push(text.trim().to_string());
            DateTime::from_timestamp(index, 0)
        }
    }

    fn into_texts(self) -> Result<Vec<String>, FetchError> {
        self.texts
            .lock()
            .map(|mut texts| std::mem::take(&mut *texts))
            .map_err(|_| FetchError::Malformed("timestamp table poisoned".to_string()))
    }
}

//! Plain-text rendering of papers and summary states for terminal output.

use crate::types::{Paper, SummaryResult, UnavailableReason};
use std::fmt::Write;

pub const TITLE_DISPLAY_CHARS: usize = 100;
pub const AUTHORS_DISPLAY_COUNT: usize = 3;
const RAW_DATE_PREFIX_CHARS: usize = 10;

/// Shortens a title to `max_chars` characters, appending `...` when cut.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Lists the first `max_shown` authors, noting the total when more exist.
/// An empty list renders as an empty string.
pub fn format_authors(authors: &[String], max_shown: usize) -> String {
    let shown = authors
        .iter()
        .take(max_shown)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if authors.len() > max_shown {
        format!("{} et al. ({} authors)", shown, authors.len())
    } else {
        shown
    }
}

/// `YYYY-MM-DD` when the timestamp parses, else the first ten raw characters.
pub fn format_published(paper: &Paper) -> Option<String> {
    if paper.published_at().is_empty() {
        return None;
    }

    Some(match paper.published_date() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => paper.published_at().chars().take(RAW_DATE_PREFIX_CHARS).collect(),
    })
}

/// Drops markup tags and collapses whitespace, for abstracts that arrive as HTML.
pub fn plain_text(html: &str) -> String {
    html.chars()
        .fold((String::new(), false), |(mut text, in_tag), c| match c {
            '<' => (text, true),
            '>' if in_tag => {
                text.push(' ');
                (text, false)
            }
            _ if !in_tag => {
                text.push(c);
                (text, in_tag)
            }
            _ => (text, in_tag),
        })
        .0
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// User-facing text for a summary state.
pub fn summary_message(result: &SummaryResult) -> String {
    match result {
        SummaryResult::Success(text) => text.trim().to_string(),
        SummaryResult::Unavailable(UnavailableReason::MissingCredential) => {
            "Set an API key (--api-key or OPENAI_API_KEY) to generate summaries.".to_string()
        }
        SummaryResult::Unavailable(UnavailableReason::Empty) => {
            "The summarization service returned an empty summary.".to_string()
        }
        SummaryResult::Unavailable(UnavailableReason::UpstreamFailure(detail)) => {
            format!("Summary failed: {}", detail)
        }
    }
}

pub fn render_paper(paper: &Paper, summary: Option<&SummaryResult>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## {}", truncate_title(paper.title(), TITLE_DISPLAY_CHARS));
    if !paper.authors().is_empty() {
        let _ = writeln!(out, "Authors:   {}", format_authors(paper.authors(), AUTHORS_DISPLAY_COUNT));
    }
    if let Some(date) = format_published(paper) {
        let _ = writeln!(out, "Published: {}", date);
    }
    if !paper.categories().is_empty() {
        let tags: Vec<&str> = paper.categories().iter().map(String::as_str).collect();
        let _ = writeln!(out, "Tags:      {}", tags.join(", "));
    }
    let _ = writeln!(out, "Link:      {}", paper.link());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plain_text(paper.abstract_text()));

    if let Some(summary) = summary {
        let _ = writeln!(out);
        let _ = writeln!(out, "Summary:");
        let _ = writeln!(out, "{}", summary_message(summary));
    }

    out
}

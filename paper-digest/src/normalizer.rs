use crate::types::{NormalizeError, Paper, RawEntry, RequiredField, SkippedEntry};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Converts a raw entry into a [`Paper`].
///
/// `title` and `link` must be present and non-blank, `summary` must be
/// present. Missing `authors`, `categories` and `published` become an empty
/// list, an empty set and an empty string.
pub fn normalize(entry: &RawEntry) -> Result<Paper, NormalizeError> {
    let title = required_text(entry.title.as_deref(), RequiredField::Title)?;
    let link = required_text(entry.link.as_deref(), RequiredField::Link)?;
    let abstract_text = entry
        .summary
        .clone()
        .ok_or(NormalizeError::MissingField(RequiredField::Abstract))?;

    let authors = entry.authors.clone().unwrap_or_default();

    let categories: BTreeSet<String> = entry
        .categories
        .iter()
        .flatten()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    let published_at = entry.published.clone().unwrap_or_default();

    Ok(Paper::new(
        title,
        authors,
        abstract_text,
        published_at,
        link,
        categories,
    ))
}

/// Normalizes a batch, skipping and reporting entries that cannot be normalized.
pub fn normalize_all(entries: &[RawEntry]) -> (Vec<Paper>, Vec<SkippedEntry>) {
    let mut papers = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match normalize(entry) {
            Ok(paper) => papers.push(paper),
            Err(error) => {
                warn!("Skipping feed entry {}: {}", index, error);
                skipped.push(SkippedEntry { index, error });
            }
        }
    }

    debug!("Normalized {} entries, skipped {}", papers.len(), skipped.len());
    (papers, skipped)
}

fn required_text(value: Option<&str>, field: RequiredField) -> Result<String, NormalizeError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(NormalizeError::MissingField(field)),
    }
}

use crate::types::Paper;

/// Keeps papers whose title or abstract contains `query`, ignoring case.
///
/// An empty query returns the input unchanged. Matching is a plain substring
/// test on lowercased text and the result keeps feed order.
pub fn filter_papers(papers: &[Paper], query: &str) -> Vec<Paper> {
    if query.is_empty() {
        return papers.to_vec();
    }

    let needle = query.to_lowercase();
    papers
        .iter()
        .filter(|paper| matches_lowercase(paper, &needle))
        .cloned()
        .collect()
}

pub fn matches_query(paper: &Paper, query: &str) -> bool {
    query.is_empty() || matches_lowercase(paper, &query.to_lowercase())
}

fn matches_lowercase(paper: &Paper, needle: &str) -> bool {
    paper.title().to_lowercase().contains(needle)
        || paper.abstract_text().to_lowercase().contains(needle)
}

mod common;

use common::{raw_entry, sample_entries};
use paper_digest::{filter_papers, normalize_all, Paper};
use paper_digest::filter::matches_query;

fn sample_papers() -> Vec<Paper> {
    let (papers, skipped) = normalize_all(&sample_entries());
    assert!(skipped.is_empty());
    papers
}

fn links(papers: &[Paper]) -> Vec<&str> {
    papers.iter().map(|p| p.link()).collect()
}

#[test]
fn test_empty_query_is_identity() {
    let papers = sample_papers();
    assert_eq!(filter_papers(&papers, ""), papers);
    assert!(filter_papers(&[], "").is_empty());
}

#[test]
fn test_scenario_a_filtering() {
    let (papers, _) = normalize_all(&[raw_entry("Deep Learning for X", "We study Y", "http://a/1")]);

    let hits = filter_papers(&papers, "deep");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Deep Learning for X");

    assert!(filter_papers(&papers, "zzz").is_empty());
}

#[test]
fn test_matches_title_or_abstract_in_feed_order() {
    let papers = sample_papers();

    // "deep" is in the first title and the third abstract
    assert_eq!(links(&filter_papers(&papers, "deep")), ["http://a/1", "http://a/3"]);
    // abstract-only match
    assert_eq!(links(&filter_papers(&papers, "message passing")), ["http://a/2"]);
}

#[test]
fn test_case_insensitive() {
    let papers = sample_papers();

    assert_eq!(filter_papers(&papers, "AI"), filter_papers(&papers, "ai"));
    assert_eq!(links(&filter_papers(&papers, "GRAPH")), ["http://a/2"]);
}

#[test]
fn test_filter_is_idempotent() {
    let papers = sample_papers();

    for query in ["", "deep", "AI", "zzz", " "] {
        let once = filter_papers(&papers, query);
        let twice = filter_papers(&once, query);
        assert_eq!(once, twice, "query {:?}", query);
    }
}

#[test]
fn test_exact_substring_only() {
    let papers = sample_papers();

    // Word order matters and there is no fuzzy matching
    assert!(filter_papers(&papers, "learning deep").is_empty());
    assert!(filter_papers(&papers, "Deep  Learning").is_empty());
    assert!(filter_papers(&papers, "lerning").is_empty());
}

#[test]
fn test_whitespace_query_is_a_substring() {
    let (papers, _) = normalize_all(&[
        raw_entry("One", "single", "http://a/1"),
        raw_entry("Two words", "here", "http://a/2"),
    ]);

    assert_eq!(links(&filter_papers(&papers, " ")), ["http://a/2"]);
}

#[test]
fn test_matches_query_single_paper() {
    let papers = sample_papers();

    assert!(matches_query(&papers[0], ""));
    assert!(matches_query(&papers[0], "WE STUDY"));
    assert!(!matches_query(&papers[0], "graphs"));
}

mod common;

use common::ATOM_FEED;
use paper_digest::display::format_published;
use paper_digest::{normalize, FeedParser};

fn rss_with_date(pub_date: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>cs.AI updates on arXiv.org</title>
    <link>http://arxiv.org/</link>
    <description>Computer Science -- Artificial Intelligence</description>
    <lastBuildDate>Thu, 02 May 2024 00:00:00 GMT</lastBuildDate>
    <item>
      <title>Deep Learning for X</title>
      <link>http://a/1</link>
      <description>We study Y</description>
      <pubDate>{}</pubDate>
    </item>
    <item>
      <title>Robust Planning</title>
      <link>http://a/3</link>
      <description>A deep dive into search under uncertainty.</description>
      <pubDate>Wed, 01 May 2024 12:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>
"#,
        pub_date
    )
}

#[test]
fn test_unparseable_pub_date_survives_parsing() {
    let doc = rss_with_date("sometime in May 2024");
    let entries = FeedParser::parse_entries(&doc).unwrap();
    let paper = normalize(&entries[0]).unwrap();

    assert_eq!(paper.published_at(), "sometime in May 2024");
    assert!(paper.published_date().is_none());
    assert_eq!(format_published(&paper).as_deref(), Some("sometime i"));

    // Neighbouring entries keep their own dates
    let next = normalize(&entries[1]).unwrap();
    assert_eq!(next.published_at(), "Wed, 01 May 2024 12:00:00 GMT");
    assert_eq!(format_published(&next).as_deref(), Some("2024-05-01"));
}

#[test]
fn test_pub_date_text_is_kept_verbatim() {
    let doc = rss_with_date("Tue, 30 Apr 2024 20:00:00 -0400");
    let entries = FeedParser::parse_entries(&doc).unwrap();
    let paper = normalize(&entries[0]).unwrap();

    assert_eq!(paper.published_at(), "Tue, 30 Apr 2024 20:00:00 -0400");
    assert_eq!(format_published(&paper).as_deref(), Some("2024-04-30"));
}

#[test]
fn test_atom_updated_stands_in_for_published() {
    let entries = FeedParser::parse_entries(ATOM_FEED).unwrap();
    let papers: Vec<_> = entries.iter().map(|e| normalize(e).unwrap()).collect();

    assert_eq!(papers[0].published_at(), "2024-05-01T12:00:00Z");
    assert_eq!(papers[1].published_at(), "2024-05-02T08:30:00Z");
    assert_eq!(format_published(&papers[1]).as_deref(), Some("2024-05-02"));
}

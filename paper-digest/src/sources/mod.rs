pub mod arxiv_feed;

pub use arxiv_feed::{ArxivFeedSource, ARXIV_CS_AI_URL};

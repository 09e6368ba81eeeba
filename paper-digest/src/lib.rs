pub mod types;
pub mod traits;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod normalizer;
pub mod filter;
pub mod llm_adapter;
pub mod cache;
pub mod pipeline;
pub mod display;

pub use types::*;
pub use traits::FeedSource;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::{ArxivFeedSource, ARXIV_CS_AI_URL};
pub use normalizer::{normalize, normalize_all};
pub use filter::filter_papers;
pub use llm_adapter::{ChatCompletionSummarizer, MockSummarizer, Summarizer};
pub use cache::SummaryCache;
pub use pipeline::{Digest, DigestEntry, DigestPipeline, DigestRequest, FeedSnapshot, PipelineBuilder};

use anyhow::Context;
use clap::Parser;
use paper_digest::display::render_paper;
use paper_digest::{
    ArxivFeedSource, ChatCompletionSummarizer, DigestRequest, FetchConfig, PipelineBuilder,
    PipelineConfig, SummarizerConfig, ARXIV_CS_AI_URL, DEFAULT_API_BASE,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch a paper feed, filter it by keyword and optionally summarize each paper.
#[derive(Debug, Parser)]
#[command(name = "paper-digest", version)]
struct Cli {
    /// Feed endpoint to read
    #[arg(long, env = "PAPER_DIGEST_SOURCE", default_value = ARXIV_CS_AI_URL)]
    source: String,

    /// Case-insensitive substring matched against titles and abstracts
    #[arg(long, short)]
    query: Option<String>,

    /// Generate a summary for every listed paper
    #[arg(long)]
    summarize: bool,

    /// Credential for the summarization service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Summarization requests in flight at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    #[arg(long, default_value_t = 60)]
    summary_timeout_secs: u64,

    /// Extra fetch attempts on network errors and 5xx responses
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Print the digest as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting paper digest for {}", cli.source);

    let fetch_config = FetchConfig {
        max_retries: cli.max_retries,
        ..FetchConfig::default()
    };
    let summarizer_config = SummarizerConfig {
        api_base: cli.api_base.clone(),
        model: cli.model.clone(),
        timeout_seconds: cli.summary_timeout_secs,
        ..SummarizerConfig::default()
    };
    let pipeline_config = PipelineConfig {
        concurrency: cli.concurrency,
        summary_timeout_seconds: cli.summary_timeout_secs,
        ..PipelineConfig::default()
    };

    let source = ArxivFeedSource::new(cli.source.clone(), fetch_config)
        .with_context(|| format!("invalid feed source {}", cli.source))?;
    let summarizer = ChatCompletionSummarizer::new(summarizer_config)
        .context("failed to build summarization client")?;

    let pipeline = PipelineBuilder::new()
        .source(Box::new(source))
        .summarizer(Arc::new(summarizer))
        .config(pipeline_config)
        .build()?;

    let request = DigestRequest {
        query: cli.query.clone(),
        credential: cli.api_key.clone(),
        summarize: cli.summarize,
    };
    let digest = pipeline.run(&request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
    } else {
        if let Some(err) = &digest.fetch_error {
            error!("Fetch failed: {}", err);
            println!("No papers could be fetched ({}).", err);
            println!("Check your network connection and run the command again to retry.");
            return Ok(ExitCode::FAILURE);
        }

        println!("Found {} papers in {}", digest.total, digest.source);
        if let Some(query) = &digest.query {
            println!("{} papers match \"{}\"", digest.matched(), query);
        }
        if !digest.skipped.is_empty() {
            println!("{} feed entries were skipped as incomplete", digest.skipped.len());
        }

        for entry in &digest.entries {
            println!();
            print!("{}", render_paper(&entry.paper, entry.summary.as_ref()));
        }
    }

    if digest.fetch_error.is_some() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

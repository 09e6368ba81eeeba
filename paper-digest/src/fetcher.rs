use crate::types::{FetchConfig, FetchError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const BYTES_PER_MB: usize = 1024 * 1024;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

/// Whether a failed attempt is worth another try.
enum Attempt {
    Retryable(FetchError),
    Fatal(FetchError),
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Retrieves the feed document body.
    ///
    /// Transport failures and 5xx responses are retried up to
    /// `max_retries` times with exponential backoff starting at
    /// `retry_delay_ms` and doubling up to 32 times that interval, without jitter.
    /// Client errors, oversize and empty documents fail immediately.
    pub async fn fetch_document(&self, url: &str) -> std::result::Result<String, FetchError> {
        debug!("Fetching feed document: {}", url);

        let initial = Duration::from_millis(self.config.retry_delay_ms);
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: initial * 32,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut last_error = FetchError::Network("no attempt made".to_string());

        for attempt in 0..=self.config.max_retries {
            match self.attempt(url).await {
                Ok(content) => {
                    info!("Fetched feed document: {} ({} bytes)", url, content.len());
                    return Ok(content);
                }
                Err(Attempt::Fatal(e)) => {
                    error!("Failed to fetch feed {}: {}", url, e);
                    return Err(e);
                }
                Err(Attempt::Retryable(e)) => {
                    last_error = e;
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}: {}; retrying in {:?}", attempt + 1, url, last_error, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                }
            }
        }

        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);
        Err(last_error)
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, Attempt> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(FetchError::Network(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Network(describe_status(status));
            return Err(if status.is_server_error() {
                Attempt::Retryable(err)
            } else {
                Attempt::Fatal(err)
            });
        }

        let limit = self.config.max_feed_size_mb.saturating_mul(BYTES_PER_MB);
        if let Some(content_length) = response.content_length() {
            let content_length = content_length as usize;
            if content_length > limit {
                return Err(Attempt::Fatal(FetchError::TooLarge {
                    size_mb: content_length.div_ceil(BYTES_PER_MB),
                }));
            }
        }

        // Compressed or chunked responses carry no usable length; cap what is read.
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Attempt::Retryable(FetchError::Network(e.to_string())))?
        {
            body.extend_from_slice(&chunk);
            if body.len() > limit {
                return Err(Attempt::Fatal(FetchError::TooLarge {
                    size_mb: body.len().div_ceil(BYTES_PER_MB),
                }));
            }
        }

        let content = String::from_utf8_lossy(&body).into_owned();
        if content.trim().is_empty() {
            return Err(Attempt::Fatal(FetchError::Empty));
        }

        Ok(content)
    }
}

fn describe_status(status: StatusCode) -> String {
    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

use crate::scrapers::types::RetryPolicy;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// HTML page fetcher with a browser-like header set
pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, retry })
    }

    /// GET a page and return its body.
    ///
    /// A final non-success status yields `Ok(None)`; transport errors that
    /// survive all retries are returned as errors.
    pub async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        let mut attempt = 0;

        loop {
            debug!("Fetching URL: {} (attempt {})", url, attempt + 1);

            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    let html = response
                        .text()
                        .await
                        .with_context(|| format!("Failed to read response body from {}", url))?;
                    debug!("Downloaded {} bytes of HTML", html.len());
                    return Ok(Some(html));
                }
                Ok(response) => {
                    let status = response.status();
                    if is_retryable(status) && attempt < self.retry.max_retries {
                        let delay = self.retry.delay_for(attempt);
                        warn!("{} returned status {}, retrying in {:?}", url, status, delay);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    warn!("{} returned status {}, treating as no data", url, status);
                    return Ok(None);
                }
                Err(e) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!("Request to {} failed: {}, retrying in {:?}", url, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to fetch {}", url));
                }
            }
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

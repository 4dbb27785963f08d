use std::time::Duration;

/// What to do when a labelled row is missing from an advertisement page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Any missing label fails the whole extraction
    #[default]
    Required,
    /// Missing labels are left out, the rest is still extracted
    Optional,
}

/// Bounded retries with exponential backoff for page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further one
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// Scrape parameters for the listing scraper
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub field_policy: FieldPolicy,
    pub retry: RetryPolicy,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            field_policy: FieldPolicy::default(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

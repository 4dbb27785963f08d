use crate::models::CarRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing-page scrapers
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// Scrape every advertisement on one listing page, detail fields included
    async fn scrape(&self, listing_url: &str) -> Result<Vec<CarRecord>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}

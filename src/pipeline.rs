use crate::models::{CarRecord, NumberFormat, Row};
use crate::notify::Notifier;
use crate::scrapers::ListingScraper;
use crate::sheets::{store_cars, SheetStore};
use anyhow::Result;
use tracing::{info, warn};

/// Scrape one listing page and append the unseen ads to a sheet
pub struct Pipeline {
    scraper: Box<dyn ListingScraper>,
    sheet: Box<dyn SheetStore>,
    numbers: NumberFormat,
    notifier: Option<Box<dyn Notifier>>,
}

impl Pipeline {
    pub fn new(scraper: Box<dyn ListingScraper>, sheet: Box<dyn SheetStore>) -> Self {
        Self {
            scraper,
            sheet,
            numbers: NumberFormat::default(),
            notifier: None,
        }
    }

    pub fn with_number_format(mut self, numbers: NumberFormat) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns the rows appended in this run
    pub async fn run(&self, listing_url: &str) -> Result<Vec<Row>> {
        collect_car_data(
            listing_url,
            self.scraper.as_ref(),
            self.sheet.as_ref(),
            self.numbers,
            self.notifier.as_deref(),
        )
        .await
    }

    pub async fn scrape(&self, listing_url: &str) -> Result<Vec<CarRecord>> {
        scrape(listing_url, self.scraper.as_ref()).await
    }

    /// Store already scraped cars, then notify about the new rows
    pub async fn store(&self, cars: &[CarRecord]) -> Result<Vec<Row>> {
        store_and_notify(cars, self.sheet.as_ref(), self.numbers, self.notifier.as_deref()).await
    }
}

/// Scrape `listing_url`, store the new cars and notify about them.
pub async fn collect_car_data(
    listing_url: &str,
    scraper: &dyn ListingScraper,
    sheet: &dyn SheetStore,
    numbers: NumberFormat,
    notifier: Option<&dyn Notifier>,
) -> Result<Vec<Row>> {
    let cars = scrape(listing_url, scraper).await?;
    store_and_notify(&cars, sheet, numbers, notifier).await
}

async fn scrape(listing_url: &str, scraper: &dyn ListingScraper) -> Result<Vec<CarRecord>> {
    let cars = scraper.scrape(listing_url).await?;
    info!("Scraped {} cars from {}", cars.len(), scraper.source_name());
    Ok(cars)
}

// A failing notifier is only logged: the rows are already in the sheet.
async fn store_and_notify(
    cars: &[CarRecord],
    sheet: &dyn SheetStore,
    numbers: NumberFormat,
    notifier: Option<&dyn Notifier>,
) -> Result<Vec<Row>> {
    let added = store_cars(cars, sheet, numbers).await?;

    if let Some(notifier) = notifier.filter(|_| !added.is_empty()) {
        if let Err(e) = notifier.notify(&added).await {
            warn!("Notification failed: {:#}", e);
        }
    }

    info!("✅ {} new listings stored", added.len());
    Ok(added)
}

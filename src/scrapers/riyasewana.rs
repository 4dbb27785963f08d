use crate::models::{AdDetails, CarRecord, DetailField};
use crate::scrapers::error::ExtractError;
use crate::scrapers::http::PageFetcher;
use crate::scrapers::traits::ListingScraper;
use crate::scrapers::types::{FieldPolicy, ScrapeOptions};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

/// Riyasewana listing and advertisement scraper
pub struct RiyasewanaScraper {
    fetcher: PageFetcher,
    options: ScrapeOptions,
}

impl RiyasewanaScraper {
    /// Create a new scraper with default options
    pub fn new() -> Result<Self> {
        Self::with_options(ScrapeOptions::default())
    }

    /// Create a new scraper with custom options
    pub fn with_options(options: ScrapeOptions) -> Result<Self> {
        let fetcher = PageFetcher::new(options.timeout, options.retry)?;
        Ok(Self { fetcher, options })
    }

    /// Fetch one advertisement page and read its attribute table.
    ///
    /// `Ok(None)` when the page could not be fetched with a success status.
    pub async fn extract_advertisement(&self, url: &str) -> Result<Option<AdDetails>> {
        let Some(html) = self.fetcher.fetch_html(url).await? else {
            return Ok(None);
        };

        let details = parse_advertisement(&html, self.options.field_policy)
            .with_context(|| format!("Failed to extract advertisement {}", url))?;
        Ok(Some(details))
    }

    /// Scrape one listing page, enriching every item with its advertisement page.
    ///
    /// Items are fetched one at a time, in page order.
    pub async fn scrape_list(&self, listing_url: &str) -> Result<Vec<CarRecord>> {
        let Some(html) = self.fetcher.fetch_html(listing_url).await? else {
            warn!("No listing page from {}, nothing to scrape", listing_url);
            return Ok(Vec::new());
        };

        let mut cars = parse_listing(&html)
            .with_context(|| format!("Failed to parse listing page {}", listing_url))?;
        info!("Found {} listing items", cars.len());

        let base = Url::parse(listing_url).ok();
        for car in cars.iter_mut() {
            let detail_url = resolve(base.as_ref(), &car.url);
            debug!("Processing: {}", car.title);

            match self.extract_advertisement(&detail_url).await? {
                Some(details) => car.details = details,
                None => warn!("No advertisement data for {}, keeping summary only", car.url),
            }
        }

        Ok(cars)
    }
}

#[async_trait]
impl ListingScraper for RiyasewanaScraper {
    async fn scrape(&self, listing_url: &str) -> Result<Vec<CarRecord>> {
        info!("Starting Riyasewana scrape of {}", listing_url);
        self.scrape_list(listing_url).await
    }

    fn source_name(&self) -> &'static str {
        "Riyasewana"
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

// hrefs on the site are absolute; relative ones are joined onto the listing URL
fn resolve(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Read the labelled attribute table of an advertisement page.
///
/// For every label, the first `<td>` whose text is exactly the label is
/// located and its next `<td>` sibling is read.
pub fn parse_advertisement(html: &str, policy: FieldPolicy) -> Result<AdDetails, ExtractError> {
    let document = Html::parse_document(html);
    let td = selector("td");
    let cells: Vec<ElementRef> = document.select(&td).collect();

    let mut details = AdDetails::default();
    for field in DetailField::ALL {
        match labelled_value(&cells, field.label()) {
            Some(value) => details.set(field, value),
            None if policy == FieldPolicy::Required => {
                return Err(ExtractError::MissingLabel {
                    label: field.label(),
                })
            }
            None => debug!("Label '{}' not found, skipping", field.label()),
        }
    }

    Ok(details)
}

fn labelled_value(cells: &[ElementRef], label: &str) -> Option<String> {
    let cell = cells
        .iter()
        .find(|c| c.text().collect::<String>() == label)?;

    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "td")
        .map(text_of)
}

/// Parse the summary cards of a listing page, in page order.
///
/// Detail fields are left empty; any card missing an expected element or
/// attribute fails the whole page.
pub fn parse_listing(html: &str) -> Result<Vec<CarRecord>, ExtractError> {
    let document = Html::parse_document(html);
    let item_selector = selector("li.item.round");
    let heading_selector = selector("h2.more");
    let link_selector = selector("a");
    let imgbox_selector = selector("div.imgbox");
    let img_selector = selector("img");
    let boxtext_selector = selector("div.boxtext");
    let boxintxt_selector = selector("div.boxintxt");

    let mut cars = Vec::new();

    for (item, element) in document.select(&item_selector).enumerate() {
        let missing = |what| ExtractError::MissingElement { item, what };

        let link = element
            .select(&heading_selector)
            .next()
            .ok_or_else(|| missing("h2.more"))?
            .select(&link_selector)
            .next()
            .ok_or_else(|| missing("title link"))?;
        let title = link.value().attr("title").ok_or_else(|| missing("link title"))?;
        let href = link.value().attr("href").ok_or_else(|| missing("link href"))?;

        let image = element
            .select(&imgbox_selector)
            .next()
            .ok_or_else(|| missing("div.imgbox"))?
            .select(&img_selector)
            .next()
            .ok_or_else(|| missing("img"))?
            .value()
            .attr("src")
            .ok_or_else(|| missing("img src"))?;

        let summary: Vec<String> = element
            .select(&boxtext_selector)
            .next()
            .ok_or_else(|| missing("div.boxtext"))?
            .select(&boxintxt_selector)
            .map(text_of)
            .collect();
        let [location, price, mileage] = match summary.as_slice() {
            [location, price, mileage, ..] => [location, price, mileage].map(String::clone),
            _ => return Err(missing("three div.boxintxt fields")),
        };

        cars.push(CarRecord {
            title: title.trim().to_string(),
            url: href.trim().to_string(),
            image: image.trim().to_string(),
            location,
            price,
            mileage,
            details: AdDetails::default(),
            scraped_at: Utc::now(),
        });
    }

    Ok(cars)
}

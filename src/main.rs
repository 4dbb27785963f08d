use anyhow::Context;
use car_scout::config::{CliConfig, StoreKind};
use car_scout::{
    CsvSheet, GoogleSheet, ListingScraper, Pipeline, RiyasewanaScraper, SheetStore,
    WebhookNotifier,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // Initialize logging
    let default_filter = if config.verbose {
        "car_scout=debug,info"
    } else {
        "car_scout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    config.validate()?;

    info!("🚗 Car Scout - Riyasewana Scraper");
    info!("==================================");

    let scraper = RiyasewanaScraper::with_options(config.scrape_options())?;

    if config.dry_run {
        let cars = scraper.scrape(&config.url).await?;
        info!("✅ Scraped {} cars (dry run, nothing stored)", cars.len());
        println!("{}", serde_json::to_string_pretty(&cars)?);
        save_json(&config, &cars).await?;
        return Ok(());
    }

    let sheet: Box<dyn SheetStore> = match config.store {
        StoreKind::Google => {
            let token = config.google_token()?;
            let spreadsheet = config.sheet_name.as_deref().unwrap_or_default();
            let worksheet = config.worksheet_name.as_deref().unwrap_or_default();
            Box::new(GoogleSheet::open(spreadsheet, worksheet, &token).await?)
        }
        StoreKind::Csv => {
            info!("Storing rows in {}", config.csv_path.display());
            Box::new(CsvSheet::new(&config.csv_path))
        }
    };

    let mut pipeline =
        Pipeline::new(Box::new(scraper), sheet).with_number_format(config.number_format());
    if let Some(webhook) = &config.notify_webhook {
        pipeline = pipeline.with_notifier(Box::new(WebhookNotifier::new(webhook.as_str())?));
    }

    if config.save_json.is_some() {
        // scrape separately so the raw records can be kept alongside the sheet
        let cars = pipeline.scrape(&config.url).await?;
        save_json(&config, &cars).await?;
        pipeline.store(&cars).await?;
    } else {
        pipeline.run(&config.url).await?;
    }

    Ok(())
}

async fn save_json(config: &CliConfig, cars: &[car_scout::CarRecord]) -> anyhow::Result<()> {
    let Some(path) = &config.save_json else {
        return Ok(());
    };

    let json = serde_json::to_string_pretty(cars)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved {} cars to {}", cars.len(), path.display());
    Ok(())
}

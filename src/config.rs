use crate::models::NumberFormat;
use crate::scrapers::{FieldPolicy, RetryPolicy, ScrapeOptions};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTING_URL: &str = "https://riyasewana.com/search/cars/toyota/ist";

/// Where scraped rows are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Google,
    Csv,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "car-scout")]
#[command(about = "Scrape Riyasewana car listings into a spreadsheet")]
pub struct CliConfig {
    /// Listing page to scrape
    #[arg(long, env = "RIYASEWANA_LISTING_URL", default_value = DEFAULT_LISTING_URL)]
    pub url: String,

    /// Row store: a Google worksheet or a local CSV file
    #[arg(long, env = "CAR_SCOUT_STORE", value_enum, default_value = "google")]
    pub store: StoreKind,

    /// Google spreadsheet name
    #[arg(long, env = "GOOGLE_SHEET_NAME")]
    pub sheet_name: Option<String>,

    /// Worksheet (tab) inside the spreadsheet
    #[arg(long, env = "WORKSHEET_NAME")]
    pub worksheet_name: Option<String>,

    /// JSON file holding an OAuth `access_token`
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS_PATH")]
    pub credentials: Option<PathBuf>,

    /// OAuth bearer token, takes precedence over --credentials
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// CSV file used by the csv store
    #[arg(long, env = "CAR_SCOUT_CSV_PATH", default_value = "cars.csv")]
    pub csv_path: PathBuf,

    /// Skip missing advertisement fields instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Store price, mileage, year and engine size as scraped
    #[arg(long)]
    pub keep_raw_numbers: bool,

    /// Retries per page fetch
    #[arg(long, default_value = "2")]
    pub retries: u32,

    /// Delay before the first retry, doubled per retry
    #[arg(long, default_value = "500")]
    pub retry_delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Webhook to POST newly stored listings to
    #[arg(long, env = "CAR_SCOUT_NOTIFY_WEBHOOK")]
    pub notify_webhook: Option<String>,

    /// Also save the scraped records as JSON
    #[arg(long)]
    pub save_json: Option<PathBuf>,

    /// Scrape and print records without storing them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    access_token: String,
}

impl CliConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dry_run || self.store == StoreKind::Csv {
            return Ok(());
        }
        if self.sheet_name.as_deref().map_or(true, str::is_empty) {
            bail!("GOOGLE_SHEET_NAME (--sheet-name) is required for the google store");
        }
        if self.worksheet_name.as_deref().map_or(true, str::is_empty) {
            bail!("WORKSHEET_NAME (--worksheet-name) is required for the google store");
        }
        if self.access_token.is_none() && self.credentials.is_none() {
            bail!("GOOGLE_ACCESS_TOKEN or GOOGLE_APPLICATION_CREDENTIALS_PATH is required for the google store");
        }
        Ok(())
    }

    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            field_policy: if self.lenient {
                FieldPolicy::Optional
            } else {
                FieldPolicy::Required
            },
            retry: RetryPolicy {
                max_retries: self.retries,
                initial_delay: Duration::from_millis(self.retry_delay_ms),
            },
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        if self.keep_raw_numbers {
            NumberFormat::Verbatim
        } else {
            NumberFormat::DigitsOnly
        }
    }

    /// Bearer token for the Google APIs
    pub fn google_token(&self) -> Result<String> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }
        let Some(path) = &self.credentials else {
            bail!("No Google access token configured");
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials {}", path.display()))?;
        let credentials: CredentialsFile = serde_json::from_str(&content)
            .with_context(|| format!("No access_token in {}", path.display()))?;
        Ok(credentials.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("car-scout").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn csv_store_needs_no_google_settings() {
        let config = parse(&["--store", "csv", "--csv-path", "out.csv"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.csv_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn google_store_requires_names_and_token() {
        let config = parse(&["--store", "google", "--sheet-name", "Cars"]);
        assert!(config.validate().is_err());

        let config = parse(&[
            "--store",
            "google",
            "--sheet-name",
            "Cars",
            "--worksheet-name",
            "IST",
            "--access-token",
            "tok",
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.google_token().unwrap(), "tok");
    }

    #[test]
    fn flags_map_to_policies() {
        let config = parse(&[
            "--store",
            "csv",
            "--lenient",
            "--keep-raw-numbers",
            "--retries",
            "0",
        ]);
        let options = config.scrape_options();
        assert_eq!(options.field_policy, FieldPolicy::Optional);
        assert_eq!(options.retry.max_retries, 0);
        assert_eq!(config.number_format(), NumberFormat::Verbatim);
    }

    #[test]
    fn every_flag_has_help_text() {
        let command = <CliConfig as clap::CommandFactory>::command();
        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help") {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }

    #[test]
    fn token_read_from_credentials_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{"access_token": "ya29.abc", "expires_in": 3599}"#).unwrap();

        let config = parse(&["--store", "csv", "--credentials", path.to_str().unwrap()]);
        assert_eq!(config.google_token().unwrap(), "ya29.abc");
    }
}

pub mod config;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scrapers;
pub mod sheets;

pub use config::{CliConfig, StoreKind};
pub use models::{AdDetails, CarRecord, DetailField, NumberFormat, Row, HEADER};
pub use notify::{Notifier, WebhookNotifier};
pub use pipeline::{collect_car_data, Pipeline};
pub use scrapers::{ExtractError, FieldPolicy, ListingScraper, RetryPolicy, RiyasewanaScraper, ScrapeOptions};
pub use sheets::{CsvSheet, GoogleSheet, MemorySheet, SheetStore};

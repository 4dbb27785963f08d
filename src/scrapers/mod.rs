pub mod error;
pub mod http;
pub mod riyasewana;
pub mod traits;
pub mod types;

pub use error::ExtractError;
pub use http::PageFetcher;
pub use riyasewana::RiyasewanaScraper;
pub use traits::ListingScraper;
pub use types::{FieldPolicy, RetryPolicy, ScrapeOptions};

pub mod csv;
pub mod google;
pub mod memory;
pub mod writer;

pub use self::csv::CsvSheet;
pub use google::GoogleSheet;
pub use memory::MemorySheet;
pub use writer::store_cars;

use crate::models::Row;
use anyhow::Result;
use async_trait::async_trait;

/// A worksheet rows can be read from and appended to.
///
/// Row and column numbers are 1-based; trailing empty cells are not returned.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn row_values(&self, row: usize) -> Result<Vec<String>>;

    async fn col_values(&self, col: usize) -> Result<Vec<String>>;

    async fn append_row(&self, row: &Row) -> Result<()>;
}

pub(crate) fn trim_trailing_empty(mut cells: Vec<String>) -> Vec<String> {
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

use crate::models::Row;
use crate::sheets::{trim_trailing_empty, SheetStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-process worksheet
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<Row>>,
    fail_after: Option<usize>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_after: None,
        }
    }

    /// A sheet that rejects every append once it holds `rows` rows
    pub fn failing_after(rows: usize) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_after: Some(rows),
        }
    }

    /// Snapshot of the current rows
    pub fn rows(&self) -> Vec<Row> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Row>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn row_values(&self, row: usize) -> Result<Vec<String>> {
        let rows = self.lock();
        let cells = row
            .checked_sub(1)
            .and_then(|i| rows.get(i))
            .cloned()
            .unwrap_or_default();
        Ok(trim_trailing_empty(cells))
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>> {
        let Some(index) = col.checked_sub(1) else {
            return Ok(Vec::new());
        };
        let rows = self.lock();
        let cells = rows
            .iter()
            .map(|r| r.get(index).cloned().unwrap_or_default())
            .collect();
        Ok(trim_trailing_empty(cells))
    }

    async fn append_row(&self, row: &Row) -> Result<()> {
        let mut rows = self.lock();
        if self.fail_after.is_some_and(|limit| rows.len() >= limit) {
            bail!("Sheet rejected append at row {}", rows.len() + 1);
        }
        rows.push(row.clone());
        Ok(())
    }
}

use crate::models::Row;
use crate::sheets::{trim_trailing_empty, SheetStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, SeekFrom};
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Worksheet backed by a local CSV file
#[derive(Debug, Clone)]
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    /// The file is created on the first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_rows(&self) -> Result<Vec<Row>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", self.path.display()))
            }
        };

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("Failed to read {}", self.path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

fn encode_row(row: &Row) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(row)?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to encode CSV row: {}", e.error()))
}

#[async_trait]
impl SheetStore for CsvSheet {
    async fn row_values(&self, row: usize) -> Result<Vec<String>> {
        let rows = self.read_rows().await?;
        let cells = row
            .checked_sub(1)
            .and_then(|i| rows.into_iter().nth(i))
            .unwrap_or_default();
        Ok(trim_trailing_empty(cells))
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>> {
        let Some(index) = col.checked_sub(1) else {
            return Ok(Vec::new());
        };
        let cells = self
            .read_rows()
            .await?
            .into_iter()
            .map(|mut r| if index < r.len() { r.swap_remove(index) } else { String::new() })
            .collect();
        Ok(trim_trailing_empty(cells))
    }

    async fn append_row(&self, row: &Row) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {} for append", self.path.display()))?;

        let mut bytes = Vec::new();
        // a last line without terminator would swallow the new row
        if file.metadata().await?.len() > 0 {
            file.seek(SeekFrom::End(-1)).await?;
            if file.read_u8().await? != b'\n' {
                bytes.push(b'\n');
            }
        }
        bytes.extend(encode_row(row)?);

        file.write_all(&bytes)
            .await
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let sheet = CsvSheet::new(dir.path().join("cars.csv"));

        assert!(sheet.row_values(1).await.unwrap().is_empty());
        assert!(sheet.col_values(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appended_rows_read_back() {
        let dir = TempDir::new().unwrap();
        let sheet = CsvSheet::new(dir.path().join("out").join("cars.csv"));

        let header: Row = vec!["Title".into(), "URL".into()];
        let row: Row = vec!["Toyota, IST".into(), "https://x/1".into()];
        sheet.append_row(&header).await.unwrap();
        sheet.append_row(&row).await.unwrap();

        assert_eq!(sheet.row_values(1).await.unwrap(), header);
        assert_eq!(sheet.row_values(2).await.unwrap(), row);
        assert_eq!(sheet.col_values(2).await.unwrap(), vec!["URL", "https://x/1"]);
    }

    #[tokio::test]
    async fn append_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cars.csv");
        std::fs::write(&path, "Title,URL\nOld car,https://riyasewana.com/buy/a").unwrap();
        let sheet = CsvSheet::new(&path);

        let row: Row = vec!["New car".into(), "https://riyasewana.com/buy/b".into()];
        sheet.append_row(&row).await.unwrap();

        assert_eq!(
            sheet.col_values(2).await.unwrap(),
            vec![
                "URL",
                "https://riyasewana.com/buy/a",
                "https://riyasewana.com/buy/b"
            ]
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Title,URL\nOld car,https://riyasewana.com/buy/a\nNew car,https://riyasewana.com/buy/b\n"
        );
    }
}

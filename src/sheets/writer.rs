use crate::models::{header_row, CarRecord, NumberFormat, Row, URL_COLUMN};
use crate::sheets::SheetStore;
use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info};

/// Append the cars whose URL is not yet in the sheet and return the new rows.
///
/// The URL column is read once up front; rows appended during this call are
/// not added to that snapshot, so a URL repeated within `cars` is written
/// once per occurrence. Appends are independent: on failure the rows already
/// written stay in the sheet.
pub async fn store_cars(
    cars: &[CarRecord],
    sheet: &dyn SheetStore,
    numbers: NumberFormat,
) -> Result<Vec<Row>> {
    let first_row = sheet
        .row_values(1)
        .await
        .context("Failed to read sheet header")?;
    if first_row.is_empty() {
        info!("Sheet is empty, writing header");
        sheet
            .append_row(&header_row())
            .await
            .context("Failed to write sheet header")?;
    }

    let existing_urls: HashSet<String> = sheet
        .col_values(URL_COLUMN)
        .await
        .context("Failed to read existing URLs")?
        .into_iter()
        .collect();
    debug!("{} URLs already in sheet", existing_urls.len());

    let mut newest_additions = Vec::new();
    for car in cars {
        if existing_urls.contains(&car.url) {
            debug!("Skipping known ad {}", car.url);
            continue;
        }

        let row = car.to_row(numbers);
        sheet
            .append_row(&row)
            .await
            .with_context(|| format!("Failed to append row for {}", car.url))?;
        newest_additions.push(row);
    }

    info!(
        "Appended {} of {} cars to sheet",
        newest_additions.len(),
        cars.len()
    );
    Ok(newest_additions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdDetails, HEADER};
    use crate::sheets::MemorySheet;
    use chrono::Utc;

    fn car(url: &str) -> CarRecord {
        CarRecord {
            title: format!("Car {}", url),
            url: url.to_string(),
            image: "//img/1.jpg".to_string(),
            location: "Galle".to_string(),
            price: "Rs. 1,000".to_string(),
            mileage: "10 km".to_string(),
            details: AdDetails::default(),
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn writes_header_into_empty_sheet() {
        let sheet = MemorySheet::new();
        let added = store_cars(&[car("a")], &sheet, NumberFormat::DigitsOnly)
            .await
            .unwrap();

        let rows = sheet.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], HEADER.to_vec());
        assert_eq!(added, vec![rows[1].clone()]);
        assert_eq!(rows[1][4], "1000");
    }

    #[tokio::test]
    async fn keeps_existing_header() {
        let sheet = MemorySheet::with_rows(vec![header_row()]);
        store_cars(&[car("a")], &sheet, NumberFormat::DigitsOnly)
            .await
            .unwrap();
        assert_eq!(sheet.rows().len(), 2);
    }

    #[tokio::test]
    async fn second_run_appends_nothing() {
        let sheet = MemorySheet::new();
        let cars = [car("a"), car("b")];

        let first = store_cars(&cars, &sheet, NumberFormat::DigitsOnly).await.unwrap();
        let second = store_cars(&cars, &sheet, NumberFormat::DigitsOnly).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(sheet.rows().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_within_batch_written_twice() {
        let sheet = MemorySheet::new();
        let added = store_cars(&[car("a"), car("a")], &sheet, NumberFormat::DigitsOnly)
            .await
            .unwrap();
        assert_eq!(added.len(), 2);
    }

    #[tokio::test]
    async fn failed_append_keeps_earlier_rows() {
        // header plus one car succeed, the second car fails
        let sheet = MemorySheet::failing_after(2);
        let result = store_cars(&[car("a"), car("b")], &sheet, NumberFormat::DigitsOnly).await;

        assert!(result.is_err());
        let rows = sheet.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "a");
    }
}

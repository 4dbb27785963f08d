use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A spreadsheet row, one cell per column
pub type Row = Vec<String>;

/// Column headers of the sheet, in persisted order
pub const HEADER: [&str; 16] = [
    "Title",
    "URL",
    "Image",
    "Location",
    "Price",
    "Mileage",
    "Make",
    "Model",
    "Year of Manufacture",
    "Mileage (km)",
    "Gear",
    "Fuel Type",
    "Options",
    "Engine (cc)",
    "Contact",
    "Details",
];

/// 1-based index of the URL column, the dedup key
pub const URL_COLUMN: usize = 2;

/// How numeric-looking columns are written to the sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberFormat {
    /// Keep only ASCII digits ("Rs. 5,650,000" -> "5650000")
    #[default]
    DigitsOnly,
    /// Store the scraped text unchanged
    Verbatim,
}

impl NumberFormat {
    fn apply(self, value: &str) -> String {
        match self {
            NumberFormat::DigitsOnly => value.chars().filter(|c| c.is_ascii_digit()).collect(),
            NumberFormat::Verbatim => value.to_string(),
        }
    }
}

/// Labelled rows of the advertisement attribute table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Make,
    Model,
    YearOfManufacture,
    MileageKm,
    Gear,
    FuelType,
    Options,
    EngineCc,
    Details,
    Contact,
}

impl DetailField {
    pub const ALL: [DetailField; 10] = [
        DetailField::Make,
        DetailField::Model,
        DetailField::YearOfManufacture,
        DetailField::MileageKm,
        DetailField::Gear,
        DetailField::FuelType,
        DetailField::Options,
        DetailField::EngineCc,
        DetailField::Details,
        DetailField::Contact,
    ];

    /// Text of the label cell on the detail page
    pub fn label(self) -> &'static str {
        match self {
            DetailField::Make => "Make",
            DetailField::Model => "Model",
            DetailField::YearOfManufacture => "YOM",
            DetailField::MileageKm => "Mileage (km)",
            DetailField::Gear => "Gear",
            DetailField::FuelType => "Fuel Type",
            DetailField::Options => "Options",
            DetailField::EngineCc => "Engine (cc)",
            DetailField::Details => "Details",
            DetailField::Contact => "Contact",
        }
    }
}

/// Fields read from a single advertisement page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_manufacture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage_km: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl AdDetails {
    pub fn get(&self, field: DetailField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: DetailField, value: String) {
        *self.slot_mut(field) = Some(value);
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        DetailField::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, field: DetailField) -> &Option<String> {
        match field {
            DetailField::Make => &self.make,
            DetailField::Model => &self.model,
            DetailField::YearOfManufacture => &self.year_of_manufacture,
            DetailField::MileageKm => &self.mileage_km,
            DetailField::Gear => &self.gear,
            DetailField::FuelType => &self.fuel_type,
            DetailField::Options => &self.options,
            DetailField::EngineCc => &self.engine_cc,
            DetailField::Details => &self.details,
            DetailField::Contact => &self.contact,
        }
    }

    fn slot_mut(&mut self, field: DetailField) -> &mut Option<String> {
        match field {
            DetailField::Make => &mut self.make,
            DetailField::Model => &mut self.model,
            DetailField::YearOfManufacture => &mut self.year_of_manufacture,
            DetailField::MileageKm => &mut self.mileage_km,
            DetailField::Gear => &mut self.gear,
            DetailField::FuelType => &mut self.fuel_type,
            DetailField::Options => &mut self.options,
            DetailField::EngineCc => &mut self.engine_cc,
            DetailField::Details => &mut self.details,
            DetailField::Contact => &mut self.contact,
        }
    }
}

/// One advertisement: listing-card summary merged with its detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarRecord {
    pub title: String,
    pub url: String,
    pub image: String,
    pub location: String,
    pub price: String,
    pub mileage: String,
    #[serde(flatten)]
    pub details: AdDetails,
    pub scraped_at: DateTime<Utc>,
}

impl CarRecord {
    /// Project the record into the fixed 16-column sheet order.
    ///
    /// The listing stores protocol-relative image paths, so the image cell
    /// is always prefixed with `https:`.
    pub fn to_row(&self, numbers: NumberFormat) -> Row {
        let detail = |field| self.details.get(field).unwrap_or_default().to_string();
        let numeric = |field| numbers.apply(self.details.get(field).unwrap_or_default());

        vec![
            self.title.clone(),
            self.url.clone(),
            format!("https:{}", self.image),
            self.location.clone(),
            numbers.apply(&self.price),
            numbers.apply(&self.mileage),
            detail(DetailField::Make),
            detail(DetailField::Model),
            numeric(DetailField::YearOfManufacture),
            numeric(DetailField::MileageKm),
            detail(DetailField::Gear),
            detail(DetailField::FuelType),
            detail(DetailField::Options),
            numeric(DetailField::EngineCc),
            detail(DetailField::Contact),
            detail(DetailField::Details),
        ]
    }
}

/// The header as an owned row
pub fn header_row() -> Row {
    HEADER.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CarRecord {
        let mut details = AdDetails::default();
        details.set(DetailField::Make, "Toyota".to_string());
        details.set(DetailField::Model, "IST".to_string());
        details.set(DetailField::YearOfManufacture, "2007".to_string());
        details.set(DetailField::MileageKm, "98,000 km".to_string());
        details.set(DetailField::EngineCc, "1300 cc".to_string());
        details.set(DetailField::Contact, "077 123 4567".to_string());

        CarRecord {
            title: "Toyota IST 2007".to_string(),
            url: "https://riyasewana.com/buy/toyota-ist-sale-kandy-123".to_string(),
            image: "//riyasewana.com/uploads/ist.jpg".to_string(),
            location: "Kandy".to_string(),
            price: "Rs. 5,650,000".to_string(),
            mileage: "98000 (km)".to_string(),
            details,
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn row_follows_header_order() {
        let row = sample().to_row(NumberFormat::DigitsOnly);

        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[0], "Toyota IST 2007");
        assert_eq!(row[1], "https://riyasewana.com/buy/toyota-ist-sale-kandy-123");
        assert_eq!(row[2], "https://riyasewana.com/uploads/ist.jpg");
        assert_eq!(row[4], "5650000");
        assert_eq!(row[5], "98000");
        assert_eq!(row[6], "Toyota");
        assert_eq!(row[8], "2007");
        assert_eq!(row[9], "98000");
        assert_eq!(row[13], "1300");
        assert_eq!(row[14], "077 123 4567");
        // absent detail fields become empty cells
        assert_eq!(row[10], "");
        assert_eq!(row[15], "");
    }

    #[test]
    fn verbatim_keeps_scraped_text() {
        let row = sample().to_row(NumberFormat::Verbatim);
        assert_eq!(row[4], "Rs. 5,650,000");
        assert_eq!(row[9], "98,000 km");
        assert_eq!(row[13], "1300 cc");
    }

    #[test]
    fn image_prefix_is_unconditional() {
        let mut car = sample();
        car.image = "https://cdn.example/ist.jpg".to_string();
        let row = car.to_row(NumberFormat::DigitsOnly);
        assert_eq!(row[2], "https:https://cdn.example/ist.jpg");
    }

    #[test]
    fn details_count_present_fields() {
        let car = sample();
        assert_eq!(car.details.len(), 6);
        assert!(AdDetails::default().is_empty());
    }

    #[test]
    fn json_flattens_details_and_skips_missing() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["make"], "Toyota");
        assert_eq!(json["title"], "Toyota IST 2007");
        assert!(json.get("gear").is_none());
    }
}

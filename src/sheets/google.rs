use crate::models::Row;
use crate::sheets::{trim_trailing_empty, SheetStore};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

const SHEETS_API: &str = "https://sheets.googleapis.com";
const DRIVE_API: &str = "https://www.googleapis.com";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Base URLs of the Google APIs used by [`GoogleSheet`]
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub sheets: String,
    pub drive: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            sheets: SHEETS_API.to_string(),
            drive: DRIVE_API.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// One worksheet of a Google spreadsheet, accessed through the Sheets v4 REST API
pub struct GoogleSheet {
    client: Client,
    token: String,
    endpoints: GoogleEndpoints,
    spreadsheet_id: String,
    worksheet: String,
}

impl GoogleSheet {
    /// Open a worksheet by spreadsheet name and worksheet name
    pub async fn open(spreadsheet: &str, worksheet: &str, token: &str) -> Result<Self> {
        Self::open_with(GoogleEndpoints::default(), spreadsheet, worksheet, token).await
    }

    pub async fn open_with(
        endpoints: GoogleEndpoints,
        spreadsheet: &str,
        worksheet: &str,
        token: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let spreadsheet_id = find_spreadsheet(&client, &endpoints, spreadsheet, token).await?;
        info!(
            "Opened spreadsheet '{}' ({}), worksheet '{}'",
            spreadsheet, spreadsheet_id, worksheet
        );

        Ok(Self {
            client,
            token: token.to_string(),
            endpoints,
            spreadsheet_id,
            worksheet: worksheet.to_string(),
        })
    }

    /// A1 range on this worksheet, e.g. `'Cars'!B:B`
    fn range(&self, a1: &str) -> String {
        format!("'{}'!{}", self.worksheet.replace('\'', "''"), a1)
    }

    /// `values/{range}` URL; `range` may carry a `:method` suffix
    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoints.sheets)
            .with_context(|| format!("Invalid Sheets API URL {}", self.endpoints.sheets))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn get_values(&self, a1: &str, major_dimension: &str) -> Result<Vec<String>> {
        let range = self.range(a1);
        debug!("Reading {} ({})", range, major_dimension);

        let response = self
            .client
            .get(self.values_url(&range)?)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", major_dimension)])
            .send()
            .await
            .with_context(|| format!("Failed to read {}", range))?
            .error_for_status()
            .with_context(|| format!("Sheets API rejected read of {}", range))?;

        let values: ValueRange = response
            .json()
            .await
            .context("Failed to decode Sheets API response")?;
        let cells = values.values.into_iter().next().unwrap_or_default();
        Ok(trim_trailing_empty(cells))
    }
}

async fn find_spreadsheet(
    client: &Client,
    endpoints: &GoogleEndpoints,
    name: &str,
    token: &str,
) -> Result<String> {
    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        name.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME
    );

    let response = client
        .get(format!("{}/drive/v3/files", endpoints.drive.trim_end_matches('/')))
        .bearer_auth(token)
        .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
        .send()
        .await
        .context("Failed to search Drive for spreadsheet")?
        .error_for_status()
        .context("Drive API rejected spreadsheet search")?;

    let list: FileList = response
        .json()
        .await
        .context("Failed to decode Drive API response")?;

    match list.files.into_iter().next() {
        Some(file) => Ok(file.id),
        None => bail!("Spreadsheet '{}' not found", name),
    }
}

/// Column number to A1 letters (1 -> A, 27 -> AA)
fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[async_trait]
impl SheetStore for GoogleSheet {
    async fn row_values(&self, row: usize) -> Result<Vec<String>> {
        self.get_values(&format!("{0}:{0}", row), "ROWS").await
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>> {
        let letters = column_letters(col);
        self.get_values(&format!("{0}:{0}", letters), "COLUMNS").await
    }

    async fn append_row(&self, row: &Row) -> Result<()> {
        let range = self.range("A1");
        let url = self.values_url(&format!("{}:append", range))?;

        self.client
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .context("Failed to append row")?
            .error_for_status()
            .context("Sheets API rejected append")?;
        Ok(())
    }
}

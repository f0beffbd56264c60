//! Persistence stage: record validation and the spreadsheet append call.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Google Sheets v4 values endpoint used when no override is configured.
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Target range appended to. The schema is implicit in the column order.
pub const DEFAULT_RANGE: &str = "Sheet1!A:F";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One finished record, the union of the content and analysis payloads.
///
/// Missing fields deserialize to empty strings so validation can report them
/// instead of the framework rejecting the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub author_name: String,
    pub text: String,
    pub sentiment: String,
    pub summary: String,
    pub analyzed_at: String,
    pub source_url: String,
}

impl Record {
    /// Order the record as one sheet row:
    /// `[authorName, text, sentiment, summary, analyzedAt, sourceUrl]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.author_name.clone(),
            self.text.clone(),
            self.sentiment.clone(),
            self.summary.clone(),
            self.analyzed_at.clone(),
            self.source_url.clone(),
        ]
    }
}

/// Narrow interface over the tabular append provider, so the stage is
/// testable against fakes without a network.
#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    /// Append exactly one row to the target range. Calling this twice with
    /// the same row appends two rows.
    async fn append_row(&self, row: Vec<String>) -> Result<serde_json::Value>;
}

/// HTTP client appending rows to a fixed spreadsheet range.
pub struct SheetsClient {
    api_url: String,
    token: String,
    spreadsheet_id: String,
    range: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }
}

#[async_trait::async_trait]
impl RowSink for SheetsClient {
    async fn append_row(&self, row: Vec<String>) -> Result<serde_json::Value> {
        // USER_ENTERED lets the sheet infer value types from the cell text.
        let request_url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.api_url, self.spreadsheet_id, self.range
        );

        let req_body = AppendRequest { values: vec![row] };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&request_url)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .map_err(|_| PipelineError::Unavailable("sheet append request timed out".to_string()))?
        .map_err(|e| PipelineError::Unavailable(format!("sheet append request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(PipelineError::Permission(
                "permission denied; the service account needs edit access to the sheet".to_string(),
            ));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound(
                "spreadsheet not found; check the spreadsheet id and sheet name".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(PipelineError::Unavailable(format!(
                "sheet append returned status {}",
                status
            )));
        }

        let data = response.json::<serde_json::Value>().await.map_err(|e| {
            PipelineError::Unavailable(format!("failed to parse sheet append response: {}", e))
        })?;

        info!(spreadsheet = %self.spreadsheet_id, range = %self.range, "row appended to sheet");
        Ok(data)
    }
}

#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

/// Validate and append one record to the sheet.
///
/// Returns the provider's raw append response. The operation is not
/// idempotent; a second call with the same record appends a second row.
pub async fn append_record<S: RowSink + ?Sized>(
    sink: &S,
    record: &Record,
) -> Result<serde_json::Value> {
    validate_record(record)?;
    sink.append_row(record.to_row()).await
}

/// All six fields must be present and non-empty before any network call.
fn validate_record(record: &Record) -> Result<()> {
    let fields = [
        ("authorName", &record.author_name),
        ("text", &record.text),
        ("sentiment", &record.sentiment),
        ("summary", &record.summary),
        ("analyzedAt", &record.analyzed_at),
        ("sourceUrl", &record.source_url),
    ];

    for (name, value) in fields {
        if value.is_empty() {
            return Err(PipelineError::Validation(format!(
                "missing required field for the sheet row: {}",
                name
            )));
        }
    }
    Ok(())
}

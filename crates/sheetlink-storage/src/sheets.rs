mod api;
pub mod auth;

pub use auth::{
    ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
    DEFAULT_TOKEN_URI, SPREADSHEETS_SCOPE,
};

use api::{AppendBody, AppendResponse, BatchGetResponse};
use async_trait::async_trait;
use reqwest::Url;
use sheetlink_core::error::{Result, StorageError};
use sheetlink_core::{Row, SheetRange, TabularStore};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// How the Sheets API interprets appended cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Cells are stored verbatim as text.
    #[default]
    Raw,
    /// Cells are parsed as if typed into the sheet UI, so URLs and numbers
    /// may be reformatted.
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

impl Display for ValueInputOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of the table inside a spreadsheet.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SheetsConfig {
    #[builder(setter(into))]
    spreadsheet_id: String,
    #[builder(default)]
    range: SheetRange,
    #[builder(default)]
    value_input: ValueInputOption,
    #[builder(default = DEFAULT_API_BASE.to_string(), setter(into))]
    api_base: String,
}

impl SheetsConfig {
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn range(&self) -> &SheetRange {
        &self.range
    }
}

/// A table backed by a range of a Google Sheets spreadsheet.
///
/// Appends go through `values.append` and reads through `values.batchGet`.
/// Each call fetches a bearer token from the [`TokenProvider`] and performs
/// one request; nothing is retried.
#[derive(Clone)]
pub struct SheetsTable {
    client: reqwest::Client,
    config: SheetsConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsTable {
    pub fn new(
        client: reqwest::Client,
        config: SheetsConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
        }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Builds `{api_base}/v4/spreadsheets/{id}/{tail...}`.
    fn spreadsheet_url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            StorageError::Configuration(format!("invalid api base '{}': {e}", self.config.api_base))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                StorageError::Configuration(format!(
                    "api base '{}' cannot carry a path",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.config.spreadsheet_id.as_str()])
            .extend(tail);

        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(api::transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api::status_error(status, &body))
    }
}

impl std::fmt::Debug for SheetsTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsTable")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TabularStore for SheetsTable {
    async fn append(&self, row: Row) -> Result<()> {
        let range = self.config.range.to_string();
        let url = self.spreadsheet_url(&["values", &format!("{range}:append")])?;
        trace!(%url, cells = row.len(), "appending row");

        let body = AppendBody {
            range,
            major_dimension: "ROWS",
            values: [&row],
        };
        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", self.config.value_input.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body);

        let response: AppendResponse = match self.send(request).await?.json().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "cannot decode append response");
                AppendResponse::default()
            }
        };

        let updated_range = response
            .updates
            .and_then(|u| u.updated_range)
            .unwrap_or_default();
        debug!(%updated_range, "row appended");
        Ok(())
    }

    async fn read_range(&self) -> Result<Vec<Option<Row>>> {
        let range = self.config.range.to_string();
        let url = self.spreadsheet_url(&["values:batchGet"])?;
        trace!(%url, %range, "reading range");

        let request = self
            .client
            .get(url)
            .query(&[("ranges", range.as_str()), ("majorDimension", "ROWS")]);

        let response: BatchGetResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(api::transport_error)?;

        let rows = response
            .value_ranges
            .into_iter()
            .next()
            .map(api::ValueRange::into_rows)
            .unwrap_or_default();

        debug!(rows = rows.len(), "range read");
        Ok(rows)
    }
}

use super::{SheetSource, SheetValues, ValuesResponse};
use crate::config::SourceConfig;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Reads a sheet through the Sheets API v4 `values` endpoint with an API key.
/// The sheet must be shared as "anyone with the link can view".
pub struct GoogleSheetsSource {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    api_key: String,
}

impl GoogleSheetsSource {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ReportError::Config("source.spreadsheet_id is not set".to_string())
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            spreadsheet_id,
            sheet_name: config.sheet_name.clone(),
            api_key,
        })
    }

    /// Endpoint URL without the key, safe to log.
    pub fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ReportError::Config(format!("invalid source.base_url '{}': {}", self.base_url, e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ReportError::Config(format!("source.base_url '{}' cannot take a path", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .push(&self.spreadsheet_id)
                .push("values")
                .push(&self.sheet_name);
        }
        Ok(url)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    fn describe(&self) -> String {
        format!("sheet '{}' of spreadsheet {}", self.sheet_name, self.spreadsheet_id)
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<SheetValues> {
        let url = self.values_url()?;
        info!(url = %url, sheet = %self.sheet_name, "fetching sheet values");

        // reqwest errors carry the request URL, key included
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), "sheet request failed");
            return Err(err);
        }

        let body: ValuesResponse = response.json().await.map_err(reqwest::Error::without_url)?;
        let values = SheetValues::from_response(body);
        info!(
            rows = values.rows.len(),
            columns = values.headers.len(),
            "fetched sheet values"
        );
        Ok(values)
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Maps a non-success response to an error, preferring the API's own message.
pub(crate) fn status_error(status: u16, body: &str) -> ReportError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY_CHARS).collect());
    match status {
        401 | 403 => ReportError::Auth { status, message },
        404 => ReportError::NotFound { status, message },
        _ => ReportError::Api { status, message },
    }
}

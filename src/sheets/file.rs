use super::{SheetSource, SheetValues, ValuesResponse};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A saved Sheets API response, or a bare array of rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum FilePayload {
    Rows(Vec<Vec<Value>>),
    Response(ValuesResponse),
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<SheetValues> {
        let payload: FilePayload = serde_json::from_slice(bytes)?;
        let response = match payload {
            FilePayload::Rows(values) => ValuesResponse { range: None, values },
            FilePayload::Response(response) => response,
        };
        Ok(SheetValues::from_response(response))
    }
}

#[async_trait]
impl SheetSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<SheetValues> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ReportError::Config(format!("Failed to read input file '{}': {}", self.path.display(), e))
        })?;
        let values = Self::parse(&bytes)?;
        info!(
            path = %self.path.display(),
            rows = values.rows.len(),
            columns = values.headers.len(),
            "loaded sheet export"
        );
        Ok(values)
    }
}

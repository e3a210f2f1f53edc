//! Sources of spreadsheet values. Every source yields the header row and the
//! data rows as plain strings.

pub mod file;
pub mod google;

pub use file::JsonFileSource;
pub use google::GoogleSheetsSource;

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Body of a Sheets API `values` response. Local exports use the same shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuesResponse {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetValues {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetValues {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Splits the first row off as the header row.
    pub fn from_rows(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let rows = values.split_off(1);
        let headers = values.pop().unwrap_or_default();
        Self { headers, rows }
    }

    pub fn from_response(response: ValuesResponse) -> Self {
        Self::from_rows(
            response
                .values
                .iter()
                .map(|row| row.iter().map(coerce_cell).collect())
                .collect(),
        )
    }

    /// True when there are no data rows, even if a header row exists.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Best-effort string form of a cell; the API normally returns formatted
/// strings but exports may carry raw numbers or nulls.
fn coerce_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Short human-readable name for logs and error messages.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<SheetValues>;
}

/// Values held in memory; used by tests and for re-rendering fetched data.
pub struct InMemorySource {
    values: SheetValues,
}

impl InMemorySource {
    pub fn new(values: SheetValues) -> Self {
        Self { values }
    }
}

#[async_trait]
impl SheetSource for InMemorySource {
    fn describe(&self) -> String {
        "in-memory sheet".to_string()
    }

    async fn fetch(&self) -> Result<SheetValues> {
        Ok(self.values.clone())
    }
}

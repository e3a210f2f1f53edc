use crate::constants::{
    DEFAULT_API_KEY_ENV, DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_SHEETS_BASE_URL,
    DEFAULT_SHEET_NAME, DEFAULT_SUBTITLE, DEFAULT_TIMEOUT_SECONDS, DEFAULT_TITLE, DEFAULT_TOP_N,
    SUBJECT_SLOTS,
};
use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub report: ReportConfig,
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    /// Name of the environment variable holding the Sheets API key.
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl SourceConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.api_key_env)?;
        if key.trim().is_empty() {
            return Err(ReportError::Config(format!(
                "environment variable {} is empty",
                self.api_key_env
            )));
        }
        Ok(key)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub subtitle: String,
    pub output: PathBuf,
    pub background_image: Option<String>,
    /// Write an all-empty report instead of failing when the sheet has no data rows.
    pub allow_empty: bool,
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            background_image: None,
            allow_empty: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// How logical fields are located in the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ColumnsConfig {
    /// Fixed zero-based column positions.
    Indices(IndexLayout),
    /// Columns found by their cleaned header text.
    Headers(HeaderLayout),
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig::Indices(IndexLayout::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SlotIndices {
    pub name: Option<usize>,
    pub sex: Option<usize>,
    pub age: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexLayout {
    pub timestamp: Option<usize>,
    pub email: Option<usize>,
    pub municipality: Option<usize>,
    pub school_level: Option<usize>,
    pub school_name: Option<usize>,
    pub discipline: Option<usize>,
    pub topic: Option<usize>,
    pub document: Option<usize>,
    #[serde(default)]
    pub subjects: Vec<SlotIndices>,
}

impl Default for IndexLayout {
    /// Layout of the registration form: three students, seven columns apart.
    fn default() -> Self {
        let slot = |first: usize| SlotIndices {
            name: Some(first),
            sex: Some(first + 1),
            age: Some(first + 2),
        };
        Self {
            timestamp: Some(0),
            email: Some(1),
            municipality: Some(2),
            school_level: Some(3),
            school_name: Some(4),
            discipline: Some(5),
            topic: Some(6),
            document: Some(28),
            subjects: vec![slot(7), slot(14), slot(21)],
        }
    }
}

/// Header names are matched after cleaning, ignoring case. Slot `n > 1` of a
/// subject field uses the deduplicated name `base_{n-1}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaderLayout {
    pub timestamp: Option<String>,
    pub email: Option<String>,
    pub municipality: Option<String>,
    pub school_level: Option<String>,
    pub school_name: Option<String>,
    pub discipline: Option<String>,
    pub topic: Option<String>,
    pub document: Option<String>,
    pub subject_name: String,
    pub subject_sex: Option<String>,
    pub subject_age: Option<String>,
}

impl Config {
    /// Loads `path`, or `config.toml` when present, or the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default_path.exists() {
                    debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let ColumnsConfig::Indices(layout) = &self.columns {
            if layout.subjects.len() > SUBJECT_SLOTS {
                return Err(ReportError::Config(format!(
                    "at most {} subject slots are supported, got {}",
                    SUBJECT_SLOTS,
                    layout.subjects.len()
                )));
            }
        }
        if self.report.top_n == 0 {
            return Err(ReportError::Config("report.top_n must be at least 1".into()));
        }
        Ok(())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sheet access denied (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Sheet not found (HTTP {status}): {message}")]
    NotFound { status: u16, message: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Sheet is empty: {0}")]
    EmptySheet(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ReportError {
    /// Operator-facing hint for fetch failures, shown after the error itself.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ReportError::Auth { .. } => Some(
                "Share the sheet as 'Anyone with the link can view' and confirm the Sheets API is enabled for the key's project.",
            ),
            ReportError::NotFound { .. } => {
                Some("Check the spreadsheet id and the sheet (tab) name.")
            }
            ReportError::EmptySheet(_) => {
                Some("Pass --allow-empty (or set report.allow_empty) to write an empty report anyway.")
            }
            ReportError::Env(_) => Some("Set the API key variable in the environment or in .env."),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

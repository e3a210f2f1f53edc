//! Constants shared by the normalizer, aggregator and renderer.

/// Number of student slots the registration form repeats per submission.
pub const SUBJECT_SLOTS: usize = 3;

/// Display value for a missing cell in the detail table.
pub const MISSING: &str = "N/A";

/// Leading entry of every filter option list.
pub const ALL_OPTION: &str = "All";

/// Bar and pie charts keep this many categories unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_OUTPUT_PATH: &str = "index.html";
pub const DEFAULT_SHEET_NAME: &str = "dadus";
pub const DEFAULT_API_KEY_ENV: &str = "SHEETS_API_KEY";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_TITLE: &str = "Relatóriu Atuál Progresu Rejistrasaun Selebrasaun LMSM 2025";
pub const DEFAULT_SUBTITLE: &str = "SESIM-KNTLU";

/// Environment variable naming a Prometheus Pushgateway for run metrics.
pub const PUSHGATEWAY_ENV: &str = "SURVEY_PUSHGATEWAY_URL";
pub const PUSHGATEWAY_JOB: &str = "survey_dashboard";

//! Registration survey dashboard: fetches form responses from a spreadsheet,
//! reshapes them into per-student records, aggregates demographic figures and
//! renders a static HTML report.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod sheets;

pub use aggregate::{Aggregator, DashboardSummary};
pub use config::Config;
pub use error::{ReportError, Result};
pub use normalize::{ColumnMapping, RowNormalizer, SubjectRecord};
pub use pipeline::{PipelineResult, ReportPipeline};

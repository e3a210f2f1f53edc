use crate::aggregate::{Aggregator, DashboardSummary};
use crate::config::{ColumnsConfig, Config};
use crate::error::{ReportError, Result};
use crate::normalize::{ColumnMapping, NormalizeStats, RowNormalizer};
use crate::observability;
use crate::report::ReportRenderer;
use crate::sheets::{SheetSource, SheetValues};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub source: String,
    pub stats: NormalizeStats,
    pub output_file: Option<String>,
    pub duration_secs: f64,
}

/// Normalizes and aggregates already fetched values.
pub fn summarize(
    values: &SheetValues,
    columns: &ColumnsConfig,
    top_n: usize,
) -> Result<(DashboardSummary, NormalizeStats)> {
    let mapping = ColumnMapping::resolve(columns, &values.headers)?;
    let normalizer = RowNormalizer::new(mapping);
    let (rows, stats) = normalizer.normalize_all(&values.rows);
    let summary = Aggregator::new(top_n).aggregate(&rows);
    Ok((summary, stats))
}

pub struct ReportPipeline {
    config: Config,
}

impl ReportPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches the sheet and builds the summary without rendering.
    ///
    /// A sheet without data rows fails with [`ReportError::EmptySheet`] unless
    /// `report.allow_empty` is set, in which case the empty summary is returned.
    #[instrument(skip_all, fields(source = %source.describe()))]
    pub async fn build_summary(
        &self,
        source: &dyn SheetSource,
    ) -> Result<(DashboardSummary, NormalizeStats)> {
        let values = source.fetch().await?;

        if values.is_empty() {
            if !self.config.report.allow_empty {
                return Err(ReportError::EmptySheet(format!(
                    "{} has no data rows",
                    source.describe()
                )));
            }
            warn!("sheet has no data rows; building an empty report");
            return Ok((DashboardSummary::empty(), NormalizeStats::default()));
        }

        summarize(&values, &self.config.columns, self.config.report.top_n)
    }

    /// Fetch, normalize, aggregate, render and write the report.
    #[instrument(skip_all, fields(source = %source.describe()))]
    pub async fn run(&self, source: &dyn SheetSource) -> Result<PipelineResult> {
        let start = Instant::now();
        let (summary, stats) = self.build_summary(source).await?;

        let output = &self.config.report.output;
        ReportRenderer::from_config(&self.config.report).write(&summary, output)?;

        let result = PipelineResult {
            source: source.describe(),
            stats,
            output_file: Some(output.display().to_string()),
            duration_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            submissions = result.stats.rows,
            subjects = result.stats.subjects,
            duration_secs = result.duration_secs,
            "pipeline finished"
        );

        observability::push_run_metrics(&result).await;
        Ok(result)
    }
}

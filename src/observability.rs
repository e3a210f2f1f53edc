//! Optional run metrics for scheduled report builds, pushed to a Prometheus
//! Pushgateway when `SURVEY_PUSHGATEWAY_URL` is set.

use crate::constants::{PUSHGATEWAY_ENV, PUSHGATEWAY_JOB};
use crate::pipeline::PipelineResult;
use tracing::{info, warn};

/// Text exposition body for one finished run.
pub fn render_run_metrics(result: &PipelineResult, timestamp_secs: i64) -> String {
    format!(
        "# TYPE survey_dashboard_submissions gauge\n\
         survey_dashboard_submissions {}\n\
         # TYPE survey_dashboard_subjects gauge\n\
         survey_dashboard_subjects {}\n\
         # TYPE survey_dashboard_empty_slots gauge\n\
         survey_dashboard_empty_slots {}\n\
         # TYPE survey_dashboard_unparsed_ages gauge\n\
         survey_dashboard_unparsed_ages {}\n\
         # TYPE survey_dashboard_duration_seconds gauge\n\
         survey_dashboard_duration_seconds {}\n\
         # TYPE survey_dashboard_last_run_timestamp_seconds gauge\n\
         survey_dashboard_last_run_timestamp_seconds {}\n",
        result.stats.rows,
        result.stats.subjects,
        result.stats.empty_slots,
        result.stats.unparsed_ages,
        result.duration_secs,
        timestamp_secs
    )
}

/// Pushes run metrics if a Pushgateway is configured. Never fails the run.
pub async fn push_run_metrics(result: &PipelineResult) {
    let base = match std::env::var(PUSHGATEWAY_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let push_url = format!("{}/metrics/job/{}", base.trim_end_matches('/'), PUSHGATEWAY_JOB);
    let body = render_run_metrics(result, chrono::Utc::now().timestamp());

    let client = reqwest::Client::new();
    let push_res = client
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await;

    match push_res {
        Ok(r) if r.status().is_success() => {
            info!("pushed run metrics to Pushgateway");
        }
        Ok(r) => {
            warn!("Pushgateway push responded with status {}", r.status().as_u16());
        }
        Err(e) => {
            warn!("Pushgateway push failed: {}", e);
        }
    }
}

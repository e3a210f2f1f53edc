//! Renders the dashboard summary into one self-contained HTML page.

use crate::aggregate::DashboardSummary;
use crate::config::ReportConfig;
use crate::error::Result;
use askama::Template;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub generated_at: String,
    pub background_image: Option<&'a str>,
    /// Summary JSON, already safe to place inside a `<script>` element.
    pub data_json: String,
}

pub struct ReportRenderer {
    title: String,
    subtitle: String,
    background_image: Option<String>,
}

impl ReportRenderer {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            background_image: None,
        }
    }

    pub fn with_background_image(mut self, image: impl Into<String>) -> Self {
        self.background_image = Some(image.into());
        self
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        let renderer = Self::new(&config.title, &config.subtitle);
        match &config.background_image {
            Some(image) if !image.trim().is_empty() => renderer.with_background_image(image.trim()),
            _ => renderer,
        }
    }

    pub fn render(&self, summary: &DashboardSummary) -> Result<String> {
        self.render_at(summary, Local::now())
    }

    pub fn render_at(&self, summary: &DashboardSummary, generated_at: DateTime<Local>) -> Result<String> {
        let template = DashboardTemplate {
            title: &self.title,
            subtitle: &self.subtitle,
            generated_at: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            background_image: self.background_image.as_deref(),
            data_json: embed_json(summary)?,
        };
        Ok(template.render()?)
    }

    /// Renders and writes the report, creating parent directories as needed.
    pub fn write(&self, summary: &DashboardSummary, path: &Path) -> Result<()> {
        let html = self.render(summary)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &html)?;
        info!(path = %path.display(), bytes = html.len(), "wrote report");
        Ok(())
    }
}

/// Serializes the summary for inline embedding; `</` is escaped so cell text
/// can never close the surrounding script element.
pub fn embed_json(summary: &DashboardSummary) -> Result<String> {
    Ok(serde_json::to_string(summary)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DetailRow;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 20, 14, 30, 0).unwrap()
    }

    #[test]
    fn renders_title_and_embedded_data() {
        let renderer = ReportRenderer::new("Registration <2025>", "Office");
        let html = renderer.render_at(&DashboardSummary::empty(), fixed_time()).unwrap();
        assert!(html.contains("Registration &lt;2025&gt;"));
        assert!(html.contains("\"allMunicipalityOptions\":[\"All\"]"));
        assert!(html.contains("2025-05-20 14:30"));
        assert!(!html.contains("background-image"));
    }

    #[test]
    fn background_image_adds_css() {
        let renderer = ReportRenderer::new("T", "S").with_background_image("AY1A8030.jpg");
        let html = renderer.render_at(&DashboardSummary::empty(), fixed_time()).unwrap();
        assert!(html.contains("background-image: url('AY1A8030.jpg')"));
    }

    #[test]
    fn script_closing_tags_in_cells_are_escaped() {
        let mut summary = DashboardSummary::empty();
        summary.detailed_table_data.push(DetailRow {
            id: "0-1".into(),
            timestamp: "N/A".into(),
            municipality: "Dili".into(),
            school_level: "N/A".into(),
            school_name: "</script><b>x".into(),
            subject_name: "Ana".into(),
            sex: "F".into(),
            age: "8".into(),
            discipline: "N/A".into(),
            topic: "N/A".into(),
            document: "N/A".into(),
        });
        let json = embed_json(&summary).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("<\\/script>"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("index.html");
        ReportRenderer::new("T", "S")
            .write(&DashboardSummary::empty(), &path)
            .unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}

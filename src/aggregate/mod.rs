//! Builds the dashboard summary from normalized rows.
//!
//! Submission-level figures (municipality, discipline, school level, the
//! municipality × school table) count each form submission once. Gender and
//! age figures count each registered student.

pub mod summary;
pub mod tally;

pub use summary::{ChartSeries, CrossTabRow, DashboardSummary, DetailRow, GenderChart};
pub use tally::Tally;

use crate::constants::{ALL_OPTION, DEFAULT_TOP_N, MISSING};
use crate::normalize::{NormalizedRow, SubjectRecord, Submission};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub struct Aggregator {
    top_n: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { top_n: DEFAULT_TOP_N }
    }
}

impl Aggregator {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn aggregate(&self, rows: &[NormalizedRow]) -> DashboardSummary {
        let mut summary = DashboardSummary::empty();
        if rows.is_empty() {
            return summary;
        }

        let mut acc = Accumulator::default();
        for row in rows {
            acc.add_submission(&row.submission);
            for subject in &row.subjects {
                acc.add_subject(subject);
            }
        }
        acc.finish_into(&mut summary, self.top_n);

        debug!(
            municipalities = summary.total_municipality,
            subjects = summary.total_gender,
            disciplines = summary.total_discipline,
            topics = summary.total_topic,
            "aggregated summary"
        );
        summary
    }
}

#[derive(Default)]
struct Accumulator {
    municipalities: Tally,
    disciplines: Tally,
    school_levels: Tally,
    topics: BTreeSet<String>,
    cross_tab: BTreeMap<(String, String), usize>,
    genders: Tally,
    ages: BTreeMap<u32, usize>,
    municipality_options: BTreeSet<String>,
    school_level_options: BTreeSet<String>,
    details: Vec<DetailRow>,
}

impl Accumulator {
    fn add_submission(&mut self, submission: &Submission) {
        if let Some(municipality) = &submission.municipality {
            self.municipalities.add(municipality);
        }
        if let Some(discipline) = &submission.discipline {
            self.disciplines.add(discipline);
        }
        if let Some(topic) = &submission.topic {
            self.topics.insert(topic.clone());
        }
        if let Some(level) = &submission.school_level {
            self.school_levels.add(level);
        }
        if let (Some(municipality), Some(school)) =
            (&submission.municipality, &submission.school_name)
        {
            *self
                .cross_tab
                .entry((municipality.clone(), school.clone()))
                .or_insert(0) += 1;
        }
    }

    fn add_subject(&mut self, subject: &SubjectRecord) {
        if let Some(sex) = &subject.sex {
            self.genders.add(sex);
        }
        if let Some(years) = subject.age.years {
            *self.ages.entry(years).or_insert(0) += 1;
        }
        if let Some(municipality) = &subject.submission.municipality {
            self.municipality_options.insert(municipality.clone());
        }
        if let Some(level) = &subject.submission.school_level {
            self.school_level_options.insert(level.clone());
        }
        self.details.push(detail_row(subject));
    }

    fn finish_into(self, summary: &mut DashboardSummary, top_n: usize) {
        summary.total_municipality = self.municipalities.len();
        summary.municipality_chart_data = self.municipalities.sorted_by_label();
        summary.municipality_pie_chart_data = self.municipalities.top_n(top_n);

        summary.total_gender = self.genders.total();
        summary.gender_chart_data = gender_chart(&self.genders);

        summary.age_chart_data = ChartSeries {
            labels: self.ages.keys().map(|age| age.to_string()).collect(),
            data: self.ages.values().copied().collect(),
        };
        summary.age_distribution = self.ages;

        summary.school_level_counts = self.school_levels.to_map();
        summary.school_level_chart_data = self.school_levels.sorted_by_label();

        summary.school_municipality_table_data = self
            .cross_tab
            .into_iter()
            .map(|((municipality, school_name), total)| CrossTabRow {
                municipality,
                school_name,
                total,
            })
            .collect();

        summary.total_discipline = self.disciplines.len();
        summary.discipline_counts = self.disciplines.to_map();
        summary.discipline_chart_data = self.disciplines.top_n(top_n);

        summary.total_topic = self.topics.len();

        summary.all_municipality_options = with_all_option(self.municipality_options);
        summary.all_school_level_options = with_all_option(self.school_level_options);

        summary.detailed_table_data = self.details;
    }
}

fn gender_chart(genders: &Tally) -> GenderChart {
    let series = genders.sorted_by_label();
    let total: usize = series.data.iter().sum();
    let percentages = if total > 0 {
        series
            .data
            .iter()
            .map(|&count| format!("{:.1}%", count as f64 / total as f64 * 100.0))
            .collect()
    } else {
        Vec::new()
    };
    GenderChart {
        labels: series.labels,
        data: series.data,
        percentages,
    }
}

fn with_all_option(values: BTreeSet<String>) -> Vec<String> {
    std::iter::once(ALL_OPTION.to_string()).chain(values).collect()
}

fn display(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING.to_string())
}

fn detail_row(subject: &SubjectRecord) -> DetailRow {
    let s = &subject.submission;
    DetailRow {
        id: subject.id.to_string(),
        timestamp: display(&s.timestamp),
        municipality: display(&s.municipality),
        school_level: display(&s.school_level),
        school_name: display(&s.school_name),
        subject_name: subject.name.clone(),
        sex: display(&subject.sex),
        age: subject.age.display().to_string(),
        discipline: display(&s.discipline),
        topic: display(&s.topic),
        document: display(&s.document),
    }
}

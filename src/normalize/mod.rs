//! Turns wide form rows into one submission plus one record per registered
//! student.
//!
//! Normalization never fails: short rows, blank cells and unparsable ages all
//! read as missing values so one bad row cannot stop the batch.

pub mod headers;
pub mod mapping;

pub use headers::{clean_header, clean_headers, dedupe_headers};
pub use mapping::{ColumnMapping, SlotColumns};

use crate::constants::MISSING;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Row-level fields shared by every student registered in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Zero-based index among the data rows (header excluded).
    pub row: usize,
    pub timestamp: Option<String>,
    pub email: Option<String>,
    pub municipality: Option<String>,
    pub school_level: Option<String>,
    pub school_name: Option<String>,
    pub discipline: Option<String>,
    pub topic: Option<String>,
    pub document: Option<String>,
}

/// Identifies a student as (data row, one-based slot); displayed `row-slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubjectId {
    pub row: usize,
    pub slot: usize,
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.slot)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Age {
    /// Cell text as entered, kept for display.
    pub raw: Option<String>,
    /// Whole years when the text is a number that truncates to zero or more.
    pub years: Option<u32>,
}

impl Age {
    pub fn from_cell(raw: Option<String>) -> Self {
        let years = raw.as_deref().and_then(parse_years);
        Self { raw, years }
    }

    pub fn display(&self) -> &str {
        self.raw.as_deref().unwrap_or(MISSING)
    }
}

/// Truncates toward zero, so `-0.5` reads as `0` while `-1` and below are rejected.
fn parse_years(text: &str) -> Option<u32> {
    let value: f64 = text.parse().ok()?;
    if value.is_finite() && value > -1.0 && value <= f64::from(u32::MAX) {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub submission: Submission,
    pub name: String,
    pub sex: Option<String>,
    pub age: Age,
}

/// One source row after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub submission: Submission,
    pub subjects: Vec<SubjectRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub rows: usize,
    pub subjects: usize,
    /// Slots without a student name.
    pub empty_slots: usize,
    /// Students whose age cell was present but not a usable number.
    pub unparsed_ages: usize,
}

/// Trimmed cell text, or `None` when the column is unmapped, past the end
/// of the row, blank, or holds the display placeholder.
pub fn cell(row: &[String], index: Option<usize>) -> Option<String> {
    text_cell(row, index).filter(|value| value.as_str() != MISSING)
}

/// Like [`cell`] but keeps a literal placeholder; any non-blank student
/// name registers the student.
fn text_cell(row: &[String], index: Option<usize>) -> Option<String> {
    let value = row.get(index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub struct RowNormalizer {
    mapping: ColumnMapping,
}

impl RowNormalizer {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn normalize_row(&self, row_index: usize, row: &[String]) -> NormalizedRow {
        let m = &self.mapping;
        let submission = Submission {
            row: row_index,
            timestamp: cell(row, m.timestamp),
            email: cell(row, m.email),
            municipality: cell(row, m.municipality),
            school_level: cell(row, m.school_level),
            school_name: cell(row, m.school_name),
            discipline: cell(row, m.discipline),
            topic: cell(row, m.topic),
            document: cell(row, m.document),
        };

        let subjects = m
            .slots
            .iter()
            .enumerate()
            .filter_map(|(k, slot)| {
                let name = text_cell(row, slot.name)?;
                Some(SubjectRecord {
                    id: SubjectId { row: row_index, slot: k + 1 },
                    submission: submission.clone(),
                    name,
                    sex: cell(row, slot.sex),
                    age: Age::from_cell(cell(row, slot.age)),
                })
            })
            .collect();

        NormalizedRow { submission, subjects }
    }

    /// Normalizes every data row in order.
    pub fn normalize_all(&self, rows: &[Vec<String>]) -> (Vec<NormalizedRow>, NormalizeStats) {
        let mut stats = NormalizeStats::default();
        let normalized: Vec<NormalizedRow> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let normalized = self.normalize_row(i, row);
                stats.rows += 1;
                stats.subjects += normalized.subjects.len();
                stats.empty_slots += self.mapping.slots.len() - normalized.subjects.len();
                for subject in &normalized.subjects {
                    if subject.age.raw.is_some() && subject.age.years.is_none() {
                        stats.unparsed_ages += 1;
                        debug!(id = %subject.id, age = subject.age.display(), "age is not a number");
                    }
                }
                if normalized.subjects.is_empty() {
                    debug!(row = i, cells = row.len(), "row registers no students");
                }
                normalized
            })
            .collect();

        info!(
            rows = stats.rows,
            subjects = stats.subjects,
            empty_slots = stats.empty_slots,
            unparsed_ages = stats.unparsed_ages,
            "normalized sheet rows"
        );
        (normalized, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn three_slot_mapping() -> ColumnMapping {
        ColumnMapping {
            municipality: Some(0),
            school_name: Some(1),
            slots: [
                SlotColumns { name: Some(2), sex: Some(3), age: Some(4) },
                SlotColumns { name: Some(5), sex: Some(6), age: Some(7) },
                SlotColumns { name: Some(8), sex: Some(9), age: Some(10) },
            ],
            ..ColumnMapping::default()
        }
    }

    #[test]
    fn cell_trims_and_treats_blank_as_missing() {
        let r = row(&["  Dili ", "   ", "N/A"]);
        assert_eq!(cell(&r, Some(0)).as_deref(), Some("Dili"));
        assert_eq!(cell(&r, Some(1)), None);
        assert_eq!(cell(&r, Some(2)), None);
        assert_eq!(cell(&r, Some(9)), None);
        assert_eq!(cell(&r, None), None);
    }

    #[test]
    fn age_truncates_numbers_and_keeps_raw_text() {
        assert_eq!(Age::from_cell(Some("8".into())).years, Some(8));
        assert_eq!(Age::from_cell(Some("12.9".into())).years, Some(12));
        let words = Age::from_cell(Some("ten".into()));
        assert_eq!(words.years, None);
        assert_eq!(words.display(), "ten");
        assert_eq!(Age::from_cell(Some("-3".into())).years, None);
        assert_eq!(Age::from_cell(Some("-1".into())).years, None);
        assert_eq!(Age::from_cell(Some("-0.5".into())).years, Some(0));
        assert_eq!(Age::from_cell(Some("NaN".into())).years, None);
        assert_eq!(Age::from_cell(Some("inf".into())).years, None);
        assert_eq!(Age::from_cell(None).display(), "N/A");
    }

    #[test]
    fn empty_middle_slot_is_skipped() {
        let normalizer = RowNormalizer::new(three_slot_mapping());
        let r = row(&["Baucau", "EBC 1", "Ana", "F", "9", "", "M", "10", "Rui", "M", "11"]);
        let out = normalizer.normalize_row(4, &r);
        let ids: Vec<String> = out.subjects.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["4-1", "4-3"]);
        assert_eq!(out.subjects[1].name, "Rui");
        assert_eq!(out.subjects[1].age.years, Some(11));
    }

    #[test]
    fn placeholder_name_still_registers_student() {
        let normalizer = RowNormalizer::new(three_slot_mapping());
        let r = row(&["N/A", "EBC 1", "N/A", "N/A", "7"]);
        let out = normalizer.normalize_row(0, &r);
        assert_eq!(out.subjects.len(), 1);
        assert_eq!(out.subjects[0].name, "N/A");
        assert_eq!(out.subjects[0].sex, None);
        assert_eq!(out.submission.municipality, None);
    }

    #[test]
    fn shared_fields_are_copied_into_every_subject() {
        let normalizer = RowNormalizer::new(three_slot_mapping());
        let r = row(&["Baucau", "EBC 1", "Ana", "F", "9", "Rosa", "F", "10"]);
        let out = normalizer.normalize_row(0, &r);
        assert_eq!(out.subjects.len(), 2);
        for subject in &out.subjects {
            assert_eq!(subject.submission, out.submission);
        }
        assert_eq!(out.submission.school_name.as_deref(), Some("EBC 1"));
    }

    #[test]
    fn short_row_degrades_without_panicking() {
        let normalizer = RowNormalizer::new(ColumnMapping::from_indices(
            &crate::config::IndexLayout::default(),
        ));
        let out = normalizer.normalize_row(2, &row(&["t", "e@x", "Dili"]));
        assert_eq!(out.submission.municipality.as_deref(), Some("Dili"));
        assert_eq!(out.submission.school_level, None);
        assert!(out.subjects.is_empty());

        let empty = normalizer.normalize_row(3, &[]);
        assert_eq!(empty.submission, Submission { row: 3, ..Submission::default() });
    }

    #[test]
    fn stats_count_slots_and_bad_ages() {
        let normalizer = RowNormalizer::new(three_slot_mapping());
        let rows = vec![
            row(&["Dili", "S1", "Ana", "F", "eight"]),
            row(&["Dili", "S1", "Ze", "M", "9", "Maria", "F", ""]),
        ];
        let (normalized, stats) = normalizer.normalize_all(&rows);
        assert_eq!(normalized.len(), 2);
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.subjects, 3);
        assert_eq!(stats.empty_slots, 3);
        assert_eq!(stats.unparsed_ages, 1);
    }
}

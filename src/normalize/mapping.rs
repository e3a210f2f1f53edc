use super::headers::{clean_header, dedupe_headers};
use crate::config::{ColumnsConfig, HeaderLayout, IndexLayout};
use crate::constants::SUBJECT_SLOTS;
use crate::error::{ReportError, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Column positions of one student slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotColumns {
    pub name: Option<usize>,
    pub sex: Option<usize>,
    pub age: Option<usize>,
}

/// Where each logical field lives in a row. `None` means the field is not
/// present in this sheet and always reads as missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    pub timestamp: Option<usize>,
    pub email: Option<usize>,
    pub municipality: Option<usize>,
    pub school_level: Option<usize>,
    pub school_name: Option<usize>,
    pub discipline: Option<usize>,
    pub topic: Option<usize>,
    pub document: Option<usize>,
    pub slots: [SlotColumns; SUBJECT_SLOTS],
}

impl ColumnMapping {
    /// Builds the mapping for the configured strategy. `headers` is only
    /// consulted by the header strategy.
    pub fn resolve(columns: &ColumnsConfig, headers: &[String]) -> Result<Self> {
        match columns {
            ColumnsConfig::Indices(layout) => Ok(Self::from_indices(layout)),
            ColumnsConfig::Headers(layout) => Self::from_headers(headers, layout),
        }
    }

    pub fn from_indices(layout: &IndexLayout) -> Self {
        let mut slots = [SlotColumns::default(); SUBJECT_SLOTS];
        for (slot, indices) in slots.iter_mut().zip(&layout.subjects) {
            *slot = SlotColumns {
                name: indices.name,
                sex: indices.sex,
                age: indices.age,
            };
        }
        Self {
            timestamp: layout.timestamp,
            email: layout.email,
            municipality: layout.municipality,
            school_level: layout.school_level,
            school_name: layout.school_name,
            discipline: layout.discipline,
            topic: layout.topic,
            document: layout.document,
            slots,
        }
    }

    /// Locates fields by cleaned header text. The first student's name
    /// column is required; every other field degrades to missing.
    pub fn from_headers(headers: &[String], layout: &HeaderLayout) -> Result<Self> {
        let lookup = HeaderLookup::new(headers);

        let mut slots = [SlotColumns::default(); SUBJECT_SLOTS];
        for (k, slot) in slots.iter_mut().enumerate() {
            slot.name = lookup.find_slot(&layout.subject_name, k);
            slot.sex = layout.subject_sex.as_deref().and_then(|base| lookup.find_slot(base, k));
            slot.age = layout.subject_age.as_deref().and_then(|base| lookup.find_slot(base, k));
        }
        if slots[0].name.is_none() {
            return Err(ReportError::Config(format!(
                "subject name header '{}' not found in sheet headers",
                layout.subject_name
            )));
        }

        Ok(Self {
            timestamp: lookup.find_field("timestamp", layout.timestamp.as_deref()),
            email: lookup.find_field("email", layout.email.as_deref()),
            municipality: lookup.find_field("municipality", layout.municipality.as_deref()),
            school_level: lookup.find_field("school_level", layout.school_level.as_deref()),
            school_name: lookup.find_field("school_name", layout.school_name.as_deref()),
            discipline: lookup.find_field("discipline", layout.discipline.as_deref()),
            topic: lookup.find_field("topic", layout.topic.as_deref()),
            document: lookup.find_field("document", layout.document.as_deref()),
            slots,
        })
    }

    /// Field name / column pairs in a fixed order, for display.
    pub fn describe(&self) -> Vec<(String, Option<usize>)> {
        let mut fields = vec![
            ("timestamp".to_string(), self.timestamp),
            ("email".to_string(), self.email),
            ("municipality".to_string(), self.municipality),
            ("school_level".to_string(), self.school_level),
            ("school_name".to_string(), self.school_name),
            ("discipline".to_string(), self.discipline),
            ("topic".to_string(), self.topic),
            ("document".to_string(), self.document),
        ];
        for (k, slot) in self.slots.iter().enumerate() {
            let n = k + 1;
            fields.push((format!("subject_name_{n}"), slot.name));
            fields.push((format!("subject_sex_{n}"), slot.sex));
            fields.push((format!("subject_age_{n}"), slot.age));
        }
        fields
    }
}

struct HeaderLookup {
    positions: HashMap<String, usize>,
}

impl HeaderLookup {
    fn new(headers: &[String]) -> Self {
        let mut positions = HashMap::new();
        // Lowercase before deduping so repeats differing only in case still get suffixes.
        let names = dedupe_headers(headers.iter().map(|h| clean_header(h).to_lowercase()));
        for (index, name) in names.into_iter().enumerate() {
            positions.entry(name).or_insert(index);
        }
        Self { positions }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.positions.get(&clean_header(name).to_lowercase()).copied()
    }

    fn find_field(&self, field: &str, header: Option<&str>) -> Option<usize> {
        let header = header?;
        let found = self.find(header);
        if found.is_none() {
            warn!(field, header, "configured header not found; field will read as missing");
        }
        found
    }

    fn find_slot(&self, base: &str, slot: usize) -> Option<usize> {
        let base = clean_header(base);
        let name = if slot == 0 {
            base
        } else {
            format!("{}_{}", base, slot)
        };
        let found = self.find(&name);
        if found.is_none() {
            debug!(header = %name, slot = slot + 1, "no column for subject slot");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn layout() -> HeaderLayout {
        HeaderLayout {
            timestamp: Some("Timestamp".into()),
            email: None,
            municipality: Some("Munisipiu".into()),
            school_level: Some("Nivel Eskola".into()),
            school_name: Some("Naran Eskola".into()),
            discipline: Some("Dixiplina".into()),
            topic: Some("Titulu".into()),
            document: Some("Dokumentus".into()),
            subject_name: "Naran".into(),
            subject_sex: Some("Seksu".into()),
            subject_age: Some("Idade".into()),
        }
    }

    #[test]
    fn default_index_layout_matches_form() {
        let mapping = ColumnMapping::from_indices(&IndexLayout::default());
        assert_eq!(mapping.municipality, Some(2));
        assert_eq!(mapping.document, Some(28));
        assert_eq!(mapping.slots[0], SlotColumns { name: Some(7), sex: Some(8), age: Some(9) });
        assert_eq!(mapping.slots[2], SlotColumns { name: Some(21), sex: Some(22), age: Some(23) });
    }

    #[test]
    fn short_subject_list_leaves_remaining_slots_unmapped() {
        let layout = IndexLayout {
            subjects: vec![crate::config::SlotIndices { name: Some(3), sex: None, age: None }],
            ..IndexLayout::default()
        };
        let mapping = ColumnMapping::from_indices(&layout);
        assert_eq!(mapping.slots[0].name, Some(3));
        assert_eq!(mapping.slots[1], SlotColumns::default());
        assert_eq!(mapping.slots[2], SlotColumns::default());
    }

    #[test]
    fn resolves_repeated_groups_from_headers() {
        let headers = strings(&[
            "Timestamp",
            "Munisipiu",
            "Nivel Eskola",
            "Naran Eskola",
            "Dixiplina",
            "Titulu",
            "Naran (Kanorin 1)",
            "Seksu (Kanorin 1)",
            "Idade (Kanorin 1)",
            "Naran (Kanorin 2)",
            "Seksu (Kanorin 2)",
            "Idade (Kanorin 2)",
        ]);
        let mapping = ColumnMapping::from_headers(&headers, &layout()).unwrap();
        assert_eq!(mapping.timestamp, Some(0));
        assert_eq!(mapping.topic, Some(5));
        assert_eq!(mapping.slots[0], SlotColumns { name: Some(6), sex: Some(7), age: Some(8) });
        assert_eq!(mapping.slots[1], SlotColumns { name: Some(9), sex: Some(10), age: Some(11) });
        assert_eq!(mapping.slots[2], SlotColumns::default());
        // not in the sheet
        assert_eq!(mapping.document, None);
    }

    #[test]
    fn repeated_groups_match_across_capitalization() {
        let headers = strings(&[
            "Naran (Kanorin 1)",
            "Seksu (Kanorin 1)",
            "Naran (Kanorin 2)",
            "SEKSU (Kanorin 2)",
        ]);
        let mapping = ColumnMapping::from_headers(&headers, &layout()).unwrap();
        assert_eq!(mapping.slots[0].name, Some(0));
        assert_eq!(mapping.slots[0].sex, Some(1));
        assert_eq!(mapping.slots[1].name, Some(2));
        assert_eq!(mapping.slots[1].sex, Some(3));
    }

    #[test]
    fn header_matching_ignores_case_and_markup() {
        let headers = strings(&["**MUNISIPIU**", "naran"]);
        let mapping = ColumnMapping::from_headers(&headers, &layout()).unwrap();
        assert_eq!(mapping.municipality, Some(0));
        assert_eq!(mapping.slots[0].name, Some(1));
    }

    #[test]
    fn missing_subject_name_header_is_a_config_error() {
        let headers = strings(&["Timestamp", "Munisipiu"]);
        let err = ColumnMapping::from_headers(&headers, &layout()).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn describe_lists_every_slot() {
        let described = ColumnMapping::default().describe();
        assert_eq!(described.len(), 8 + 3 * SUBJECT_SLOTS);
        assert_eq!(described[8].0, "subject_name_1");
        assert!(described.iter().all(|(_, index)| index.is_none()));
    }
}

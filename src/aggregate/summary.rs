use crate::constants::ALL_OPTION;
use serde::Serialize;
use std::collections::BTreeMap;

/// Labels with aligned values, ready for a bar or pie chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenderChart {
    pub labels: Vec<String>,
    pub data: Vec<usize>,
    /// Share of all subjects per label, e.g. `"42.9%"`.
    pub percentages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTabRow {
    pub municipality: String,
    pub school_name: String,
    pub total: usize,
}

/// One student as shown in the detail table. Missing values are `N/A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub id: String,
    pub timestamp: String,
    pub municipality: String,
    pub school_level: String,
    pub school_name: String,
    pub subject_name: String,
    pub sex: String,
    pub age: String,
    pub discipline: String,
    pub topic: String,
    pub document: String,
}

/// Everything the report renders. Field names serialize to the keys the
/// dashboard script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_municipality: usize,
    /// All municipalities, alphabetical.
    pub municipality_chart_data: ChartSeries,
    /// Top municipalities by submissions.
    pub municipality_pie_chart_data: ChartSeries,
    /// Number of registered students.
    pub total_gender: usize,
    pub gender_chart_data: GenderChart,
    pub age_distribution: BTreeMap<u32, usize>,
    pub age_chart_data: ChartSeries,
    pub school_level_counts: BTreeMap<String, usize>,
    pub school_level_chart_data: ChartSeries,
    pub school_municipality_table_data: Vec<CrossTabRow>,
    pub total_discipline: usize,
    pub discipline_counts: BTreeMap<String, usize>,
    pub discipline_chart_data: ChartSeries,
    pub total_topic: usize,
    pub all_school_level_options: Vec<String>,
    pub all_municipality_options: Vec<String>,
    pub detailed_table_data: Vec<DetailRow>,
}

impl DashboardSummary {
    /// The canonical zero-value summary: every count zero, every list empty,
    /// each filter list holding only `"All"`.
    pub fn empty() -> Self {
        Self {
            total_municipality: 0,
            municipality_chart_data: ChartSeries::default(),
            municipality_pie_chart_data: ChartSeries::default(),
            total_gender: 0,
            gender_chart_data: GenderChart::default(),
            age_distribution: BTreeMap::new(),
            age_chart_data: ChartSeries::default(),
            school_level_counts: BTreeMap::new(),
            school_level_chart_data: ChartSeries::default(),
            school_municipality_table_data: Vec::new(),
            total_discipline: 0,
            discipline_counts: BTreeMap::new(),
            discipline_chart_data: ChartSeries::default(),
            total_topic: 0,
            all_school_level_options: vec![ALL_OPTION.to_string()],
            all_municipality_options: vec![ALL_OPTION.to_string()],
            detailed_table_data: Vec::new(),
        }
    }
}

impl Default for DashboardSummary {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_serializes_every_key() {
        let value = serde_json::to_value(DashboardSummary::empty()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "totalMunicipality",
            "municipalityChartData",
            "municipalityPieChartData",
            "totalGender",
            "genderChartData",
            "ageDistribution",
            "ageChartData",
            "schoolLevelCounts",
            "schoolLevelChartData",
            "schoolMunicipalityTableData",
            "totalDiscipline",
            "disciplineCounts",
            "disciplineChartData",
            "totalTopic",
            "allSchoolLevelOptions",
            "allMunicipalityOptions",
            "detailedTableData",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 17);
        assert_eq!(value["genderChartData"]["percentages"], serde_json::json!([]));
        assert_eq!(value["allMunicipalityOptions"], serde_json::json!(["All"]));
    }

    #[test]
    fn age_keys_serialize_as_strings() {
        let mut summary = DashboardSummary::empty();
        summary.age_distribution.insert(8, 2);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["ageDistribution"]["8"], 2);
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub timestamp: NaiveDateTime,
    pub age: i32,
    pub gender: String,
    pub grade: i32,
    pub change: Change,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Trend of a scan relative to the patient's previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Change {
    Stable,
    Improved,
    Worsened,
    New,
    Unknown,
}

impl Change {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Change::Stable,
            "improved" => Change::Improved,
            "worsened" => Change::Worsened,
            "new" => Change::New,
            _ => Change::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Change::Stable => "stable",
            Change::Improved => "improved",
            Change::Worsened => "worsened",
            Change::New => "new",
            Change::Unknown => "unknown",
        }
    }
}

impl From<String> for Change {
    fn from(value: String) -> Self {
        Change::parse(&value)
    }
}

impl From<Change> for String {
    fn from(value: Change) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Caller-owned view state for the patient history table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    pub search: String,
    pub direction: SortDirection,
    pub expanded: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow<'a> {
    pub latest: &'a ScanRecord,
    pub scan_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedPatient<'a> {
    pub patient_id: String,
    pub scans: Vec<&'a ScanRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage<'a> {
    pub rows: Vec<PatientRow<'a>>,
    pub expanded: Option<ExpandedPatient<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub total_scans: usize,
    pub patient_count: usize,
    pub healthy_count: usize,
    pub healthy_pct: f64,
    pub severe_count: usize,
    pub unknown_grade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeBucket {
    pub grade: i32,
    pub count: usize,
    pub percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_direction_twice_restores_it() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
        assert_eq!(SortDirection::default().toggled().toggled(), SortDirection::Desc);
    }

    #[test]
    fn change_round_trips_through_text() {
        assert_eq!(Change::from("improved".to_string()), Change::Improved);
        assert_eq!(String::from(Change::New), "new");
        assert_eq!(Change::from("sideways".to_string()), Change::Unknown);
    }
}

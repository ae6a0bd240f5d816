use crate::models::Change;

/// Diabetic retinopathy severity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    NoDr,
    Mild,
    Moderate,
    Severe,
    Proliferative,
    Unknown,
}

impl Grade {
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => Grade::NoDr,
            1 => Grade::Mild,
            2 => Grade::Moderate,
            3 => Grade::Severe,
            4 => Grade::Proliferative,
            _ => Grade::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::NoDr => "No DR",
            Grade::Mild => "Mild",
            Grade::Moderate => "Moderate",
            Grade::Severe => "Severe",
            Grade::Proliferative => "Proliferative",
            Grade::Unknown => "Unknown",
        }
    }

    pub fn clinical_label(&self) -> &'static str {
        match self {
            Grade::NoDr => "No Diabetic Retinopathy",
            Grade::Mild => "Mild NPDR",
            Grade::Moderate => "Moderate NPDR",
            Grade::Severe => "Severe NPDR",
            Grade::Proliferative => "Proliferative DR",
            Grade::Unknown => "Unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Grade::NoDr => "No abnormalities detected in the retina.",
            Grade::Mild => "Presence of microaneurysms only.",
            Grade::Moderate => "Microaneurysms and some other abnormalities.",
            Grade::Severe => "More extensive damage to the retina.",
            Grade::Proliferative => "Advanced disease with abnormal blood vessel growth.",
            Grade::Unknown => "Classification not available",
        }
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, Grade::Severe | Grade::Proliferative)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeIndicator {
    pub label: &'static str,
    pub icon: char,
}

impl Change {
    pub fn indicator(&self) -> ChangeIndicator {
        let (label, icon) = match self {
            Change::Improved => ("Improved", '↑'),
            Change::Worsened => ("Worsened", '↓'),
            Change::Stable => ("Stable", '→'),
            Change::New => ("New", '•'),
            Change::Unknown => ("Unknown", '•'),
        };
        ChangeIndicator { label, icon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 90.0 {
            ConfidenceBand::High
        } else if percent > 75.0 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

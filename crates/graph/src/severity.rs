use serde::{Deserialize, Serialize};

/// Ordinal interaction severity. S0 = no known interaction,
/// S3 = severe / contraindicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityCode {
    S0,
    S1,
    S2,
    S3,
}

impl SeverityCode {
    /// Map a raw source severity label to a code. Total and pure: any
    /// unrecognized, empty, or missing label maps to S0. Matching is
    /// case-insensitive on the trimmed label, exact-token only.
    pub fn from_label(raw: Option<&str>) -> Self {
        let label = raw.unwrap_or("").trim().to_lowercase();
        match label.as_str() {
            "major" | "severe" | "contraindicated" => Self::S3,
            "moderate" | "significant" => Self::S2,
            "minor" | "mild" => Self::S1,
            _ => Self::S0,
        }
    }

    /// Infer a severity from a free-text interaction description, for
    /// records that carry no structured label. Keyword scan, strongest
    /// signal first.
    pub fn infer_from_description(description: &str) -> Self {
        let text = description.to_lowercase();

        const SEVERE: &[&str] = &["contraindicated", "fatal", "life-threatening", "severe"];
        const MAJOR: &[&str] = &["major", "serious", "significant"];
        const MODERATE: &[&str] = &["moderate", "caution", "monitor"];

        if SEVERE.iter().any(|w| text.contains(w)) {
            Self::S3
        } else if MAJOR.iter().any(|w| text.contains(w)) {
            Self::S3
        } else if MODERATE.iter().any(|w| text.contains(w)) {
            Self::S2
        } else {
            Self::S1
        }
    }

    /// Edge weight used by graph-informed retrieval scoring: 1 (S0) to 4 (S3).
    pub fn weight(self) -> u8 {
        match self {
            Self::S0 => 1,
            Self::S1 => 2,
            Self::S2 => 3,
            Self::S3 => 4,
        }
    }

    /// UI-facing risk label: S3 -> HIGH, S2 -> MODERATE, S1/S0 -> LOW.
    pub fn risk_label(self) -> RiskLabel {
        match self {
            Self::S3 => RiskLabel::High,
            Self::S2 => RiskLabel::Moderate,
            Self::S1 | Self::S0 => RiskLabel::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::S0 => "S0",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
        }
    }
}

/// Presentation-level risk classification of a drug pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    High,
    Moderate,
    Low,
}

impl RiskLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
        }
    }

    /// Ordinal rank used by the risk-MAE evaluation metric.
    pub fn ordinal(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::High => 2,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MODERATE" => Some(Self::Moderate),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

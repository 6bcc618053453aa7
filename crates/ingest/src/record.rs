use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single drug-drug interaction record, as it arrives from a
/// DrugBank-style export:
///
/// ```json
/// { "id": "...", "drug1": "Aspirin", "drug2": "Warfarin",
///   "severity": "major", "description": "..." }
/// ```
///
/// `drug1`/`drug2` may be missing or empty; such records are skipped at
/// graph-build time rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub drug1: Option<String>,
    #[serde(default)]
    pub drug2: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl InteractionRecord {
    pub fn new(drug1: &str, drug2: &str, severity: &str, description: &str) -> Self {
        let mut record = Self {
            id: None,
            drug1: Some(drug1.to_string()),
            drug2: Some(drug2.to_string()),
            severity: Some(severity.to_string()),
            description: description.to_string(),
        };
        record.id = Some(record.content_id());
        record
    }

    /// Both drug names present and non-empty after trimming.
    pub fn is_complete(&self) -> bool {
        self.drug_pair().is_some()
    }

    /// Trimmed drug pair, or None if either name is missing/blank.
    pub fn drug_pair(&self) -> Option<(&str, &str)> {
        let a = self.drug1.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let b = self.drug2.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((a, b))
    }

    /// Stable id derived from record content, used when the source export
    /// carries no id of its own.
    pub fn content_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.drug1.as_deref().unwrap_or("").as_bytes());
        hasher.update(self.drug2.as_deref().unwrap_or("").as_bytes());
        hasher.update(self.description.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_records_detected() {
        let rec: InteractionRecord = serde_json::from_str(r#"{"drug1": "Aspirin"}"#).unwrap();
        assert!(!rec.is_complete());

        let rec: InteractionRecord =
            serde_json::from_str(r#"{"drug1": "Aspirin", "drug2": "  "}"#).unwrap();
        assert!(!rec.is_complete());
    }

    #[test]
    fn pair_is_trimmed() {
        let rec = InteractionRecord {
            id: None,
            drug1: Some(" Aspirin ".to_string()),
            drug2: Some("Warfarin".to_string()),
            severity: None,
            description: String::new(),
        };
        assert_eq!(rec.drug_pair(), Some(("Aspirin", "Warfarin")));
    }

    #[test]
    fn content_id_is_stable() {
        let a = InteractionRecord::new("Aspirin", "Warfarin", "major", "bleeding risk");
        let b = InteractionRecord::new("Aspirin", "Warfarin", "major", "bleeding risk");
        assert_eq!(a.content_id(), b.content_id());
        assert_eq!(a.content_id().len(), 32);
    }
}

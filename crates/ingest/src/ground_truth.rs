use serde::{Deserialize, Serialize};

/// One expert-annotated evaluation example: a query, the drugs a good
/// retrieval should surface, and the expected risk call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthExample {
    pub query: String,
    pub expected_drugs: Vec<String>,
    pub expected_risk: String,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

impl GroundTruthExample {
    pub fn new(
        query: &str,
        expected_drugs: &[&str],
        expected_risk: &str,
        expected_keywords: &[&str],
    ) -> Self {
        Self {
            query: query.to_string(),
            expected_drugs: expected_drugs.iter().map(|s| s.to_string()).collect(),
            expected_risk: expected_risk.to_string(),
            expected_keywords: expected_keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

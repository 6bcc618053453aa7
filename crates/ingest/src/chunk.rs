use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An evidence document flowing through the retrieval pipeline.
///
/// `relevance_score` is re-interpreted stage by stage: vector-store
/// similarity after candidate search, normalized cross-encoder score after
/// re-ranking, fused score after graph fusion. Each stage works on its own
/// copy, so a caller's list is never mutated behind its back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    #[serde(default)]
    pub source: String,
    pub text: String,
    #[serde(default)]
    pub drug_name: Option<String>,
    #[serde(default)]
    pub interacting_drug: Option<String>,
    #[serde(default)]
    pub interaction_description: Option<String>,
    #[serde(default)]
    pub relevance_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f32>,
}

impl DocumentChunk {
    pub fn new(source: &str, text: &str) -> Self {
        Self {
            id: Self::generate_id(source, text),
            source: source.to_string(),
            text: text.to_string(),
            drug_name: None,
            interacting_drug: None,
            interaction_description: None,
            relevance_score: 0.0,
            graph_score: None,
            combined_score: None,
        }
    }

    pub fn with_drug(mut self, drug_name: &str) -> Self {
        self.drug_name = Some(drug_name.to_string());
        self
    }

    pub fn with_interaction(mut self, interacting_drug: &str, description: &str) -> Self {
        self.interacting_drug = Some(interacting_drug.to_string());
        self.interaction_description = Some(description.to_string());
        self
    }

    /// Interaction chunks carry an `interacting_drug`; drug-profile chunks
    /// do not. Graph building treats the two kinds differently.
    pub fn is_interaction(&self) -> bool {
        self.interacting_drug.is_some()
    }

    fn generate_id(source: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

/// Drug-mention recognition over free-text queries.
///
/// The default recognizer is a deliberately naive substring scan over a
/// known-name list in list order. It can mis-pair when one drug name is
/// contained in another (a short brand name inside a longer generic name);
/// the trait seam exists so a tokenizer-based matcher can replace it
/// without touching the resolver.
pub trait DrugMentionRecognizer: Send + Sync {
    /// All known-drug mentions found in the query, in scan order.
    fn extract_all(&self, query: &str) -> Vec<String>;

    /// First two distinct mentions, or None if fewer than two are found.
    fn extract_pair(&self, query: &str) -> Option<(String, String)> {
        let found = self.extract_all(query);
        if found.len() >= 2 {
            Some((found[0].clone(), found[1].clone()))
        } else {
            None
        }
    }
}

/// Scans a fixed, sorted name list for lower-cased substring occurrence.
pub struct SubstringRecognizer {
    names: Vec<String>,
}

impl SubstringRecognizer {
    pub fn new(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn from_graph(graph: &crate::InteractionGraph) -> Self {
        Self::new(graph.drug_names())
    }
}

impl DrugMentionRecognizer for SubstringRecognizer {
    fn extract_all(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        let mut found = Vec::new();

        for name in &self.names {
            if query_lower.contains(&name.to_lowercase()) {
                found.push(name.clone());
            }
        }
        found
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use ingest::{DocumentChunk, InteractionRecord};

use crate::severity::SeverityCode;

/// One undirected interaction edge. Stored once and shared between both
/// adjacency directions, so looking up (a, b) and (b, a) yields the same
/// object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub severity_code: SeverityCode,
    pub severity_label: String,
    pub description: String,
    pub doc_id: Option<String>,
}

/// A drug node's static attributes, captured from drug-profile chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrugNode {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
}

/// In-memory knowledge graph of drug-drug interactions.
///
/// Nodes are drug names (case-insensitive canonical key, display name
/// preserved), edges carry severity and evidence text. Immutable after
/// build; a rebuild constructs a fresh graph which the holder swaps in
/// wholesale so concurrent readers never see a half-built graph.
#[derive(Debug, Default)]
pub struct InteractionGraph {
    // adjacency[a][b] = shared edge, keys lower-cased
    adjacency: HashMap<String, HashMap<String, Arc<InteractionEdge>>>,
    nodes: HashMap<String, DrugNode>,
    edge_count: usize,
}

impl InteractionGraph {
    /// Build a graph from interaction records. Records missing either drug
    /// name are skipped. When the same unordered pair appears more than
    /// once, the last record processed wins; callers needing determinism
    /// beyond input order must pre-sort.
    pub fn build(records: &[InteractionRecord]) -> Self {
        let mut graph = Self::default();
        let mut skipped = 0usize;

        for record in records {
            let Some((drug_a, drug_b)) = record.drug_pair() else {
                skipped += 1;
                continue;
            };

            let severity_label = record.severity.clone().unwrap_or_default();
            // Unlabeled records fall back to keyword inference over the
            // description instead of flattening to S0.
            let severity_code = match record.severity.as_deref().map(str::trim) {
                Some(label) if !label.is_empty() => SeverityCode::from_label(Some(label)),
                _ => SeverityCode::infer_from_description(&record.description),
            };

            let edge = Arc::new(InteractionEdge {
                severity_code,
                severity_label,
                description: record.description.clone(),
                doc_id: record.id.clone(),
            });

            graph.insert_edge(drug_a, drug_b, edge);
        }

        tracing::info!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count,
            skipped,
            "Built interaction graph"
        );
        graph
    }

    fn insert_edge(&mut self, drug_a: &str, drug_b: &str, edge: Arc<InteractionEdge>) {
        let key_a = Self::key(drug_a);
        let key_b = Self::key(drug_b);

        self.nodes.entry(key_a.clone()).or_insert_with(|| DrugNode {
            name: drug_a.to_string(),
            ..Default::default()
        });
        self.nodes.entry(key_b.clone()).or_insert_with(|| DrugNode {
            name: drug_b.to_string(),
            ..Default::default()
        });

        let fresh = self
            .adjacency
            .entry(key_a.clone())
            .or_default()
            .insert(key_b.clone(), edge.clone())
            .is_none();
        self.adjacency.entry(key_b).or_default().insert(key_a, edge);

        if fresh {
            self.edge_count += 1;
        }
    }

    /// Attach descriptions and categories to nodes from drug-profile
    /// chunks. Profiles for drugs absent from the graph create attribute-only
    /// nodes so neighbor queries on them return empty rather than missing.
    pub fn add_drug_profiles(&mut self, chunks: &[DocumentChunk]) {
        for chunk in chunks.iter().filter(|c| !c.is_interaction()) {
            let Some(name) = chunk.drug_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
            else {
                continue;
            };
            let node = self.nodes.entry(Self::key(name)).or_insert_with(|| DrugNode {
                name: name.to_string(),
                ..Default::default()
            });
            node.description = chunk.text.clone();
        }
    }

    /// Edge between two drugs, or None. Symmetric: `get_interaction(a, b)`
    /// and `get_interaction(b, a)` return the identical shared edge.
    pub fn get_interaction(&self, drug_a: &str, drug_b: &str) -> Option<&Arc<InteractionEdge>> {
        self.adjacency.get(&Self::key(drug_a))?.get(&Self::key(drug_b))
    }

    /// All 1-hop neighbors of a drug with their edges. Empty map for
    /// unknown drugs.
    pub fn get_neighbors(&self, drug: &str) -> HashMap<&str, &Arc<InteractionEdge>> {
        let Some(adjacent) = self.adjacency.get(&Self::key(drug)) else {
            return HashMap::new();
        };
        adjacent
            .iter()
            .map(|(key, edge)| {
                let name = self.nodes.get(key).map(|n| n.name.as_str()).unwrap_or(key.as_str());
                (name, edge)
            })
            .collect()
    }

    pub fn node(&self, drug: &str) -> Option<&DrugNode> {
        self.nodes.get(&Self::key(drug))
    }

    /// All known drug names, sorted. This is the scan list for the
    /// substring mention recognizer, so ordering must be deterministic.
    pub fn drug_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.values().map(|n| n.name.clone()).collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> GraphStats {
        let n = self.nodes.len();
        let possible = if n > 1 { (n * (n - 1)) / 2 } else { 0 };
        GraphStats {
            node_count: n,
            edge_count: self.edge_count,
            density: if possible > 0 {
                self.edge_count as f64 / possible as f64
            } else {
                0.0
            },
        }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

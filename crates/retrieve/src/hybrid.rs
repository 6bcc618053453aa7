use std::collections::HashSet;

use clients::{CrossEncoder, SemanticIndex};
use graph::InteractionGraph;
use ingest::DocumentChunk;

use crate::expansion::expand_query;

/// Tunable retrieval parameters. The fusion ratio and candidate depths are
/// deliberate defaults carried over from the reference configuration, not
/// derived values; treat them as configuration.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Stage-1 candidate pool size.
    pub initial_k: usize,
    /// Final ranked list size.
    pub final_k: usize,
    /// Weight of the normalized semantic score in fusion.
    pub semantic_weight: f32,
    /// Weight of the graph bonus in fusion.
    pub graph_weight: f32,
    /// Stage-2/3 graph signals on or off.
    pub graph_fusion: bool,
    /// Stage-3 cross-encoder re-ranking on or off.
    pub reranking: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            initial_k: 20,
            final_k: 5,
            semantic_weight: 0.6,
            graph_weight: 0.4,
            graph_fusion: true,
            reranking: true,
        }
    }
}

/// Three-stage retrieval: semantic candidate search, graph-neighbor
/// expansion, cross-encoder re-ranking with graph-informed score fusion.
///
/// Never returns an error: a failed candidate search yields an empty list,
/// a failed cross-encoder leaves stage-1 order and scores untouched.
pub struct HybridRetriever<S, C> {
    index: S,
    cross_encoder: C,
    config: RetrieverConfig,
}

impl<S: SemanticIndex, C: CrossEncoder> HybridRetriever<S, C> {
    pub fn new(index: S, cross_encoder: C, config: RetrieverConfig) -> Self {
        Self {
            index,
            cross_encoder,
            config,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Run the full pipeline for one query. `query_drugs` are the drug
    /// mentions already recognized in the query; they drive the graph
    /// signals and are empty when recognition found nothing.
    pub async fn retrieve(
        &self,
        query: &str,
        query_drugs: &[String],
        graph: &InteractionGraph,
    ) -> Vec<DocumentChunk> {
        // Stage 1: semantic candidates over the expanded query.
        let expanded = expand_query(query);
        let candidates = match self.index.search(&expanded, self.config.initial_k).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(error = %e, "Candidate search failed, returning no documents");
                return Vec::new();
            }
        };

        if candidates.is_empty() {
            return candidates;
        }

        // Stage 2: graph expansion. The neighbor set informs scoring only;
        // it never filters candidates.
        if self.config.graph_fusion && !query_drugs.is_empty() {
            let mut expanded_drugs: HashSet<String> = HashSet::new();
            for drug in query_drugs {
                for (neighbor, _) in graph.get_neighbors(drug) {
                    expanded_drugs.insert(neighbor.to_string());
                }
            }
            tracing::info!(
                query_drugs = query_drugs.len(),
                expanded = expanded_drugs.len(),
                "Graph expansion"
            );
        }

        // Stage 3: re-rank and fuse.
        self.rerank_and_fuse(query, query_drugs, graph, candidates)
            .await
    }

    /// Multi-query variant: retrieves per sub-query, deduplicates by chunk
    /// id (first occurrence wins), then merges by final score.
    pub async fn retrieve_multi(
        &self,
        queries: &[String],
        query_drugs: &[String],
        graph: &InteractionGraph,
    ) -> Vec<DocumentChunk> {
        let mut merged: Vec<DocumentChunk> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for query in queries {
            for chunk in self.retrieve(query, query_drugs, graph).await {
                if seen.insert(chunk.id.clone()) {
                    merged.push(chunk);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(self.config.final_k);
        merged
    }

    async fn rerank_and_fuse(
        &self,
        query: &str,
        query_drugs: &[String],
        graph: &InteractionGraph,
        mut candidates: Vec<DocumentChunk>,
    ) -> Vec<DocumentChunk> {
        let semantic_scores = if self.config.reranking {
            match self.cross_encode_all(query, &candidates).await {
                Some(raw) => normalize_min_max(&raw),
                None => {
                    // Degrade: stage-1 order and scores pass through.
                    tracing::warn!("Cross-encoder unavailable, keeping stage-1 ranking");
                    candidates.truncate(self.config.final_k);
                    return candidates;
                }
            }
        } else {
            let raw: Vec<f32> = candidates.iter().map(|c| c.relevance_score).collect();
            normalize_min_max(&raw)
        };

        for (chunk, semantic) in candidates.iter_mut().zip(&semantic_scores) {
            let final_score = if self.config.graph_fusion {
                let bonus = graph_bonus(chunk, query_drugs, graph);
                chunk.graph_score = Some(bonus);
                self.config.semantic_weight * semantic + self.config.graph_weight * bonus
            } else {
                *semantic
            };
            chunk.combined_score = Some(final_score);
            chunk.relevance_score = final_score;
        }

        // Stable sort: ties keep original candidate order.
        candidates.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.config.final_k);
        candidates
    }

    async fn cross_encode_all(&self, query: &str, candidates: &[DocumentChunk]) -> Option<Vec<f32>> {
        let mut raw = Vec::with_capacity(candidates.len());
        for chunk in candidates {
            match self.cross_encoder.score(query, &chunk.text).await {
                Ok(score) => raw.push(score),
                Err(e) => {
                    tracing::warn!(error = %e, chunk = %chunk.id, "Cross-encoder call failed");
                    return None;
                }
            }
        }
        Some(raw)
    }
}

/// Min-max normalize raw scores into [0, 1]. The epsilon guards against a
/// zero range when every score is equal.
fn normalize_min_max(raw: &[f32]) -> Vec<f32> {
    let min = raw.iter().copied().fold(f32::INFINITY, f32::min);
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min + 1e-8;
    raw.iter().map(|s| (s - min) / range).collect()
}

/// Graph-informed bonus for one chunk: +1.0 for each query drug whose name
/// textually overlaps the chunk's drug, +weight/4 for each graph edge
/// between a query drug and the chunk's interacting drug.
fn graph_bonus(chunk: &DocumentChunk, query_drugs: &[String], graph: &InteractionGraph) -> f32 {
    let mut bonus = 0.0f32;

    for query_drug in query_drugs {
        let query_lower = query_drug.to_lowercase();

        if let Some(doc_drug) = chunk.drug_name.as_deref() {
            let doc_lower = doc_drug.to_lowercase();
            if !doc_lower.is_empty()
                && (doc_lower.contains(&query_lower) || query_lower.contains(&doc_lower))
            {
                bonus += 1.0;
            }
        }

        if let Some(interacting) = chunk.interacting_drug.as_deref() {
            if let Some(edge) = graph.get_interaction(query_drug, interacting) {
                bonus += edge.severity_code.weight() as f32 / 4.0;
            }
        }
    }

    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::{ClientError, ClientResult};
    use ingest::InteractionRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIndex(Vec<DocumentChunk>);

    impl SemanticIndex for FixedIndex {
        async fn search(&self, _query: &str, top_k: usize) -> ClientResult<Vec<DocumentChunk>> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    struct CountingEncoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingEncoder {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }
        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }
    }

    impl CrossEncoder for &CountingEncoder {
        async fn score(&self, _query: &str, document: &str) -> ClientResult<f32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::Unreachable("down".to_string()));
            }
            // Longer documents score higher; deterministic and rank-visible.
            Ok(document.len() as f32)
        }
    }

    fn sample_graph() -> InteractionGraph {
        InteractionGraph::build(&[InteractionRecord::new(
            "Aspirin",
            "Warfarin",
            "major",
            "bleeding risk",
        )])
    }

    fn sample_chunks() -> Vec<DocumentChunk> {
        vec![
            DocumentChunk::new("drugbank", "Ibuprofen is an NSAID.").with_drug("Ibuprofen"),
            DocumentChunk::new("drugbank", "Aspirin with warfarin raises bleeding risk severely.")
                .with_drug("Aspirin")
                .with_interaction("Warfarin", "bleeding"),
        ]
    }

    #[tokio::test]
    async fn empty_candidates_skip_cross_encoder() {
        let encoder = CountingEncoder::ok();
        let retriever =
            HybridRetriever::new(FixedIndex(Vec::new()), &encoder, RetrieverConfig::default());

        let results = retriever.retrieve("aspirin and warfarin", &[], &sample_graph()).await;

        assert!(results.is_empty());
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn graph_edge_boosts_interaction_chunk() {
        let encoder = CountingEncoder::ok();
        let retriever =
            HybridRetriever::new(FixedIndex(sample_chunks()), &encoder, RetrieverConfig::default());

        let query_drugs = vec!["Aspirin".to_string(), "Warfarin".to_string()];
        let results = retriever
            .retrieve("aspirin and warfarin", &query_drugs, &sample_graph())
            .await;

        assert_eq!(results[0].drug_name.as_deref(), Some("Aspirin"));
        // +1.0 name overlap with "Aspirin", +4/4 for the S3 edge to Warfarin.
        assert!((results[0].graph_score.unwrap() - 2.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn cross_encoder_failure_degrades_to_stage_one() {
        let encoder = CountingEncoder::failing();
        let chunks = sample_chunks();
        let retriever =
            HybridRetriever::new(FixedIndex(chunks.clone()), &encoder, RetrieverConfig::default());

        let results = retriever.retrieve("aspirin", &[], &sample_graph()).await;

        // Stage-1 order and scores unchanged.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, chunks[0].id);
        assert!(results.iter().all(|c| c.combined_score.is_none()));
    }

    #[tokio::test]
    async fn fusion_disabled_uses_semantic_score_alone() {
        let encoder = CountingEncoder::ok();
        let config = RetrieverConfig { graph_fusion: false, ..Default::default() };
        let retriever = HybridRetriever::new(FixedIndex(sample_chunks()), &encoder, config);

        let query_drugs = vec!["Aspirin".to_string()];
        let results = retriever.retrieve("aspirin", &query_drugs, &sample_graph()).await;

        assert!(results.iter().all(|c| c.graph_score.is_none()));
        // Longest text wins on pure cross-encoder score.
        assert_eq!(results[0].drug_name.as_deref(), Some("Aspirin"));
    }

    #[tokio::test]
    async fn multi_query_deduplicates_by_id() {
        let encoder = CountingEncoder::ok();
        let retriever =
            HybridRetriever::new(FixedIndex(sample_chunks()), &encoder, RetrieverConfig::default());

        let queries = vec!["aspirin interaction".to_string(), "warfarin bleeding".to_string()];
        let results = retriever.retrieve_multi(&queries, &[], &sample_graph()).await;

        let mut ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), results.len());
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn normalization_guards_equal_scores() {
        let normalized = normalize_min_max(&[3.0, 3.0, 3.0]);
        assert!(normalized.iter().all(|s| *s == 0.0));

        let normalized = normalize_min_max(&[1.0, 3.0]);
        assert!(normalized[0] < 1e-6);
        assert!((normalized[1] - 1.0).abs() < 1e-6);
    }
}

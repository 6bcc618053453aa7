use std::sync::{Arc, RwLock};

use serde::Serialize;

use clients::{CrossEncoder, Embedder, Generator, GroundingVerifier, SemanticIndex};
use graph::{DrugMentionRecognizer, InteractionGraph, RiskLabel, SubstringRecognizer};
use ingest::{DocumentChunk, InteractionRecord};
use retrieve::{HybridRetriever, retrieval_confidence};

use crate::confidence::{ConfidenceAggregator, ConfidenceReport};
use crate::severity::SeverityResolver;

/// Pipeline-level feature switches and presentation limits. The feature
/// flags are the knobs the ablation harness turns off one at a time.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Estimate retrieval confidence from score spread.
    pub uncertainty: bool,
    /// Verify the generated answer against its evidence.
    pub grounding_verification: bool,
    /// Evidence documents included in the generation prompt.
    pub context_docs: usize,
    /// Maximum prompt context length in characters.
    pub context_chars: usize,
    /// Citations surfaced to the caller.
    pub citation_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            uncertainty: true,
            grounding_verification: true,
            context_docs: 4,
            context_chars: 2500,
            citation_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub id: usize,
    pub drug_name: String,
    pub source: String,
    pub relevance_score: f32,
}

/// Everything the request layer needs to render an answer.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionAnswer {
    pub query: String,
    pub response: String,
    pub risk: RiskLabel,
    pub citations: Vec<Citation>,
    pub grounding_score: f64,
    pub confidence: ConfidenceReport,
    pub num_retrieved_docs: usize,
    pub retrieved: Vec<DocumentChunk>,
}

struct Knowledge {
    graph: Arc<InteractionGraph>,
    recognizer: Arc<dyn DrugMentionRecognizer>,
}

/// The explicitly constructed, dependency-injected query pipeline. Holds
/// the interaction graph behind an atomically swappable handle so a
/// rebuild never exposes a partially built graph to in-flight queries.
///
/// No method here returns an error for a query: every external failure
/// degrades per stage, bottoming out at a LOW-risk answer with no
/// citations and Low confidence.
pub struct InteractionService<S, C, E, G, V> {
    knowledge: RwLock<Knowledge>,
    retriever: HybridRetriever<S, C>,
    resolver: SeverityResolver<E>,
    aggregator: ConfidenceAggregator,
    generator: G,
    verifier: V,
    config: ServiceConfig,
}

impl<S, C, E, G, V> InteractionService<S, C, E, G, V>
where
    S: SemanticIndex,
    C: CrossEncoder,
    E: Embedder,
    G: Generator,
    V: GroundingVerifier,
{
    pub fn init(
        records: &[InteractionRecord],
        retriever: HybridRetriever<S, C>,
        resolver: SeverityResolver<E>,
        aggregator: ConfidenceAggregator,
        generator: G,
        verifier: V,
        config: ServiceConfig,
    ) -> Self {
        let graph = Arc::new(InteractionGraph::build(records));
        let recognizer: Arc<dyn DrugMentionRecognizer> =
            Arc::new(SubstringRecognizer::from_graph(&graph));

        Self {
            knowledge: RwLock::new(Knowledge { graph, recognizer }),
            retriever,
            resolver,
            aggregator,
            generator,
            verifier,
            config,
        }
    }

    /// Swap in a custom mention recognizer (the default is the naive
    /// substring scanner over the graph's drug names).
    pub fn set_recognizer(&self, recognizer: Arc<dyn DrugMentionRecognizer>) {
        let mut knowledge = self.knowledge.write().unwrap_or_else(|e| e.into_inner());
        knowledge.recognizer = recognizer;
    }

    /// Construct a new graph from records and atomically swap it in.
    /// Readers keep their `Arc` to the old graph until their query ends.
    pub fn rebuild_graph(&self, records: &[InteractionRecord]) {
        let graph = Arc::new(InteractionGraph::build(records));
        let recognizer: Arc<dyn DrugMentionRecognizer> =
            Arc::new(SubstringRecognizer::from_graph(&graph));

        let mut knowledge = self.knowledge.write().unwrap_or_else(|e| e.into_inner());
        *knowledge = Knowledge { graph, recognizer };
        tracing::info!("Interaction graph rebuilt and swapped");
    }

    pub fn graph(&self) -> Arc<InteractionGraph> {
        self.knowledge
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .graph
            .clone()
    }

    fn recognizer(&self) -> Arc<dyn DrugMentionRecognizer> {
        self.knowledge
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .recognizer
            .clone()
    }

    /// Resolve a risk label for a query given already-retrieved evidence
    /// and generated text.
    pub async fn resolve_severity(
        &self,
        query: &str,
        docs: &[DocumentChunk],
        generated: &str,
    ) -> RiskLabel {
        let graph = self.graph();
        let pair = self.recognizer().extract_pair(query);
        let pair_ref = pair.as_ref().map(|(a, b)| (a.as_str(), b.as_str()));
        self.resolver.resolve(&graph, pair_ref, docs, generated).await
    }

    /// Ranked evidence documents for a query.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Vec<DocumentChunk> {
        let graph = self.graph();
        let query_drugs = self.recognizer().extract_all(query);
        let mut docs = self.retriever.retrieve(query, &query_drugs, &graph).await;
        docs.truncate(top_k);
        docs
    }

    /// The full pipeline: retrieval, generation, risk resolution,
    /// citations, grounding verification, confidence scoring.
    pub async fn answer(&self, query: &str) -> InteractionAnswer {
        let graph = self.graph();
        let recognizer = self.recognizer();

        let pair = recognizer.extract_pair(query);
        let query_drugs = recognizer.extract_all(query);
        tracing::info!(query, drugs = query_drugs.len(), "Processing query");

        let docs = self.retriever.retrieve(query, &query_drugs, &graph).await;

        let retrieval = if self.config.uncertainty {
            Some(retrieval_confidence(&docs))
        } else {
            None
        };

        let response = if docs.is_empty() {
            String::new()
        } else {
            let prompt = self.build_prompt(query, &docs);
            match self.generator.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "Generator unavailable, answering without prose");
                    String::new()
                }
            }
        };

        let pair_ref = pair.as_ref().map(|(a, b)| (a.as_str(), b.as_str()));
        let risk = self.resolver.resolve(&graph, pair_ref, &docs, &response).await;

        let grounding = if self.config.grounding_verification && !response.is_empty() {
            match self.verifier.verify(&response, &docs).await {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    tracing::warn!(error = %e, "Grounding verifier unavailable");
                    None
                }
            }
        } else {
            None
        };

        let confidence = self.aggregator.aggregate(retrieval, grounding);
        let citations = self.build_citations(&docs);

        InteractionAnswer {
            query: query.to_string(),
            response,
            risk,
            grounding_score: grounding.map(|m| m.grounding_score).unwrap_or(0.0),
            confidence,
            num_retrieved_docs: docs.len(),
            citations,
            retrieved: docs,
        }
    }

    /// Graceful shutdown hook for the caller's lifecycle; the service
    /// holds no open resources beyond its clients.
    pub fn close(self) {
        tracing::info!("Interaction service closed");
    }

    fn build_prompt(&self, query: &str, docs: &[DocumentChunk]) -> String {
        let mut context = String::new();
        let mut included = 0usize;
        for doc in docs.iter().take(self.config.context_docs) {
            let text = doc.text.replace('\n', " ");
            let text = text.trim();
            if text.len() < 10 {
                continue;
            }
            included += 1;
            context.push_str(&format!("[Document {}]: {}\n\n", included, text));
        }
        if context.is_empty() {
            context.push_str("No detailed interaction records found.");
        }
        let context: String = context.chars().take(self.config.context_chars).collect();

        format!(
            "Instruction: Answer strictly based on the Context below. If the text says \
             'no interaction', explicitly state 'No known interaction found'.\n\n\
             Context:\n{}\n\nQuestion: {}\n\nAnswer:",
            context, query
        )
    }

    fn build_citations(&self, docs: &[DocumentChunk]) -> Vec<Citation> {
        docs.iter()
            .take(self.config.citation_limit)
            .enumerate()
            .map(|(i, doc)| Citation {
                id: i + 1,
                drug_name: doc
                    .drug_name
                    .clone()
                    .unwrap_or_else(|| doc.source.clone()),
                source: doc.source.clone(),
                relevance_score: doc.relevance_score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::{ClientError, ClientResult, GroundingMetrics};
    use retrieve::RetrieverConfig;

    struct FixedIndex(Vec<DocumentChunk>);

    impl SemanticIndex for FixedIndex {
        async fn search(&self, _query: &str, top_k: usize) -> ClientResult<Vec<DocumentChunk>> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    struct LengthEncoder;

    impl CrossEncoder for LengthEncoder {
        async fn score(&self, _query: &str, document: &str) -> ClientResult<f32> {
            Ok(document.len() as f32)
        }
    }

    struct BasisEmbedder;

    impl Embedder for BasisEmbedder {
        async fn embed(&self, text: &str) -> ClientResult<Vec<f32>> {
            use crate::severity::ONTOLOGY_CONCEPTS;
            let mut v = vec![0.0f32; 5];
            match ONTOLOGY_CONCEPTS.iter().position(|c| c.text == text) {
                Some(idx) => v[idx] = 1.0,
                None => v[4] = 1.0,
            }
            Ok(v)
        }
    }

    struct EchoGenerator {
        fail: bool,
    }

    impl Generator for EchoGenerator {
        async fn generate(&self, _prompt: &str) -> ClientResult<String> {
            if self.fail {
                Err(ClientError::Unreachable("down".to_string()))
            } else {
                Ok("Aspirin and warfarin together increase bleeding risk.".to_string())
            }
        }
    }

    struct FixedVerifier;

    impl GroundingVerifier for FixedVerifier {
        async fn verify(
            &self,
            _response: &str,
            _evidence: &[DocumentChunk],
        ) -> ClientResult<GroundingMetrics> {
            Ok(GroundingMetrics { grounding_score: 0.9, hallucination_rate: 0.1 })
        }
    }

    fn records() -> Vec<InteractionRecord> {
        vec![InteractionRecord::new(
            "Aspirin",
            "Warfarin",
            "major",
            "Increases risk of serious bleeding.",
        )]
    }

    fn corpus() -> Vec<DocumentChunk> {
        vec![
            DocumentChunk::new("drugbank", "Aspirin with warfarin increases bleeding risk.")
                .with_drug("Aspirin")
                .with_interaction("Warfarin", "bleeding"),
            DocumentChunk::new("drugbank", "Warfarin is an anticoagulant medication.")
                .with_drug("Warfarin"),
        ]
    }

    async fn service(
        chunks: Vec<DocumentChunk>,
        generator_fails: bool,
    ) -> InteractionService<FixedIndex, LengthEncoder, BasisEmbedder, EchoGenerator, FixedVerifier>
    {
        let retriever =
            HybridRetriever::new(FixedIndex(chunks), LengthEncoder, RetrieverConfig::default());
        let resolver = SeverityResolver::init(BasisEmbedder).await.unwrap();
        InteractionService::init(
            &records(),
            retriever,
            resolver,
            ConfidenceAggregator::default(),
            EchoGenerator { fail: generator_fails },
            FixedVerifier,
            ServiceConfig::default(),
        )
    }

    #[tokio::test]
    async fn known_pair_resolves_high_via_graph() {
        let service = service(corpus(), false).await;
        let answer = service.answer("Can I take aspirin and warfarin together?").await;

        assert_eq!(answer.risk, RiskLabel::High);
        assert!(!answer.response.is_empty());
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].id, 1);
        assert!((answer.grounding_score - 0.9).abs() < 1e-12);
    }

    #[tokio::test]
    async fn generator_failure_still_resolves_risk() {
        let service = service(corpus(), true).await;
        let answer = service.answer("aspirin and warfarin?").await;

        assert_eq!(answer.risk, RiskLabel::High);
        assert!(answer.response.is_empty());
        // No response means no grounding verification.
        assert_eq!(answer.grounding_score, 0.0);
    }

    #[tokio::test]
    async fn empty_corpus_bottoms_out_low() {
        let service = service(Vec::new(), false).await;
        let answer = service.answer("unknown substances?").await;

        assert_eq!(answer.risk, RiskLabel::Low);
        assert!(answer.citations.is_empty());
        assert_eq!(answer.num_retrieved_docs, 0);
    }

    #[tokio::test]
    async fn rebuild_swaps_graph_atomically() {
        let service = service(corpus(), false).await;
        let old_graph = service.graph();

        service.rebuild_graph(&[InteractionRecord::new(
            "Metformin",
            "Insulin",
            "minor",
            "hypoglycemia watch",
        )]);

        let new_graph = service.graph();
        assert!(!Arc::ptr_eq(&old_graph, &new_graph));
        // Old handle still answers from the old graph.
        assert!(old_graph.get_interaction("Aspirin", "Warfarin").is_some());
        assert!(new_graph.get_interaction("Aspirin", "Warfarin").is_none());
        assert!(new_graph.get_interaction("Metformin", "Insulin").is_some());
    }

    #[tokio::test]
    async fn retrieve_truncates_to_requested_k() {
        let service = service(corpus(), false).await;
        let docs = service.retrieve("aspirin and warfarin", 1).await;
        assert_eq!(docs.len(), 1);
    }
}

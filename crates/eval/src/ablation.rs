//! One-feature-off comparison against the full pipeline configuration.
//! Each variant disables exactly one stage; the report carries the raw
//! variant metrics plus their deltas against the full run, so a stage's
//! contribution is read directly off its delta.

use serde::{Deserialize, Serialize};

use resolve::ServiceConfig;
use retrieve::RetrieverConfig;

use crate::harness::{GenerationMetrics, RetrievalMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AblationVariant {
    GraphFusion,
    Reranking,
    Uncertainty,
    GroundingVerification,
}

impl AblationVariant {
    pub fn all() -> [AblationVariant; 4] {
        [
            Self::GraphFusion,
            Self::Reranking,
            Self::Uncertainty,
            Self::GroundingVerification,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GraphFusion => "no_graph_fusion",
            Self::Reranking => "no_reranking",
            Self::Uncertainty => "no_uncertainty",
            Self::GroundingVerification => "no_grounding_verification",
        }
    }

    /// Retriever configuration with this variant's stage disabled.
    /// Uncertainty and grounding live in the service layer, so those
    /// variants leave the retriever untouched.
    pub fn retriever_config(self, base: &RetrieverConfig) -> RetrieverConfig {
        let mut config = base.clone();
        match self {
            Self::GraphFusion => config.graph_fusion = false,
            Self::Reranking => config.reranking = false,
            Self::Uncertainty | Self::GroundingVerification => {}
        }
        config
    }

    pub fn service_config(self, base: &ServiceConfig) -> ServiceConfig {
        let mut config = base.clone();
        match self {
            Self::Uncertainty => config.uncertainty = false,
            Self::GroundingVerification => config.grounding_verification = false,
            Self::GraphFusion | Self::Reranking => {}
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AblationDelta {
    pub variant: String,
    pub metrics: RetrievalMetrics,
    pub delta_precision_at_k: f64,
    pub delta_recall_at_k: f64,
    pub delta_ndcg_at_k: f64,
    pub delta_mrr: f64,
}

/// Service-level variant scored on the end-to-end answer metrics, the
/// ones the uncertainty and grounding flags actually move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAblationDelta {
    pub variant: String,
    pub metrics: GenerationMetrics,
    pub delta_risk_accuracy: f64,
    pub delta_keyword_coverage: f64,
    pub delta_avg_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAblationReport {
    pub full: GenerationMetrics,
    pub variants: Vec<ServiceAblationDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AblationReport {
    pub full: RetrievalMetrics,
    pub variants: Vec<AblationDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceAblationReport>,
}

impl AblationReport {
    pub fn with_service(mut self, service: ServiceAblationReport) -> Self {
        self.service = Some(service);
        self
    }
}

/// Deltas are variant minus full: a negative delta means the disabled
/// stage was contributing.
pub fn compare(full: RetrievalMetrics, variants: Vec<RetrievalMetrics>) -> AblationReport {
    let deltas = variants
        .into_iter()
        .map(|metrics| AblationDelta {
            delta_precision_at_k: metrics.precision_at_k - full.precision_at_k,
            delta_recall_at_k: metrics.recall_at_k - full.recall_at_k,
            delta_ndcg_at_k: metrics.ndcg_at_k - full.ndcg_at_k,
            delta_mrr: metrics.mrr - full.mrr,
            variant: metrics.method.clone(),
            metrics,
        })
        .collect();

    AblationReport { full, variants: deltas, service: None }
}

pub fn compare_generation(
    full: GenerationMetrics,
    variants: Vec<(String, GenerationMetrics)>,
) -> ServiceAblationReport {
    let deltas = variants
        .into_iter()
        .map(|(variant, metrics)| ServiceAblationDelta {
            delta_risk_accuracy: metrics.risk_accuracy - full.risk_accuracy,
            delta_keyword_coverage: metrics.keyword_coverage - full.keyword_coverage,
            delta_avg_confidence: metrics.avg_confidence - full.avg_confidence,
            variant,
            metrics,
        })
        .collect();

    ServiceAblationReport { full, variants: deltas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{evaluate_answers, evaluate_retrieval};
    use clients::{
        ClientResult, CrossEncoder, Embedder, Generator, GroundingMetrics, GroundingVerifier,
        SemanticIndex,
    };
    use graph::InteractionGraph;
    use ingest::{DocumentChunk, GroundTruthExample, InteractionRecord};
    use resolve::{ConfidenceAggregator, InteractionService, SeverityResolver};
    use retrieve::HybridRetriever;

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

    fn fixture_corpus() -> Vec<DocumentChunk> {
        vec![
            // Cross-encoder alone prefers this one (longest text).
            DocumentChunk::new(
                "noise",
                "an extended passage about general dietary supplement guidance and hydration",
            )
            .with_drug("Vitamin D"),
            // Graph fusion is what surfaces this one.
            DocumentChunk::new("drugbank", "aspirin warfarin bleeding")
                .with_drug("Aspirin")
                .with_interaction("Warfarin", "bleeding"),
        ]
    }

    fn fixture_graph() -> InteractionGraph {
        InteractionGraph::build(&[InteractionRecord::new(
            "Aspirin",
            "Warfarin",
            "major",
            "bleeding risk",
        )])
    }

    #[test]
    fn variant_configs_flip_exactly_one_flag() {
        let base = RetrieverConfig::default();
        let service_base = ServiceConfig::default();

        let no_fusion = AblationVariant::GraphFusion.retriever_config(&base);
        assert!(!no_fusion.graph_fusion);
        assert!(no_fusion.reranking);

        let no_rerank = AblationVariant::Reranking.retriever_config(&base);
        assert!(no_rerank.graph_fusion);
        assert!(!no_rerank.reranking);

        let no_uncertainty = AblationVariant::Uncertainty.service_config(&service_base);
        assert!(!no_uncertainty.uncertainty);
        assert!(no_uncertainty.grounding_verification);

        let no_grounding = AblationVariant::GroundingVerification.service_config(&service_base);
        assert!(!no_grounding.grounding_verification);
    }

    #[tokio::test]
    async fn disabling_graph_fusion_never_improves_fixture_precision() {
        let graph = fixture_graph();
        let test_set = vec![GroundTruthExample::new(
            "aspirin and warfarin",
            &["aspirin", "warfarin"],
            "HIGH",
            &[],
        )];
        let k = 1;
        let query_drugs = vec!["Aspirin".to_string(), "Warfarin".to_string()];

        let base = RetrieverConfig { final_k: 1, ..Default::default() };

        let full_retriever =
            HybridRetriever::new(FixedIndex(fixture_corpus()), LengthEncoder, base.clone());
        let full = evaluate_retrieval("full", &test_set, k, |query| {
            let retriever = &full_retriever;
            let drugs = &query_drugs;
            let graph = &graph;
            async move { retriever.retrieve(&query, drugs, graph).await }
        })
        .await;

        let ablated_config = AblationVariant::GraphFusion.retriever_config(&base);
        let ablated_retriever =
            HybridRetriever::new(FixedIndex(fixture_corpus()), LengthEncoder, ablated_config);
        let ablated = evaluate_retrieval("no_graph_fusion", &test_set, k, |query| {
            let retriever = &ablated_retriever;
            let drugs = &query_drugs;
            let graph = &graph;
            async move { retriever.retrieve(&query, drugs, graph).await }
        })
        .await;

        let report = compare(full, vec![ablated]);
        assert_eq!(report.full.precision_at_k, 1.0);
        assert!(report.variants[0].delta_precision_at_k <= 0.0);
    }

    struct FlatEmbedder;

    impl Embedder for FlatEmbedder {
        async fn embed(&self, _text: &str) -> ClientResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct FixedGenerator;

    impl Generator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> ClientResult<String> {
            Ok("Aspirin with warfarin raises bleeding risk.".to_string())
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

    async fn generation_run(
        config: ServiceConfig,
        test_set: &[GroundTruthExample],
    ) -> GenerationMetrics {
        let retriever = HybridRetriever::new(
            FixedIndex(fixture_corpus()),
            LengthEncoder,
            RetrieverConfig::default(),
        );
        let resolver = SeverityResolver::init(FlatEmbedder).await.unwrap();
        let service = InteractionService::init(
            &[InteractionRecord::new("Aspirin", "Warfarin", "major", "bleeding risk")],
            retriever,
            resolver,
            ConfidenceAggregator::default(),
            FixedGenerator,
            FixedVerifier,
            config,
        );

        let mut answers = Vec::with_capacity(test_set.len());
        for example in test_set {
            answers.push(service.answer(&example.query).await);
        }
        evaluate_answers(test_set, &answers)
    }

    #[tokio::test]
    async fn service_variants_run_end_to_end() {
        let test_set = vec![GroundTruthExample::new(
            "Can I take aspirin with warfarin?",
            &["aspirin", "warfarin"],
            "HIGH",
            &["bleeding"],
        )];

        let full = generation_run(ServiceConfig::default(), &test_set).await;
        let mut variant_runs = Vec::new();
        for variant in [AblationVariant::Uncertainty, AblationVariant::GroundingVerification] {
            let config = variant.service_config(&ServiceConfig::default());
            let metrics = generation_run(config, &test_set).await;
            variant_runs.push((variant.label().to_string(), metrics));
        }

        let report = compare_generation(full, variant_runs);

        assert_eq!(report.variants.len(), 2);
        assert!(report.variants.iter().any(|v| v.variant == "no_uncertainty"));
        assert!(report.variants.iter().any(|v| v.variant == "no_grounding_verification"));

        // With the retrieval signal off, confidence is the grounding blend
        // alone: (0.4 * 0.9 + 0.2 * 0.9) / 0.6.
        let no_uncertainty = report
            .variants
            .iter()
            .find(|v| v.variant == "no_uncertainty")
            .unwrap();
        assert_eq!(no_uncertainty.metrics.queries, 1);
        assert!((no_uncertainty.metrics.avg_confidence - 0.9).abs() < 1e-9);
        assert!((1.0 - no_uncertainty.metrics.risk_accuracy).abs() < 1e-12);
    }

    #[test]
    fn compare_reports_deltas_against_full() {
        let full = RetrievalMetrics {
            method: "full".to_string(),
            queries: 4,
            precision_at_k: 0.8,
            recall_at_k: 0.7,
            ndcg_at_k: 0.9,
            mrr: 0.85,
            f1: 0.75,
        };
        let variant = RetrievalMetrics {
            method: "no_reranking".to_string(),
            queries: 4,
            precision_at_k: 0.6,
            recall_at_k: 0.7,
            ndcg_at_k: 0.8,
            mrr: 0.8,
            f1: 0.65,
        };

        let report = compare(full, vec![variant]);
        let delta = &report.variants[0];
        assert_eq!(delta.variant, "no_reranking");
        assert!((delta.delta_precision_at_k + 0.2).abs() < 1e-12);
        assert!(delta.delta_recall_at_k.abs() < 1e-12);
    }
}

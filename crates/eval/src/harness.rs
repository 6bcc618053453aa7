//! Drives methods over a ground-truth set and aggregates per-query
//! metrics. Aggregation is running sums only, so example order never
//! changes the result.

use serde::{Deserialize, Serialize};

use graph::RiskLabel;
use ingest::{DocumentChunk, GroundTruthExample};
use resolve::InteractionAnswer;

use crate::baselines::SearchBackend;
use crate::metrics::{f1_score, ndcg_at_k, precision_at_k, recall_at_k, reciprocal_rank};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub method: String,
    pub queries: usize,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub ndcg_at_k: f64,
    pub mrr: f64,
    pub f1: f64,
}

/// Order-independent accumulator for per-query retrieval metrics.
#[derive(Debug, Default)]
struct MetricSums {
    queries: usize,
    precision: f64,
    recall: f64,
    ndcg: f64,
    reciprocal: f64,
}

impl MetricSums {
    fn add(&mut self, retrieved: &[DocumentChunk], expected_drugs: &[String], k: usize) {
        self.queries += 1;
        self.precision += precision_at_k(retrieved, expected_drugs, k);
        self.recall += recall_at_k(retrieved, expected_drugs, k);
        self.ndcg += ndcg_at_k(retrieved, expected_drugs, k);
        self.reciprocal += reciprocal_rank(retrieved, expected_drugs);
    }

    fn finish(self, method: &str) -> RetrievalMetrics {
        let n = self.queries.max(1) as f64;
        let precision = self.precision / n;
        let recall = self.recall / n;
        RetrievalMetrics {
            method: method.to_string(),
            queries: self.queries,
            precision_at_k: precision,
            recall_at_k: recall,
            ndcg_at_k: self.ndcg / n,
            mrr: self.reciprocal / n,
            f1: f1_score(precision, recall),
        }
    }
}

/// Evaluate a synchronous baseline.
pub fn evaluate_backend(
    backend: &dyn SearchBackend,
    test_set: &[GroundTruthExample],
    k: usize,
) -> RetrievalMetrics {
    let mut sums = MetricSums::default();
    for example in test_set {
        let retrieved = backend.search(&example.query, k);
        sums.add(&retrieved, &example.expected_drugs, k);
    }
    sums.finish(backend.name())
}

/// Evaluate any async retrieval function, the hybrid pipeline included.
/// Queries are handed over by value so the returned future owns its input.
pub async fn evaluate_retrieval<F, Fut>(
    method: &str,
    test_set: &[GroundTruthExample],
    k: usize,
    mut retrieve: F,
) -> RetrievalMetrics
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Vec<DocumentChunk>>,
{
    let mut sums = MetricSums::default();
    for example in test_set {
        let retrieved = retrieve(example.query.clone()).await;
        sums.add(&retrieved, &example.expected_drugs, k);
    }
    sums.finish(method)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub queries: usize,
    /// Fraction of queries whose resolved risk equals the annotated risk.
    pub risk_accuracy: f64,
    /// Mean absolute distance between resolved and annotated risk ordinals.
    pub risk_mae: f64,
    /// Mean fraction of expected keywords appearing in the response text.
    pub keyword_coverage: f64,
    /// Mean fraction of citations naming an expected drug.
    pub citation_accuracy: f64,
    pub avg_confidence: f64,
}

/// Score end-to-end answers against their ground-truth examples. The two
/// slices are positionally paired.
pub fn evaluate_answers(
    test_set: &[GroundTruthExample],
    answers: &[InteractionAnswer],
) -> GenerationMetrics {
    let mut queries = 0usize;
    let mut risk_hits = 0.0f64;
    let mut risk_distance = 0.0f64;
    let mut keyword_coverage = 0.0f64;
    let mut citation_accuracy = 0.0f64;
    let mut confidence = 0.0f64;

    for (example, answer) in test_set.iter().zip(answers) {
        queries += 1;

        if let Some(expected) = RiskLabel::parse(&example.expected_risk) {
            if answer.risk == expected {
                risk_hits += 1.0;
            }
            risk_distance += (answer.risk.ordinal() - expected.ordinal()).abs() as f64;
        }

        if !example.expected_keywords.is_empty() {
            let response = answer.response.to_lowercase();
            let found = example
                .expected_keywords
                .iter()
                .filter(|kw| response.contains(&kw.to_lowercase()))
                .count();
            keyword_coverage += found as f64 / example.expected_keywords.len() as f64;
        }

        if !answer.citations.is_empty() {
            let matching = answer
                .citations
                .iter()
                .filter(|c| {
                    let name = c.drug_name.to_lowercase();
                    example
                        .expected_drugs
                        .iter()
                        .any(|d| name.contains(&d.to_lowercase()))
                })
                .count();
            citation_accuracy += matching as f64 / answer.citations.len() as f64;
        }

        confidence += answer.confidence.overall_confidence;
    }

    let n = queries.max(1) as f64;
    GenerationMetrics {
        queries,
        risk_accuracy: risk_hits / n,
        risk_mae: risk_distance / n,
        keyword_coverage: keyword_coverage / n,
        citation_accuracy: citation_accuracy / n,
        avg_confidence: confidence / n,
    }
}

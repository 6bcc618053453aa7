use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::ablation::AblationReport;
use crate::harness::{GenerationMetrics, RetrievalMetrics};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    std::fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Render per-method retrieval metrics as a markdown table, best
/// precision first.
pub fn method_table(methods: &[RetrievalMetrics]) -> String {
    let mut rows: Vec<&RetrievalMetrics> = methods.iter().collect();
    rows.sort_by(|a, b| {
        b.precision_at_k
            .partial_cmp(&a.precision_at_k)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::from("| Method | P@5 | R@5 | NDCG@5 | MRR | F1 |\n");
    out.push_str("|--------|-----|-----|--------|-----|----|\n");
    for m in rows {
        out.push_str(&format!(
            "| {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            m.method, m.precision_at_k, m.recall_at_k, m.ndcg_at_k, m.mrr, m.f1
        ));
    }
    out
}

pub fn ablation_table(report: &AblationReport) -> String {
    let mut out = String::from("| Configuration | P@5 | ΔP@5 | NDCG@5 | ΔNDCG@5 |\n");
    out.push_str("|---------------|-----|------|--------|---------|\n");
    out.push_str(&format!(
        "| full | {:.3} | — | {:.3} | — |\n",
        report.full.precision_at_k, report.full.ndcg_at_k
    ));
    for variant in &report.variants {
        out.push_str(&format!(
            "| {} | {:.3} | {:+.3} | {:.3} | {:+.3} |\n",
            variant.variant,
            variant.metrics.precision_at_k,
            variant.delta_precision_at_k,
            variant.metrics.ndcg_at_k,
            variant.delta_ndcg_at_k
        ));
    }

    if let Some(service) = &report.service {
        out.push_str("\n| Configuration | Risk acc | ΔRisk acc | Confidence | ΔConfidence |\n");
        out.push_str("|---------------|----------|-----------|------------|-------------|\n");
        out.push_str(&format!(
            "| full | {:.3} | — | {:.3} | — |\n",
            service.full.risk_accuracy, service.full.avg_confidence
        ));
        for variant in &service.variants {
            out.push_str(&format!(
                "| {} | {:.3} | {:+.3} | {:.3} | {:+.3} |\n",
                variant.variant,
                variant.metrics.risk_accuracy,
                variant.delta_risk_accuracy,
                variant.metrics.avg_confidence,
                variant.delta_avg_confidence
            ));
        }
    }
    out
}

pub fn generation_section(metrics: &GenerationMetrics) -> String {
    format!(
        "## Generation\n\n\
         - Queries: {}\n\
         - Risk accuracy: {:.3}\n\
         - Risk MAE: {:.3}\n\
         - Keyword coverage: {:.3}\n\
         - Citation accuracy: {:.3}\n\
         - Avg confidence: {:.3}\n",
        metrics.queries,
        metrics.risk_accuracy,
        metrics.risk_mae,
        metrics.keyword_coverage,
        metrics.citation_accuracy,
        metrics.avg_confidence
    )
}

/// Assemble and write the full EVALUATION.md report.
pub fn write_markdown(
    path: &Path,
    methods: &[RetrievalMetrics],
    ablation: &AblationReport,
    generation: Option<&GenerationMetrics>,
) -> Result<()> {
    let mut out = String::from("# Evaluation Results\n\n## Retrieval\n\n");
    out.push_str(&method_table(methods));
    out.push_str("\n## Ablation\n\n");
    out.push_str(&ablation_table(ablation));
    if let Some(generation) = generation {
        out.push('\n');
        out.push_str(&generation_section(generation));
    }
    std::fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(method: &str, precision: f64) -> RetrievalMetrics {
        RetrievalMetrics {
            method: method.to_string(),
            queries: 8,
            precision_at_k: precision,
            recall_at_k: 0.5,
            ndcg_at_k: 0.6,
            mrr: 0.7,
            f1: 0.5,
        }
    }

    #[test]
    fn method_table_sorts_by_precision() {
        let table = method_table(&[metrics("bm25", 0.4), metrics("hybrid", 0.8)]);
        let hybrid_pos = table.find("hybrid").unwrap();
        let bm25_pos = table.find("bm25").unwrap();
        assert!(hybrid_pos < bm25_pos);
        assert!(table.contains("| hybrid | 0.800 |"));
    }

    #[test]
    fn ablation_table_shows_signed_deltas() {
        let report = crate::ablation::compare(
            metrics("full", 0.8),
            vec![metrics("no_reranking", 0.6)],
        );
        let table = ablation_table(&report);
        assert!(table.contains("-0.200"));
    }

    fn generation(risk_accuracy: f64, avg_confidence: f64) -> GenerationMetrics {
        GenerationMetrics {
            queries: 8,
            risk_accuracy,
            risk_mae: 0.2,
            keyword_coverage: 0.6,
            citation_accuracy: 0.7,
            avg_confidence,
        }
    }

    #[test]
    fn ablation_table_includes_service_variants() {
        let report = crate::ablation::compare(
            metrics("full", 0.8),
            vec![metrics("no_reranking", 0.6)],
        )
        .with_service(crate::ablation::compare_generation(
            generation(0.9, 0.8),
            vec![
                ("no_uncertainty".to_string(), generation(0.9, 0.9)),
                ("no_grounding_verification".to_string(), generation(0.8, 0.5)),
            ],
        ));

        let table = ablation_table(&report);
        assert!(table.contains("no_uncertainty"));
        assert!(table.contains("no_grounding_verification"));
        assert!(table.contains("+0.100"));
        assert!(table.contains("-0.300"));
    }
}

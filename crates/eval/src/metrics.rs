//! Ranking metrics as pure functions of (retrieved sequence, expected
//! drugs, k). Relevance is binary: a chunk is relevant when its drug or
//! interacting-drug field case-insensitively contains any expected drug.

use ingest::DocumentChunk;

/// Does this chunk mention any of the expected drugs?
pub fn is_relevant(chunk: &DocumentChunk, expected_drugs: &[String]) -> bool {
    expected_drugs.iter().any(|drug| {
        let drug = drug.to_lowercase();
        field_contains(chunk.drug_name.as_deref(), &drug)
            || field_contains(chunk.interacting_drug.as_deref(), &drug)
    })
}

fn field_contains(field: Option<&str>, drug_lower: &str) -> bool {
    field
        .map(|f| f.to_lowercase().contains(drug_lower))
        .unwrap_or(false)
}

/// Fraction of the top-k items that are relevant. The denominator is k
/// itself, so retrieving fewer than k items is penalized.
pub fn precision_at_k(retrieved: &[DocumentChunk], expected_drugs: &[String], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|c| is_relevant(c, expected_drugs))
        .count();
    hits as f64 / k as f64
}

/// Fraction of distinct expected drugs matched anywhere in the top-k.
pub fn recall_at_k(retrieved: &[DocumentChunk], expected_drugs: &[String], k: usize) -> f64 {
    if expected_drugs.is_empty() {
        return 0.0;
    }
    let found = expected_drugs
        .iter()
        .filter(|drug| {
            let drug = drug.to_lowercase();
            retrieved.iter().take(k).any(|c| {
                field_contains(c.drug_name.as_deref(), &drug)
                    || field_contains(c.interacting_drug.as_deref(), &drug)
            })
        })
        .count();
    found as f64 / expected_drugs.len() as f64
}

/// Normalized discounted cumulative gain with binary relevance. The ideal
/// ordering places every relevant top-k item first; 0.0 when nothing in
/// the top-k is relevant.
pub fn ndcg_at_k(retrieved: &[DocumentChunk], expected_drugs: &[String], k: usize) -> f64 {
    let relevance: Vec<f64> = retrieved
        .iter()
        .take(k)
        .map(|c| if is_relevant(c, expected_drugs) { 1.0 } else { 0.0 })
        .collect();

    let dcg: f64 = relevance
        .iter()
        .enumerate()
        .map(|(i, rel)| rel / ((i + 2) as f64).log2())
        .sum();

    let relevant = relevance.iter().filter(|r| **r > 0.0).count();
    let ideal_dcg: f64 = (0..relevant).map(|i| 1.0 / ((i + 2) as f64).log2()).sum();

    if ideal_dcg == 0.0 { 0.0 } else { dcg / ideal_dcg }
}

/// Reciprocal of the 1-based rank of the first relevant item over the
/// whole retrieved sequence, not just the top-k. 0.0 when nothing matches.
pub fn reciprocal_rank(retrieved: &[DocumentChunk], expected_drugs: &[String]) -> f64 {
    retrieved
        .iter()
        .position(|c| is_relevant(c, expected_drugs))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

use ingest::DocumentChunk;

/// Retrieval confidence derived from the score spread of a ranked set.
///
/// High mean relevance with low spread reads as a confident retrieval;
/// scattered scores drag the estimate down. Empty sets are maximally
/// uncertain (0.0). Result is clamped to [0, 1].
pub fn retrieval_confidence(chunks: &[DocumentChunk]) -> f64 {
    if chunks.is_empty() {
        return 0.0;
    }

    let scores: Vec<f64> = chunks.iter().map(|c| c.relevance_score as f64).collect();
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let variance =
        scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
    let spread = variance.sqrt();

    (mean - spread).clamp(0.0, 1.0)
}

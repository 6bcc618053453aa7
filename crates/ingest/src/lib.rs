pub mod chunk;
pub mod ground_truth;
pub mod record;

pub use chunk::DocumentChunk;
pub use ground_truth::GroundTruthExample;
pub use record::InteractionRecord;

use anyhow::{Context, Result};
use std::path::Path;

/// Load an array of interaction records from a JSON file.
pub async fn load_interaction_records(path: &Path) -> Result<Vec<InteractionRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<InteractionRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse interaction records in {}", path.display()))?;
    tracing::info!(count = records.len(), "Loaded interaction records");
    Ok(records)
}

/// Load an array of document chunks from a JSON file.
pub async fn load_chunks(path: &Path) -> Result<Vec<DocumentChunk>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let chunks: Vec<DocumentChunk> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse document chunks in {}", path.display()))?;
    tracing::info!(count = chunks.len(), "Loaded document chunks");
    Ok(chunks)
}

/// Load every chunk file under a directory tree. Files that fail to parse
/// are skipped with a warning; a malformed file never aborts the load.
pub async fn load_chunk_directory(dir: &Path) -> Result<Vec<DocumentChunk>> {
    let mut all = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
    {
        match load_chunks(entry.path()).await {
            Ok(chunks) => all.extend(chunks),
            Err(e) => tracing::warn!(file = %entry.path().display(), error = %e, "Skipping chunk file"),
        }
    }
    Ok(all)
}

/// Load ground-truth evaluation examples from a JSON file.
pub async fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthExample>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let examples: Vec<GroundTruthExample> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse ground truth in {}", path.display()))?;
    Ok(examples)
}

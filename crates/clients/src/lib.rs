//! Capability interfaces for everything the core treats as an external
//! collaborator: embedding, cross-encoding, generation, grounding
//! verification, and vector search. The pipeline depends only on these
//! contracts; the HTTP implementations here are one possible transport.

pub mod grounding;
pub mod ollama;
pub mod rerank;
pub mod vector;

pub use grounding::HttpGroundingVerifier;
pub use ollama::{OllamaEmbedder, OllamaGenerator};
pub use rerank::HttpCrossEncoder;
pub use vector::VectorSearchClient;

use ingest::DocumentChunk;
use serde::{Deserialize, Serialize};

/// Why an external call failed. The pipeline matches on this to decide,
/// per stage, whether to degrade or propagate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("service unreachable: {0}")]
    Unreachable(String),
    #[error("service returned status {0}")]
    BadStatus(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::BadStatus(status.as_u16())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Text-embedding capability. Vectors are fixed-length for a given
/// implementation; the core never inspects dimensionality.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> impl Future<Output = ClientResult<Vec<f32>>> + Send;

    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = ClientResult<Vec<Vec<f32>>>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }
    }
}

/// Pairwise (query, document) relevance scorer. Raw scores are unbounded;
/// the retrieval pipeline min-max normalizes them.
pub trait CrossEncoder: Send + Sync {
    fn score(&self, query: &str, document: &str) -> impl Future<Output = ClientResult<f32>> + Send;
}

/// Text-generation capability.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = ClientResult<String>> + Send;
}

/// How well a generated answer is supported by its evidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroundingMetrics {
    pub grounding_score: f64,
    pub hallucination_rate: f64,
}

/// External verifier that checks a response against its evidence documents.
pub trait GroundingVerifier: Send + Sync {
    fn verify(
        &self,
        response: &str,
        evidence: &[DocumentChunk],
    ) -> impl Future<Output = ClientResult<GroundingMetrics>> + Send;
}

/// Stage-1 nearest-neighbor candidate search over the document corpus.
pub trait SemanticIndex: Send + Sync {
    fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> impl Future<Output = ClientResult<Vec<DocumentChunk>>> + Send;
}

use anyhow::{Context, Result};

use clients::Embedder;
use graph::{InteractionGraph, RiskLabel, SeverityCode};
use ingest::DocumentChunk;

/// Similarity floor below which an ontology match is discarded and the
/// severity forced to S0. Comparison is strict: a match at exactly the
/// floor is kept.
pub const MIN_ONTOLOGY_CONFIDENCE: f64 = 0.40;

/// Canonical severity descriptions matched against evidence text when the
/// graph has no direct answer.
pub struct OntologyConcept {
    pub id: &'static str,
    pub severity: SeverityCode,
    pub text: &'static str,
}

pub const ONTOLOGY_CONCEPTS: [OntologyConcept; 4] = [
    OntologyConcept {
        id: "S3_MAJOR",
        severity: SeverityCode::S3,
        text: "Severe or life-threatening drug interaction that may cause major bleeding, \
               organ failure, or death. The combination is often contraindicated.",
    },
    OntologyConcept {
        id: "S2_MODERATE",
        severity: SeverityCode::S2,
        text: "Clinically significant interaction that usually requires dose adjustment, \
               therapy modification, or close monitoring.",
    },
    OntologyConcept {
        id: "S1_MINOR",
        severity: SeverityCode::S1,
        text: "Minor interaction with limited clinical impact. It may cause mild side \
               effects but usually does not require a change in therapy.",
    },
    OntologyConcept {
        id: "S0_NONE",
        severity: SeverityCode::S0,
        text: "No clinically meaningful drug interaction is known. The combination is \
               generally considered safe.",
    },
];

/// Two-step severity resolution: graph edge lookup first, semantic
/// ontology match as fallback. Always produces exactly one of
/// HIGH / MODERATE / LOW; external failures degrade to LOW.
pub struct SeverityResolver<E> {
    embedder: E,
    concept_embeddings: Vec<Vec<f32>>,
}

impl<E: Embedder> SeverityResolver<E> {
    /// Embed the four ontology concepts once; they are read-only for the
    /// resolver's lifetime.
    pub async fn init(embedder: E) -> Result<Self> {
        let texts: Vec<String> = ONTOLOGY_CONCEPTS.iter().map(|c| c.text.to_string()).collect();
        let concept_embeddings = embedder
            .embed_batch(&texts)
            .await
            .context("Failed to embed ontology severity concepts")?;

        Ok(Self { embedder, concept_embeddings })
    }

    /// Resolve risk for a query. `pair` is the recognized drug pair, if
    /// any; `generated` is the model's answer text (may be empty).
    pub async fn resolve(
        &self,
        interaction_graph: &InteractionGraph,
        pair: Option<(&str, &str)>,
        docs: &[DocumentChunk],
        generated: &str,
    ) -> RiskLabel {
        if let Some((drug_a, drug_b)) = pair {
            if let Some(edge) = interaction_graph.get_interaction(drug_a, drug_b) {
                tracing::info!(
                    drug_a,
                    drug_b,
                    severity = edge.severity_code.as_str(),
                    "Graph edge resolved severity"
                );
                return edge.severity_code.risk_label();
            }
            tracing::info!(drug_a, drug_b, "No graph edge, falling back to ontology");
        }

        self.resolve_ontology(docs, generated).await
    }

    async fn resolve_ontology(&self, docs: &[DocumentChunk], generated: &str) -> RiskLabel {
        if docs.is_empty() && generated.trim().is_empty() {
            return RiskLabel::Low;
        }

        let mut combined = String::from(generated);
        for doc in docs {
            combined.push(' ');
            combined.push_str(&doc.text);
        }

        let evidence_embedding = match self.embedder.embed(&combined).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "Embedder unavailable, degrading to LOW");
                return RiskLabel::Low;
            }
        };

        let mut best_idx = 0usize;
        let mut best_score = f64::NEG_INFINITY;
        for (idx, concept_embedding) in self.concept_embeddings.iter().enumerate() {
            let score = cosine_similarity(&evidence_embedding, concept_embedding);
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        let concept = &ONTOLOGY_CONCEPTS[best_idx];
        tracing::info!(
            concept = concept.id,
            score = best_score,
            "Ontology severity match"
        );

        severity_from_similarity(best_score, concept.severity).risk_label()
    }
}

/// Apply the confidence floor to an ontology match. Strictly-below scores
/// force S0; a score at exactly the floor keeps the matched severity.
pub fn severity_from_similarity(top_score: f64, matched: SeverityCode) -> SeverityCode {
    if top_score < MIN_ONTOLOGY_CONFIDENCE {
        SeverityCode::S0
    } else {
        matched
    }
}

/// Cosine similarity with f64 accumulation. Zero vectors compare as 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64).powi(2);
        norm_b += (*y as f64).powi(2);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

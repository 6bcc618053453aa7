pub mod confidence;
pub mod service;
pub mod severity;

pub use confidence::{ConfidenceAggregator, ConfidenceLevel, ConfidenceReport, ConfidenceWeights};
pub use service::{Citation, InteractionAnswer, InteractionService, ServiceConfig};
pub use severity::{MIN_ONTOLOGY_CONFIDENCE, SeverityResolver, cosine_similarity};

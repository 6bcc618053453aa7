pub mod expansion;
pub mod hybrid;
pub mod uncertainty;

pub use expansion::expand_query;
pub use hybrid::{HybridRetriever, RetrieverConfig};
pub use uncertainty::retrieval_confidence;

pub mod ablation;
pub mod baselines;
pub mod harness;
pub mod metrics;
pub mod plots;
pub mod report;
pub mod test_set;

pub use ablation::{AblationReport, AblationVariant, compare};
pub use baselines::{Bm25Index, KeywordIndex, RandomBaseline, SearchBackend};
pub use harness::{
    GenerationMetrics, RetrievalMetrics, evaluate_answers, evaluate_backend, evaluate_retrieval,
};
pub use plots::generate_plots;
pub use test_set::default_test_set;

pub mod interaction;
pub mod mention;
pub mod severity;

pub use interaction::{DrugNode, GraphStats, InteractionEdge, InteractionGraph};
pub use mention::{DrugMentionRecognizer, SubstringRecognizer};
pub use severity::{RiskLabel, SeverityCode};

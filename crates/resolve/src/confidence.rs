use serde::{Deserialize, Serialize};

use clients::GroundingMetrics;

/// Blend weights for the overall confidence estimate. The defaults are a
/// configuration choice, not a derived quantity; change them here rather
/// than in the aggregation code.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceWeights {
    pub retrieval: f64,
    pub grounding: f64,
    /// Weight of (1 - hallucination_rate).
    pub factuality: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            retrieval: 0.4,
            grounding: 0.4,
            factuality: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub overall_confidence: f64,
    pub level: ConfidenceLevel,
}

/// Combines retrieval uncertainty and grounding-verification signals into
/// one bucketed confidence estimate.
///
/// Monotonic by construction: a higher grounding score never lowers the
/// overall confidence, a higher hallucination rate never raises it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceAggregator {
    weights: ConfidenceWeights,
}

impl ConfidenceAggregator {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    /// Either signal may be absent (its pipeline stage disabled or
    /// degraded); weights renormalize over whatever is present. Nothing
    /// present means no basis for confidence: 0.0 / Low.
    pub fn aggregate(
        &self,
        retrieval_confidence: Option<f64>,
        grounding: Option<GroundingMetrics>,
    ) -> ConfidenceReport {
        let mut weighted = 0.0f64;
        let mut total_weight = 0.0f64;

        if let Some(retrieval) = retrieval_confidence {
            weighted += self.weights.retrieval * retrieval.clamp(0.0, 1.0);
            total_weight += self.weights.retrieval;
        }

        if let Some(metrics) = grounding {
            weighted += self.weights.grounding * metrics.grounding_score.clamp(0.0, 1.0);
            weighted +=
                self.weights.factuality * (1.0 - metrics.hallucination_rate.clamp(0.0, 1.0));
            total_weight += self.weights.grounding + self.weights.factuality;
        }

        let overall = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };

        ConfidenceReport {
            overall_confidence: overall,
            level: bucket(overall),
        }
    }
}

fn bucket(overall: f64) -> ConfidenceLevel {
    if overall >= 0.75 {
        ConfidenceLevel::High
    } else if overall >= 0.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(grounding_score: f64, hallucination_rate: f64) -> GroundingMetrics {
        GroundingMetrics { grounding_score, hallucination_rate }
    }

    #[test]
    fn strong_signals_bucket_high() {
        let report = ConfidenceAggregator::default().aggregate(Some(0.9), Some(metrics(0.9, 0.05)));
        assert!(report.overall_confidence > 0.75);
        assert_eq!(report.level, ConfidenceLevel::High);
    }

    #[test]
    fn no_signals_bucket_low() {
        let report = ConfidenceAggregator::default().aggregate(None, None);
        assert_eq!(report.overall_confidence, 0.0);
        assert_eq!(report.level, ConfidenceLevel::Low);
    }

    #[test]
    fn monotonic_in_grounding_score() {
        let aggregator = ConfidenceAggregator::default();
        let mut previous = -1.0;
        for step in 0..=10 {
            let score = step as f64 / 10.0;
            let report = aggregator.aggregate(Some(0.5), Some(metrics(score, 0.2)));
            assert!(report.overall_confidence >= previous);
            previous = report.overall_confidence;
        }
    }

    #[test]
    fn anti_monotonic_in_hallucination_rate() {
        let aggregator = ConfidenceAggregator::default();
        let mut previous = 2.0;
        for step in 0..=10 {
            let rate = step as f64 / 10.0;
            let report = aggregator.aggregate(Some(0.5), Some(metrics(0.7, rate)));
            assert!(report.overall_confidence <= previous);
            previous = report.overall_confidence;
        }
    }

    #[test]
    fn missing_grounding_renormalizes_to_retrieval_alone() {
        let report = ConfidenceAggregator::default().aggregate(Some(0.8), None);
        assert!((report.overall_confidence - 0.8).abs() < 1e-12);
        assert_eq!(report.level, ConfidenceLevel::High);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let report = ConfidenceAggregator::default().aggregate(Some(3.0), Some(metrics(2.0, -1.0)));
        assert!(report.overall_confidence <= 1.0);
    }
}

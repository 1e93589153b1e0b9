//! # Aggregate health classification.

use std::fmt;

use crate::primitives::Liveness;

/// Health of the pipeline over one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Both workers made progress.
    Healthy,
    /// Only the producer made progress.
    DegradedConsumerSilent,
    /// Only the consumer made progress.
    DegradedProducerSilent,
    /// Neither worker made progress.
    Critical,
}

impl HealthStatus {
    /// Classifies the liveness flags read in one cycle.
    pub fn classify(seen: Liveness) -> Self {
        match (
            seen.contains(Liveness::PRODUCER),
            seen.contains(Liveness::CONSUMER),
        ) {
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::DegradedConsumerSilent,
            (false, true) => HealthStatus::DegradedProducerSilent,
            (false, false) => HealthStatus::Critical,
        }
    }

    /// Short stable label (snake_case).
    pub fn as_label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::DegradedConsumerSilent => "degraded_consumer_silent",
            HealthStatus::DegradedProducerSilent => "degraded_producer_silent",
            HealthStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_way_classification() {
        assert_eq!(HealthStatus::classify(Liveness::ALL), HealthStatus::Healthy);
        assert_eq!(
            HealthStatus::classify(Liveness::PRODUCER),
            HealthStatus::DegradedConsumerSilent
        );
        assert_eq!(
            HealthStatus::classify(Liveness::CONSUMER),
            HealthStatus::DegradedProducerSilent
        );
        assert_eq!(HealthStatus::classify(Liveness::NONE), HealthStatus::Critical);
    }
}

use super::ConfidenceScore;
use chrono::{DateTime, Utc};

/// Result of a successful classifier call. Present on a record only after a
/// success-path reconciliation; mutually exclusive with the error message.
#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    pub confidence: ConfidenceScore,
    pub details: serde_json::Value,
    pub analyzed_at: DateTime<Utc>,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The root configuration structure for the analytics engine.
///
/// Every section has full defaults, so a partial (or empty) file is valid:
/// absent sections fall back to the documented default parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub drift: DriftParams,
    pub sentiment: SentimentParams,
    pub cohort: CohortParams,
}

/// Parameters for CUSUM / rolling Z-score drift detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriftParams {
    /// Number of trailing returns in the rolling Z-score window. Fewer
    /// trades than this yields an empty analysis with an informational
    /// alert instead of a result.
    pub z_score_window: usize,
    /// Absolute Z-score above which a point counts as drifting; twice this
    /// value classifies the point as volatile.
    pub z_score_threshold: f64,
    /// One-sided CUSUM level that flags a sustained shift from the mean.
    pub cusum_threshold: f64,
    /// Slack term subtracted on each CUSUM update so small fluctuations
    /// around the mean do not accumulate.
    pub cusum_drift: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            z_score_window: 20,
            z_score_threshold: 2.0,
            cusum_threshold: 5.0,
            cusum_drift: 0.5,
        }
    }
}

/// Parameters for lexicon-based note analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentParams {
    /// Minimum combined note length (chars) for a trade to enter the
    /// NLP aggregates.
    pub min_note_length: usize,
    /// Net-score band outside which a note classifies as positive/negative.
    pub sentiment_threshold: f64,
    /// Minimum occurrences before a token is reported as a keyword.
    pub keyword_min_frequency: usize,
}

impl Default for SentimentParams {
    fn default() -> Self {
        Self {
            min_note_length: 10,
            sentiment_threshold: 0.3,
            keyword_min_frequency: 2,
        }
    }
}

/// How to split a trade history into an early and a recent cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Median index: first half vs second half.
    Equal,
    /// `split_point` percent of trades (by count) form the early cohort.
    Percentage,
    /// Trades strictly before `split_date` form the early cohort.
    Date,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CohortParams {
    pub method: SplitMethod,
    /// Early-cohort share in percent, used by `SplitMethod::Percentage`.
    pub split_point: Option<u8>,
    /// Boundary date, used by `SplitMethod::Date`.
    pub split_date: Option<NaiveDate>,
}

impl Default for CohortParams {
    fn default() -> Self {
        Self {
            method: SplitMethod::Equal,
            split_point: None,
            split_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_defaults_match_documented_values() {
        let params = DriftParams::default();
        assert_eq!(params.z_score_window, 20);
        assert_eq!(params.z_score_threshold, 2.0);
        assert_eq!(params.cusum_threshold, 5.0);
        assert_eq!(params.cusum_drift, 0.5);
    }

    #[test]
    fn sentiment_defaults_match_documented_values() {
        let params = SentimentParams::default();
        assert_eq!(params.min_note_length, 10);
        assert_eq!(params.sentiment_threshold, 0.3);
        assert_eq!(params.keyword_min_frequency, 2);
    }
}

use chrono::{DateTime, Utc};
use configuration::DriftParams;
use serde::{Deserialize, Serialize};

use crate::detector::{DriftEvent, DriftPoint, Regime, RegimeChange, Severity};

/// Lookback (in trades) for the regime-instability rule.
const REGIME_CHANGE_LOOKBACK: usize = 10;

/// Regime changes within the lookback that trigger the instability alert.
const REGIME_CHANGE_LIMIT: usize = 3;

/// Lookback (in trades) for recent high-severity drift events.
const EVENT_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// A rule-derived notification about the current drift state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAlert {
    pub level: AlertLevel,
    pub message: String,
    /// Date of the trade the alert anchors to; absent for an empty history.
    pub date: Option<DateTime<Utc>>,
    pub trade_index: Option<usize>,
    pub recommendation: String,
}

/// The informational alert returned when the history is shorter than the
/// rolling window.
pub fn insufficient_data_alert(
    window: usize,
    date: Option<DateTime<Utc>>,
    trade_index: Option<usize>,
) -> DriftAlert {
    DriftAlert {
        level: AlertLevel::Info,
        message: format!("Need at least {window} trades for drift analysis"),
        date,
        trade_index,
        recommendation: "Continue trading to build statistical baseline".to_string(),
    }
}

/// Rule-based pass over the final point's state plus recent event and
/// regime-change density. If no rule fires, a single "stable" info alert
/// is emitted, so the list is never empty.
pub fn generate_alerts(
    last_point: &DriftPoint,
    drift_events: &[DriftEvent],
    regime_changes: &[RegimeChange],
    params: &DriftParams,
) -> Vec<DriftAlert> {
    let mut alerts = Vec::new();
    let at_last = |level: AlertLevel, message: String, recommendation: &str| DriftAlert {
        level,
        message,
        date: Some(last_point.date),
        trade_index: Some(last_point.trade_index),
        recommendation: recommendation.to_string(),
    };

    if last_point.z_score.abs() > params.z_score_threshold * 1.5 {
        alerts.push(at_last(
            AlertLevel::Critical,
            format!(
                "High volatility detected: Z-score is {:.2}",
                last_point.z_score
            ),
            "Consider reducing position sizes until volatility normalizes",
        ));
    }

    if last_point.cusum_positive > params.cusum_threshold {
        alerts.push(at_last(
            AlertLevel::Info,
            "Positive drift detected: performance above baseline".to_string(),
            "Current approach is working well. Document what is going right.",
        ));
    }

    if last_point.cusum_negative > params.cusum_threshold {
        alerts.push(at_last(
            AlertLevel::Warning,
            "Negative drift detected: performance below baseline".to_string(),
            "Review recent trades for pattern changes or market condition shifts",
        ));
    }

    if last_point.regime == Regime::Deteriorating {
        alerts.push(at_last(
            AlertLevel::Warning,
            "Trading regime has shifted to deteriorating".to_string(),
            "Consider taking a break to reassess the strategy",
        ));
    }

    if last_point.regime == Regime::Volatile {
        alerts.push(at_last(
            AlertLevel::Critical,
            "High volatility regime detected".to_string(),
            "Extreme volatility detected. Reduce risk exposure immediately.",
        ));
    }

    let recent_changes = regime_changes
        .iter()
        .filter(|rc| rc.change_index > last_point.trade_index.saturating_sub(REGIME_CHANGE_LOOKBACK))
        .count();
    if recent_changes >= REGIME_CHANGE_LIMIT {
        alerts.push(at_last(
            AlertLevel::Warning,
            format!("{recent_changes} regime changes in last {REGIME_CHANGE_LOOKBACK} trades"),
            "Unstable performance pattern. Review the decision-making process.",
        ));
    }

    let recent_high_severity = drift_events
        .iter()
        .filter(|e| e.end_index >= last_point.trade_index.saturating_sub(EVENT_LOOKBACK))
        .any(|e| e.severity == Severity::High);
    if recent_high_severity {
        alerts.push(at_last(
            AlertLevel::Critical,
            "Significant drift event detected in recent trades".to_string(),
            "Major performance deviation detected. Immediate strategy review recommended.",
        ));
    }

    if alerts.is_empty() {
        alerts.push(at_last(
            AlertLevel::Info,
            "Performance is stable with no significant drift".to_string(),
            "Maintain current approach and continue monitoring",
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    fn point(z_score: f64, cusum_positive: f64, cusum_negative: f64, regime: Regime) -> DriftPoint {
        DriftPoint {
            date: NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_time(NaiveTime::MIN)
                .and_utc(),
            trade_index: 25,
            pnl: Decimal::ZERO,
            cumulative_pnl: Decimal::ZERO,
            value: 0.0,
            z_score,
            cusum_positive,
            cusum_negative,
            is_drift: false,
            regime,
        }
    }

    #[test]
    fn quiet_state_emits_exactly_the_stable_alert() {
        let alerts = generate_alerts(
            &point(0.2, 0.0, 0.0, Regime::Normal),
            &[],
            &[],
            &DriftParams::default(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Info);
        assert!(alerts[0].message.contains("stable"));
    }

    #[test]
    fn extreme_z_score_is_critical() {
        let alerts = generate_alerts(
            &point(3.5, 0.0, 0.0, Regime::Normal),
            &[],
            &[],
            &DriftParams::default(),
        );
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert!(alerts[0].message.contains("3.50"));
    }

    #[test]
    fn deteriorating_regime_warns() {
        let alerts = generate_alerts(
            &point(0.0, 0.0, 6.0, Regime::Deteriorating),
            &[],
            &[],
            &DriftParams::default(),
        );
        // Negative drift plus regime warning.
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.level == AlertLevel::Warning));
    }

    #[test]
    fn dense_regime_changes_trigger_instability_warning() {
        let changes: Vec<RegimeChange> = (0..3)
            .map(|i| RegimeChange {
                change_index: 20 + i,
                change_date: NaiveDate::from_ymd_opt(2024, 7, 1)
                    .unwrap()
                    .and_time(NaiveTime::MIN)
                    .and_utc(),
                previous_regime: Regime::Normal,
                new_regime: Regime::Improving,
                confidence: 1.0,
                cusum_value: 6.0,
                z_score_value: 0.0,
            })
            .collect();

        let alerts = generate_alerts(
            &point(0.0, 0.0, 0.0, Regime::Normal),
            &[],
            &changes,
            &DriftParams::default(),
        );
        assert!(
            alerts
                .iter()
                .any(|a| a.level == AlertLevel::Warning && a.message.contains("3 regime changes"))
        );
    }
}

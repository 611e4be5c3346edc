use chrono::{DateTime, Utc};
use configuration::DriftParams;
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::alert::{DriftAlert, generate_alerts, insufficient_data_alert};

/// Qualitative label for one point of the return series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    #[default]
    Normal,
    Improving,
    Deteriorating,
    Volatile,
}

/// Dominant signal behind a drift event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftKind {
    Positive,
    Negative,
    Volatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Per-trade drift state: the return, its control-chart signals and the
/// regime classification derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftPoint {
    pub date: DateTime<Utc>,
    pub trade_index: usize,
    pub pnl: Decimal,
    pub cumulative_pnl: Decimal,
    /// The raw return value fed to the statistics.
    pub value: f64,
    /// Rolling Z-score; 0 during the warmup prefix and on zero stddev.
    pub z_score: f64,
    pub cusum_positive: f64,
    /// The negative CUSUM sum, reported as an absolute value.
    pub cusum_negative: f64,
    pub is_drift: bool,
    pub regime: Regime,
}

/// A contiguous run of drifting points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEvent {
    pub start_index: usize,
    pub end_index: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub kind: DriftKind,
    /// Strongest signal value at the start of the event.
    pub magnitude: f64,
    pub description: String,
    pub severity: Severity,
}

/// One transition in the regime sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeChange {
    pub change_index: usize,
    pub change_date: DateTime<Utc>,
    pub previous_regime: Regime,
    pub new_regime: Regime,
    /// min(strongest CUSUM / 5, 1).
    pub confidence: f64,
    pub cusum_value: f64,
    pub z_score_value: f64,
}

/// Summary statistics of one drift analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftStatistics {
    pub total_trades: usize,
    pub mean_return: f64,
    pub std_dev_return: f64,
    pub current_z_score: f64,
    pub max_positive_drift: f64,
    pub max_negative_drift: f64,
    pub drift_event_count: usize,
    pub regime_change_count: usize,
    /// Number of points flagged as drifting.
    pub time_in_drift: usize,
    pub drift_percentage: f64,
}

/// The complete drift picture for one trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAnalysis {
    pub points: Vec<DriftPoint>,
    pub drift_events: Vec<DriftEvent>,
    pub regime_changes: Vec<RegimeChange>,
    pub current_regime: Regime,
    pub statistics: DriftStatistics,
    /// Never empty: a quiet history still gets a "stable" info alert.
    pub alerts: Vec<DriftAlert>,
}

/// Rolling Z-score of each value against its trailing window (inclusive).
///
/// Indices before `window - 1` have too little history and emit 0, as do
/// windows with zero standard deviation.
pub fn rolling_z_scores(values: &[f64], window: usize) -> Vec<f64> {
    let mut z_scores = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if i + 1 < window {
            z_scores.push(0.0);
            continue;
        }

        let trailing = &values[i + 1 - window..=i];
        let mean = trailing.iter().sum::<f64>() / trailing.len() as f64;
        let variance =
            trailing.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / trailing.len() as f64;
        let std_dev = variance.sqrt();

        if std_dev > 0.0 {
            z_scores.push((values[i] - mean) / std_dev);
        } else {
            z_scores.push(0.0);
        }
    }

    z_scores
}

/// Page's one-sided CUSUM recursions against a fixed target mean.
///
/// Returns the positive sums and the absolute values of the negative sums.
/// The `drift` slack keeps small fluctuations from accumulating: a series
/// sitting exactly on the target stays at 0 on both sides.
pub fn cusum(values: &[f64], target_mean: f64, drift: f64) -> (Vec<f64>, Vec<f64>) {
    let mut positive = Vec::with_capacity(values.len());
    let mut negative = Vec::with_capacity(values.len());

    let mut cusum_pos = 0.0f64;
    let mut cusum_neg = 0.0f64;

    for value in values {
        let deviation = value - target_mean;
        cusum_pos = (cusum_pos + deviation - drift).max(0.0);
        cusum_neg = (cusum_neg + deviation + drift).min(0.0);
        positive.push(cusum_pos);
        negative.push(cusum_neg.abs());
    }

    (positive, negative)
}

/// Regime classification for one point. Volatility takes precedence over
/// either drift direction.
pub fn classify_regime(
    z_score: f64,
    cusum_pos: f64,
    cusum_neg: f64,
    params: &DriftParams,
) -> Regime {
    if z_score.abs() > params.z_score_threshold * 2.0 {
        Regime::Volatile
    } else if cusum_pos > params.cusum_threshold {
        Regime::Improving
    } else if cusum_neg > params.cusum_threshold {
        Regime::Deteriorating
    } else {
        Regime::Normal
    }
}

/// Runs the complete drift analysis over a set of closed trades.
pub fn analyze_drift(trades: &[ClosedTrade], params: &DriftParams) -> DriftAnalysis {
    tracing::debug!(
        trades = trades.len(),
        window = params.z_score_window,
        "analyzing drift"
    );

    if trades.len() < params.z_score_window {
        tracing::warn!(
            trades = trades.len(),
            window = params.z_score_window,
            "not enough trades for drift analysis"
        );
        let sorted = ClosedTrade::sorted_by_exit(trades);
        return DriftAnalysis {
            points: Vec::new(),
            drift_events: Vec::new(),
            regime_changes: Vec::new(),
            current_regime: Regime::Normal,
            statistics: DriftStatistics {
                total_trades: trades.len(),
                ..DriftStatistics::default()
            },
            alerts: vec![insufficient_data_alert(
                params.z_score_window,
                sorted.last().map(|t| t.exit_date),
                sorted.len().checked_sub(1),
            )],
        };
    }

    let sorted = ClosedTrade::sorted_by_exit(trades);
    let returns: Vec<f64> = sorted
        .iter()
        .map(|t| t.pnl.to_f64().unwrap_or(0.0))
        .collect();

    let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean_return).powi(2))
        .sum::<f64>()
        / returns.len() as f64;
    let std_dev_return = variance.sqrt();

    let z_scores = rolling_z_scores(&returns, params.z_score_window);
    let (cusum_pos, cusum_neg) = cusum(&returns, mean_return, params.cusum_drift);

    let mut cumulative_pnl = Decimal::ZERO;
    let mut points = Vec::with_capacity(sorted.len());
    for (i, trade) in sorted.iter().enumerate() {
        cumulative_pnl += trade.pnl;
        let z_score = z_scores[i];
        let pos = cusum_pos[i];
        let neg = cusum_neg[i];

        points.push(DriftPoint {
            date: trade.exit_date,
            trade_index: i,
            pnl: trade.pnl,
            cumulative_pnl,
            value: returns[i],
            z_score,
            cusum_positive: pos,
            cusum_negative: neg,
            is_drift: pos > params.cusum_threshold
                || neg > params.cusum_threshold
                || z_score.abs() > params.z_score_threshold,
            regime: classify_regime(z_score, pos, neg, params),
        });
    }

    let drift_events = detect_drift_events(&points, params);
    let regime_changes = detect_regime_changes(&points);

    let time_in_drift = points.iter().filter(|p| p.is_drift).count();
    let last_point = &points[points.len() - 1];

    let statistics = DriftStatistics {
        total_trades: sorted.len(),
        mean_return,
        std_dev_return,
        current_z_score: last_point.z_score,
        max_positive_drift: cusum_pos.iter().copied().fold(0.0, f64::max),
        max_negative_drift: cusum_neg.iter().copied().fold(0.0, f64::max),
        drift_event_count: drift_events.len(),
        regime_change_count: regime_changes.len(),
        time_in_drift,
        drift_percentage: time_in_drift as f64 / points.len() as f64 * 100.0,
    };

    let alerts = generate_alerts(last_point, &drift_events, &regime_changes, params);

    DriftAnalysis {
        current_regime: last_point.regime,
        points,
        drift_events,
        regime_changes,
        statistics,
        alerts,
    }
}

/// Groups contiguous drifting points into events.
fn detect_drift_events(points: &[DriftPoint], params: &DriftParams) -> Vec<DriftEvent> {
    let mut events = Vec::new();
    let mut open: Option<OpenEvent> = None;

    for point in points {
        if point.is_drift {
            if open.is_none() {
                open = Some(OpenEvent::starting_at(point, params));
            }
        } else if let Some(event) = open.take() {
            // The previous point was the last drifting one.
            let end = &points[point.trade_index - 1];
            events.push(event.close(end.trade_index, end.date, params));
        }
    }

    if let Some(event) = open {
        let end = &points[points.len() - 1];
        events.push(event.close(end.trade_index, end.date, params));
    }

    events
}

/// A drift event still running while scanning the points.
struct OpenEvent {
    start_index: usize,
    start_date: DateTime<Utc>,
    kind: DriftKind,
    magnitude: f64,
}

impl OpenEvent {
    /// Type and magnitude come from the dominant signal at the start of
    /// the event.
    fn starting_at(point: &DriftPoint, params: &DriftParams) -> Self {
        let kind = if point.cusum_positive > point.cusum_negative {
            DriftKind::Positive
        } else if point.z_score.abs() > params.z_score_threshold {
            DriftKind::Volatility
        } else {
            DriftKind::Negative
        };

        Self {
            start_index: point.trade_index,
            start_date: point.date,
            kind,
            magnitude: point
                .cusum_positive
                .max(point.cusum_negative)
                .max(point.z_score.abs()),
        }
    }

    fn close(self, end_index: usize, end_date: DateTime<Utc>, params: &DriftParams) -> DriftEvent {
        let severity = if self.magnitude > params.cusum_threshold * 2.0 {
            Severity::High
        } else if self.magnitude > params.cusum_threshold * 1.5 {
            Severity::Medium
        } else {
            Severity::Low
        };

        DriftEvent {
            start_index: self.start_index,
            end_index,
            start_date: self.start_date,
            end_date,
            description: event_description(self.kind, self.magnitude),
            kind: self.kind,
            magnitude: self.magnitude,
            severity,
        }
    }
}

/// Logs every index where the regime label flips.
fn detect_regime_changes(points: &[DriftPoint]) -> Vec<RegimeChange> {
    points
        .windows(2)
        .filter(|pair| pair[0].regime != pair[1].regime)
        .map(|pair| {
            let current = &pair[1];
            let cusum_value = current.cusum_positive.max(current.cusum_negative);
            RegimeChange {
                change_index: current.trade_index,
                change_date: current.date,
                previous_regime: pair[0].regime,
                new_regime: current.regime,
                confidence: (cusum_value / 5.0).min(1.0),
                cusum_value,
                z_score_value: current.z_score,
            }
        })
        .collect()
}

fn event_description(kind: DriftKind, magnitude: f64) -> String {
    match kind {
        DriftKind::Positive => format!(
            "Sustained above-average performance period (magnitude: {magnitude:.2})"
        ),
        DriftKind::Negative => format!(
            "Sustained below-average performance period (magnitude: {magnitude:.2})"
        ),
        DriftKind::Volatility => format!(
            "High volatility period with significant fluctuations (magnitude: {magnitude:.2})"
        ),
    }
}

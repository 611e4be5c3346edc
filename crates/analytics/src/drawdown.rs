use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::equity::{EquityPoint, equity_curve};

/// One peak-to-recovery episode on the equity curve.
///
/// A period opens on the first point whose drawdown becomes positive and
/// closes on the first point where the curve touches its peak again. If the
/// curve never recovers, the period is emitted with `is_recovered = false`
/// and no recovery date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    /// First point below the peak.
    pub start_date: DateTime<Utc>,
    /// Last point still below the peak (the point preceding recovery, or
    /// the final point of the curve when unrecovered).
    pub end_date: DateTime<Utc>,
    /// Peak equity the curve fell from.
    pub peak_value: Decimal,
    /// Lowest cumulative P&L reached during the period.
    pub trough_value: Decimal,
    /// Peak-to-trough decline.
    pub drawdown_amount: Decimal,
    pub drawdown_percentage: Decimal,
    /// Days from start to end, rounded up.
    pub duration_days: i64,
    pub recovery_date: Option<DateTime<Utc>>,
    /// Days from end to recovery, rounded up. Present only when recovered.
    pub recovery_days: Option<i64>,
    pub is_recovered: bool,
}

/// Aggregate drawdown statistics over a whole equity curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownMetrics {
    pub max_drawdown: Decimal,
    pub max_drawdown_percentage: Decimal,
    pub avg_drawdown: Decimal,
    pub avg_drawdown_percentage: Decimal,
    pub avg_drawdown_duration: f64,
    /// Mean recovery time, over recovered periods only.
    pub avg_recovery_time: f64,
    pub total_drawdown_periods: usize,
    /// Drawdown state at the last point of the curve.
    pub current_drawdown: Decimal,
    pub current_drawdown_percentage: Decimal,
    pub current_drawdown_duration: i64,
    pub longest_drawdown_duration: i64,
    pub longest_recovery_time: i64,
    /// Periods per year spanned by the curve; 0 with fewer than 2 points.
    pub drawdown_frequency: f64,
}

/// The full drawdown picture for one trade set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    pub equity_curve: Vec<EquityPoint>,
    pub periods: Vec<DrawdownPeriod>,
    pub metrics: DrawdownMetrics,
}

/// A drawdown period scoped to a single symbol's own equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDrawdownPeriod {
    pub symbol: String,
    #[serde(flatten)]
    pub period: DrawdownPeriod,
}

/// Per-symbol drawdown severity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDrawdownSummary {
    pub symbol: String,
    pub max_drawdown: Decimal,
    pub max_drawdown_percentage: Decimal,
    pub avg_drawdown: Decimal,
    pub total_drawdown_periods: usize,
}

/// Runs the complete global drawdown analysis for a set of closed trades.
pub fn analyze_drawdowns(trades: &[ClosedTrade]) -> DrawdownAnalysis {
    tracing::debug!(trades = trades.len(), "analyzing drawdowns");

    let curve = equity_curve(trades);
    let periods = drawdown_periods(&curve);
    let metrics = drawdown_metrics(&curve, &periods);

    DrawdownAnalysis {
        equity_curve: curve,
        periods,
        metrics,
    }
}

/// Segments an equity curve into drawdown periods.
pub fn drawdown_periods(curve: &[EquityPoint]) -> Vec<DrawdownPeriod> {
    let mut periods = Vec::new();
    let mut open: Option<OpenPeriod> = None;

    for point in curve {
        if point.is_in_drawdown {
            match &mut open {
                Some(current) => current.deepen(point),
                None => open = Some(OpenPeriod::starting_at(point)),
            }
        } else if let Some(current) = open.take() {
            // Back at the peak: the open period has recovered.
            periods.push(current.recovered_at(point.date));
        }
    }

    // The curve can end below its peak; emit the unrecovered tail period.
    if let Some(current) = open {
        periods.push(current.unrecovered());
    }

    periods
}

/// Aggregates drawdown periods into `DrawdownMetrics`.
///
/// An empty curve or a curve with no drawdowns yields the all-zero metrics
/// object rather than an error.
pub fn drawdown_metrics(curve: &[EquityPoint], periods: &[DrawdownPeriod]) -> DrawdownMetrics {
    if periods.is_empty() || curve.is_empty() {
        return DrawdownMetrics::default();
    }

    // Reduce-max keeps the first period on ties.
    let max_period = periods
        .iter()
        .skip(1)
        .fold(&periods[0], |best, period| {
            if period.drawdown_amount > best.drawdown_amount {
                period
            } else {
                best
            }
        });

    let count = Decimal::from(periods.len());
    let avg_drawdown = periods
        .iter()
        .map(|p| p.drawdown_amount)
        .sum::<Decimal>()
        / count;
    let avg_drawdown_percentage = periods
        .iter()
        .map(|p| p.drawdown_percentage)
        .sum::<Decimal>()
        / count;
    let avg_drawdown_duration =
        periods.iter().map(|p| p.duration_days).sum::<i64>() as f64 / periods.len() as f64;

    let recovered: Vec<&DrawdownPeriod> = periods.iter().filter(|p| p.is_recovered).collect();
    let avg_recovery_time = if recovered.is_empty() {
        0.0
    } else {
        recovered
            .iter()
            .map(|p| p.recovery_days.unwrap_or(0))
            .sum::<i64>() as f64
            / recovered.len() as f64
    };
    let longest_recovery_time = recovered
        .iter()
        .map(|p| p.recovery_days.unwrap_or(0))
        .max()
        .unwrap_or(0);

    let last_point = &curve[curve.len() - 1];
    let current_period = periods.iter().find(|p| !p.is_recovered);

    DrawdownMetrics {
        max_drawdown: max_period.drawdown_amount,
        max_drawdown_percentage: max_period.drawdown_percentage,
        avg_drawdown,
        avg_drawdown_percentage,
        avg_drawdown_duration,
        avg_recovery_time,
        total_drawdown_periods: periods.len(),
        current_drawdown: last_point.drawdown,
        current_drawdown_percentage: last_point.drawdown_percentage,
        current_drawdown_duration: current_period.map(|p| p.duration_days).unwrap_or(0),
        longest_drawdown_duration: periods.iter().map(|p| p.duration_days).max().unwrap_or(0),
        longest_recovery_time,
        drawdown_frequency: drawdown_frequency(curve, periods.len()),
    }
}

/// Computes every symbol's drawdown periods against its own equity curve.
///
/// Each symbol group is analyzed entirely independently; there is no shared
/// peak across symbols. Results are sorted most-recent-first.
pub fn symbol_drawdown_periods(trades: &[ClosedTrade]) -> Vec<SymbolDrawdownPeriod> {
    let mut by_symbol: BTreeMap<&str, Vec<ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        by_symbol
            .entry(trade.symbol.as_str())
            .or_default()
            .push(trade.clone());
    }

    let mut all = Vec::new();
    for (symbol, group) in by_symbol {
        let curve = equity_curve(&group);
        for period in drawdown_periods(&curve) {
            all.push(SymbolDrawdownPeriod {
                symbol: symbol.to_string(),
                period,
            });
        }
    }

    all.sort_by(|a, b| b.period.start_date.cmp(&a.period.start_date));
    all
}

/// Summarizes per-symbol drawdown severity, worst symbol first.
pub fn symbol_drawdown_summaries(periods: &[SymbolDrawdownPeriod]) -> Vec<SymbolDrawdownSummary> {
    let mut by_symbol: BTreeMap<&str, Vec<&DrawdownPeriod>> = BTreeMap::new();
    for entry in periods {
        by_symbol
            .entry(entry.symbol.as_str())
            .or_default()
            .push(&entry.period);
    }

    let mut summaries: Vec<SymbolDrawdownSummary> = by_symbol
        .into_iter()
        .map(|(symbol, group)| {
            let max_period = group.iter().skip(1).fold(group[0], |best, period| {
                if period.drawdown_amount > best.drawdown_amount {
                    period
                } else {
                    best
                }
            });
            let avg_drawdown = group
                .iter()
                .map(|p| p.drawdown_amount)
                .sum::<Decimal>()
                / Decimal::from(group.len());

            SymbolDrawdownSummary {
                symbol: symbol.to_string(),
                max_drawdown: max_period.drawdown_amount,
                max_drawdown_percentage: max_period.drawdown_percentage,
                avg_drawdown,
                total_drawdown_periods: group.len(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.max_drawdown
            .cmp(&a.max_drawdown)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    summaries
}

/// An in-progress drawdown period while scanning the curve.
struct OpenPeriod {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    peak_value: Decimal,
    trough_value: Decimal,
    drawdown_amount: Decimal,
    drawdown_percentage: Decimal,
}

impl OpenPeriod {
    fn starting_at(point: &EquityPoint) -> Self {
        Self {
            start_date: point.date,
            end_date: point.date,
            peak_value: point.running_peak,
            trough_value: point.cumulative_pnl,
            drawdown_amount: point.drawdown,
            drawdown_percentage: point.drawdown_percentage,
        }
    }

    fn deepen(&mut self, point: &EquityPoint) {
        if point.cumulative_pnl < self.trough_value {
            self.trough_value = point.cumulative_pnl;
            self.drawdown_amount = point.drawdown;
            self.drawdown_percentage = point.drawdown_percentage;
        }
        self.end_date = point.date;
    }

    fn recovered_at(self, recovery_date: DateTime<Utc>) -> DrawdownPeriod {
        DrawdownPeriod {
            duration_days: days_between_ceil(self.start_date, self.end_date),
            recovery_days: Some(days_between_ceil(self.end_date, recovery_date)),
            recovery_date: Some(recovery_date),
            is_recovered: true,
            start_date: self.start_date,
            end_date: self.end_date,
            peak_value: self.peak_value,
            trough_value: self.trough_value,
            drawdown_amount: self.drawdown_amount,
            drawdown_percentage: self.drawdown_percentage,
        }
    }

    fn unrecovered(self) -> DrawdownPeriod {
        DrawdownPeriod {
            duration_days: days_between_ceil(self.start_date, self.end_date),
            recovery_date: None,
            recovery_days: None,
            is_recovered: false,
            start_date: self.start_date,
            end_date: self.end_date,
            peak_value: self.peak_value,
            trough_value: self.trough_value,
            drawdown_amount: self.drawdown_amount,
            drawdown_percentage: self.drawdown_percentage,
        }
    }
}

const MILLIS_PER_DAY: i64 = 86_400_000;
const MILLIS_PER_YEAR: f64 = 365.25 * MILLIS_PER_DAY as f64;

/// Whole days from `start` to `end`, rounded up.
fn days_between_ceil(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ((end - start).num_milliseconds().max(0) as u64).div_ceil(MILLIS_PER_DAY as u64) as i64
}

fn drawdown_frequency(curve: &[EquityPoint], period_count: usize) -> f64 {
    if curve.len() < 2 {
        return 0.0;
    }
    let span = curve[curve.len() - 1].date - curve[0].date;
    let years = span.num_milliseconds() as f64 / MILLIS_PER_YEAR;
    if years > 0.0 {
        period_count as f64 / years
    } else {
        0.0
    }
}

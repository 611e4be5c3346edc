use chrono::{DateTime, Utc};
use configuration::{CohortParams, SplitMethod};
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Sentinel for ratios whose denominator is zero while the numerator is
/// positive (profit factor, risk-reward). Kept finite so the values stay
/// sortable and serializable.
pub const RATIO_SENTINEL: Decimal = dec!(999);

/// Trading days per year, for annualizing the per-trade Sharpe-like ratio.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Days per month used by the trading-frequency metric.
const DAYS_PER_MONTH: f64 = 30.0;

/// Performance profile of one cohort of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    /// Winning share in percent. Breakeven trades count against it.
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub average_pnl: Decimal,
    pub average_win: Decimal,
    /// Mean losing amount, as a positive magnitude.
    pub average_loss: Decimal,
    /// Gross wins over gross losses; `RATIO_SENTINEL` when no losses exist
    /// but wins do, 0 when there are no wins either.
    pub profit_factor: Decimal,
    pub largest_win: Decimal,
    /// Most negative single P&L (kept signed).
    pub largest_loss: Decimal,
    /// win_rate x average_win - loss_rate x average_loss.
    pub expectancy: Decimal,
    /// Mean over stddev of per-trade P&L, annualized by sqrt(252).
    /// 0 when the stddev is 0.
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline of the cohort's own running P&L.
    pub max_drawdown: Decimal,
    pub average_hold_time_days: f64,
    /// Trades per 30-day month across the cohort's exit-date span.
    pub trading_frequency: f64,
    /// Average win over average loss, with the same sentinel rules as the
    /// profit factor.
    pub risk_reward_ratio: Decimal,
}

/// A named, date-bounded cohort with its computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortPeriod {
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub trades: Vec<ClosedTrade>,
    pub metrics: CohortMetrics,
    pub trade_count: usize,
}

/// How a metric's delta should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricDirection {
    /// An increase is an improvement.
    HigherIsBetter,
    /// A decrease is an improvement (max drawdown).
    LowerIsBetter,
    /// No inherent direction; never counted toward the trend score
    /// (trading frequency).
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// One early-vs-recent comparison row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetric {
    pub name: String,
    pub early_value: f64,
    pub recent_value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub direction: MetricDirection,
    pub is_improvement: bool,
    pub significance: Significance,
}

/// A deterministic, rule-derived observation about the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortInsight {
    pub message: String,
    pub impact: Significance,
}

/// The full early-vs-recent comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortComparison {
    pub early_cohort: CohortPeriod,
    pub recent_cohort: CohortPeriod,
    pub improvements: Vec<ComparisonMetric>,
    pub deteriorations: Vec<ComparisonMetric>,
    pub stable_metrics: Vec<ComparisonMetric>,
    pub overall_trend: Trend,
    /// Sum of +-15/8/3 contributions by significance tier.
    pub trend_score: i32,
    pub key_insights: Vec<CohortInsight>,
}

/// Splits a trade history into early and recent cohorts.
///
/// All methods operate on the exit-date-sorted history, so
/// `early.len() + recent.len() == trades.len()` always holds.
pub fn split_cohorts(
    trades: &[ClosedTrade],
    params: &CohortParams,
) -> (Vec<ClosedTrade>, Vec<ClosedTrade>) {
    let sorted = ClosedTrade::sorted_by_exit(trades);

    let split_index = match params.method {
        SplitMethod::Equal => sorted.len() / 2,
        SplitMethod::Percentage => {
            let pct = params.split_point.unwrap_or(50) as usize;
            sorted.len() * pct / 100
        }
        SplitMethod::Date => match params.split_date {
            Some(boundary) => sorted
                .iter()
                .position(|t| t.exit_date.date_naive() >= boundary)
                .unwrap_or(sorted.len()),
            None => sorted.len() / 2,
        },
    };

    let (early, recent) = sorted.split_at(split_index);
    (early.to_vec(), recent.to_vec())
}

/// Computes the performance profile of one cohort.
///
/// An empty cohort yields the all-zero metrics object.
pub fn cohort_metrics(trades: &[ClosedTrade]) -> CohortMetrics {
    if trades.is_empty() {
        return CohortMetrics::default();
    }

    let sorted = ClosedTrade::sorted_by_exit(trades);
    let count = Decimal::from(sorted.len());

    let winners: Vec<&ClosedTrade> = sorted.iter().filter(|t| t.pnl > Decimal::ZERO).collect();
    let losers: Vec<&ClosedTrade> = sorted.iter().filter(|t| t.pnl < Decimal::ZERO).collect();
    let break_even = sorted.len() - winners.len() - losers.len();

    let total_pnl: Decimal = sorted.iter().map(|t| t.pnl).sum();
    let total_wins: Decimal = winners.iter().map(|t| t.pnl).sum();
    let total_losses: Decimal = losers.iter().map(|t| t.pnl).sum::<Decimal>().abs();

    let average_win = if winners.is_empty() {
        Decimal::ZERO
    } else {
        total_wins / Decimal::from(winners.len())
    };
    let average_loss = if losers.is_empty() {
        Decimal::ZERO
    } else {
        total_losses / Decimal::from(losers.len())
    };

    let win_rate = Decimal::from(winners.len()) / count * Decimal::ONE_HUNDRED;
    let loss_rate = Decimal::ONE_HUNDRED - win_rate;
    let expectancy =
        win_rate / Decimal::ONE_HUNDRED * average_win - loss_rate / Decimal::ONE_HUNDRED * average_loss;

    let largest_win = winners.iter().map(|t| t.pnl).max().unwrap_or(Decimal::ZERO);
    let largest_loss = losers.iter().map(|t| t.pnl).min().unwrap_or(Decimal::ZERO);

    CohortMetrics {
        total_trades: sorted.len(),
        winning_trades: winners.len(),
        losing_trades: losers.len(),
        break_even_trades: break_even,
        win_rate,
        total_pnl,
        average_pnl: total_pnl / count,
        average_win,
        average_loss,
        profit_factor: sentinel_ratio(total_wins, total_losses),
        largest_win,
        largest_loss,
        expectancy,
        sharpe_ratio: sharpe_ratio(&sorted),
        max_drawdown: max_drawdown(&sorted),
        average_hold_time_days: sorted.iter().map(|t| t.hold_days()).sum::<f64>()
            / sorted.len() as f64,
        trading_frequency: trading_frequency(&sorted),
        risk_reward_ratio: sentinel_ratio(average_win, average_loss),
    }
}

/// Compares an early and a recent cohort and derives the trend verdict.
pub fn compare_cohorts(early: &[ClosedTrade], recent: &[ClosedTrade]) -> CohortComparison {
    tracing::debug!(early = early.len(), recent = recent.len(), "comparing cohorts");

    let early_cohort = cohort_period("Early Trades", early);
    let recent_cohort = cohort_period("Recent Trades", recent);
    let metrics = comparison_metrics(&early_cohort.metrics, &recent_cohort.metrics);

    let mut improvements = Vec::new();
    let mut deteriorations = Vec::new();
    let mut stable_metrics = Vec::new();
    for metric in metrics {
        if metric.direction == MetricDirection::Neutral || metric.change.abs() <= 0.01 {
            stable_metrics.push(metric);
        } else if metric.is_improvement {
            improvements.push(metric);
        } else {
            deteriorations.push(metric);
        }
    }

    let mut trend_score = 0i32;
    for metric in &improvements {
        trend_score += score_weight(metric.significance);
    }
    for metric in &deteriorations {
        trend_score -= score_weight(metric.significance);
    }

    let overall_trend = if trend_score > 10 {
        Trend::Improving
    } else if trend_score < -10 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let key_insights = generate_insights(
        &improvements,
        &deteriorations,
        overall_trend,
        &early_cohort.metrics,
        &recent_cohort.metrics,
    );

    CohortComparison {
        early_cohort,
        recent_cohort,
        improvements,
        deteriorations,
        stable_metrics,
        overall_trend,
        trend_score,
        key_insights,
    }
}

fn cohort_period(name: &str, trades: &[ClosedTrade]) -> CohortPeriod {
    let sorted = ClosedTrade::sorted_by_exit(trades);
    CohortPeriod {
        name: name.to_string(),
        start_date: sorted.first().map(|t| t.exit_date),
        end_date: sorted.last().map(|t| t.exit_date),
        metrics: cohort_metrics(&sorted),
        trade_count: sorted.len(),
        trades: sorted,
    }
}

/// The fixed comparison rows, with per-metric direction and significance
/// thresholds (absolute deltas: high / medium, else low).
fn comparison_metrics(early: &CohortMetrics, recent: &CohortMetrics) -> Vec<ComparisonMetric> {
    let rows: [(&str, f64, f64, MetricDirection, f64, f64); 8] = [
        (
            "Win Rate",
            to_f64(early.win_rate),
            to_f64(recent.win_rate),
            MetricDirection::HigherIsBetter,
            10.0,
            5.0,
        ),
        (
            "Average P&L",
            to_f64(early.average_pnl),
            to_f64(recent.average_pnl),
            MetricDirection::HigherIsBetter,
            1000.0,
            500.0,
        ),
        (
            "Profit Factor",
            to_f64(early.profit_factor),
            to_f64(recent.profit_factor),
            MetricDirection::HigherIsBetter,
            0.5,
            0.2,
        ),
        (
            "Expectancy",
            to_f64(early.expectancy),
            to_f64(recent.expectancy),
            MetricDirection::HigherIsBetter,
            500.0,
            200.0,
        ),
        (
            "Risk-Reward Ratio",
            to_f64(early.risk_reward_ratio),
            to_f64(recent.risk_reward_ratio),
            MetricDirection::HigherIsBetter,
            0.5,
            0.2,
        ),
        (
            "Sharpe Ratio",
            early.sharpe_ratio,
            recent.sharpe_ratio,
            MetricDirection::HigherIsBetter,
            0.5,
            0.2,
        ),
        (
            "Max Drawdown",
            to_f64(early.max_drawdown),
            to_f64(recent.max_drawdown),
            MetricDirection::LowerIsBetter,
            5000.0,
            2000.0,
        ),
        (
            "Trading Frequency",
            early.trading_frequency,
            recent.trading_frequency,
            MetricDirection::Neutral,
            10.0,
            5.0,
        ),
    ];

    rows.into_iter()
        .map(|(name, early_value, recent_value, direction, high, medium)| {
            let change = recent_value - early_value;
            let is_improvement = match direction {
                MetricDirection::HigherIsBetter => recent_value > early_value,
                MetricDirection::LowerIsBetter => recent_value < early_value,
                MetricDirection::Neutral => false,
            };
            ComparisonMetric {
                name: name.to_string(),
                early_value,
                recent_value,
                change,
                change_percent: percent_change(early_value, recent_value),
                direction,
                is_improvement,
                significance: if change.abs() > high {
                    Significance::High
                } else if change.abs() > medium {
                    Significance::Medium
                } else {
                    Significance::Low
                },
            }
        })
        .collect()
}

fn generate_insights(
    improvements: &[ComparisonMetric],
    deteriorations: &[ComparisonMetric],
    trend: Trend,
    early: &CohortMetrics,
    recent: &CohortMetrics,
) -> Vec<CohortInsight> {
    let mut insights = Vec::new();
    let high_improvement = |name: &str| {
        improvements
            .iter()
            .any(|m| m.name == name && m.significance == Significance::High)
    };
    let high_deterioration = |name: &str| {
        deteriorations
            .iter()
            .any(|m| m.name == name && m.significance == Significance::High)
    };

    match trend {
        Trend::Improving => {
            insights.push(CohortInsight {
                message: "Trading performance is improving over time. Keep up the good work."
                    .to_string(),
                impact: Significance::High,
            });
            if high_improvement("Win Rate") {
                insights.push(CohortInsight {
                    message: "Win rate has significantly improved, indicating better trade selection."
                        .to_string(),
                    impact: Significance::Medium,
                });
            }
            if high_improvement("Risk-Reward Ratio") {
                insights.push(CohortInsight {
                    message: "Risk-reward ratio has improved, showing better trade management."
                        .to_string(),
                    impact: Significance::Medium,
                });
            }
        }
        Trend::Declining => {
            insights.push(CohortInsight {
                message: "Recent performance shows decline. Review strategy and risk management."
                    .to_string(),
                impact: Significance::High,
            });
            if high_deterioration("Win Rate") {
                insights.push(CohortInsight {
                    message: "Win rate has dropped significantly. Focus on trade quality over quantity."
                        .to_string(),
                    impact: Significance::Medium,
                });
            }
            if deteriorations.iter().any(|m| m.name == "Max Drawdown")
                && recent.max_drawdown > early.max_drawdown
            {
                insights.push(CohortInsight {
                    message: "Drawdowns are increasing. Consider reducing position sizes."
                        .to_string(),
                    impact: Significance::Medium,
                });
            }
        }
        Trend::Stable => {
            insights.push(CohortInsight {
                message: "Performance is stable. Look for opportunities to optimize further."
                    .to_string(),
                impact: Significance::Low,
            });
        }
    }

    if recent.profit_factor > dec!(1.5) {
        insights.push(CohortInsight {
            message: "Recent profit factor is strong. The edge is working.".to_string(),
            impact: Significance::Medium,
        });
    } else if recent.profit_factor < Decimal::ONE {
        insights.push(CohortInsight {
            message: "Recent profit factor is below 1.0. Review losing trades and adjust strategy."
                .to_string(),
            impact: Significance::High,
        });
    }

    if recent.expectancy > Decimal::ZERO && recent.expectancy > early.expectancy {
        insights.push(CohortInsight {
            message: "Positive expectancy is growing. Each trade has better expected value."
                .to_string(),
            impact: Significance::Low,
        });
    }

    if recent.trading_frequency > early.trading_frequency * 2.0 {
        insights.push(CohortInsight {
            message: "Trading frequency has more than doubled. Ensure quality is not sacrificed for quantity."
                .to_string(),
            impact: Significance::Medium,
        });
    }

    insights
}

/// numerator / denominator with the documented degenerate-case sentinels.
fn sentinel_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator
    } else if numerator > Decimal::ZERO {
        RATIO_SENTINEL
    } else {
        Decimal::ZERO
    }
}

/// Per-trade Sharpe-like ratio over raw P&L values, annualized by sqrt(252).
fn sharpe_ratio(sorted: &[ClosedTrade]) -> f64 {
    let returns: Vec<f64> = sorted.iter().map(|t| to_f64(t.pnl)).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Running-peak scan over the cohort's own cumulative P&L.
fn max_drawdown(sorted: &[ClosedTrade]) -> Decimal {
    let mut running = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;

    for trade in sorted {
        running += trade.pnl;
        if running > peak {
            peak = running;
        }
        let drawdown = peak - running;
        if drawdown > worst {
            worst = drawdown;
        }
    }

    worst
}

/// Trades per 30-day month over the cohort's exit-date span. A cohort
/// spanning less than a day reports its raw trade count.
fn trading_frequency(sorted: &[ClosedTrade]) -> f64 {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return 0.0;
    };
    let days = (last.exit_date - first.exit_date).num_milliseconds() as f64 / 86_400_000.0;
    let months = days / DAYS_PER_MONTH;
    if months > 0.0 {
        sorted.len() as f64 / months
    } else {
        sorted.len() as f64
    }
}

fn percent_change(early: f64, recent: f64) -> f64 {
    if early != 0.0 {
        (recent - early) / early.abs() * 100.0
    } else {
        0.0
    }
}

fn score_weight(significance: Significance) -> i32 {
    match significance {
        Significance::High => 15,
        Significance::Medium => 8,
        Significance::Low => 3,
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{trade, trade_full};

    fn split(method: SplitMethod) -> CohortParams {
        CohortParams {
            method,
            split_point: None,
            split_date: None,
        }
    }

    fn sample(pnls: &[i64]) -> Vec<ClosedTrade> {
        pnls.iter()
            .enumerate()
            .map(|(i, pnl)| {
                trade(
                    &format!("t{i}"),
                    "A",
                    &format!("2024-05-{:02}", i + 1),
                    Decimal::from(*pnl),
                )
            })
            .collect()
    }

    #[test]
    fn equal_split_partitions_completely() {
        let trades = sample(&[1, 2, 3, 4, 5]);
        let (early, recent) = split_cohorts(&trades, &split(SplitMethod::Equal));
        assert_eq!(early.len(), 2);
        assert_eq!(recent.len(), 3);
        assert_eq!(early.len() + recent.len(), trades.len());
    }

    #[test]
    fn percentage_split_floors_the_index() {
        let trades = sample(&[1, 2, 3, 4, 5]);
        let params = CohortParams {
            method: SplitMethod::Percentage,
            split_point: Some(70),
            split_date: None,
        };
        let (early, recent) = split_cohorts(&trades, &params);
        assert_eq!(early.len(), 3); // floor(5 * 0.7)
        assert_eq!(early.len() + recent.len(), trades.len());
    }

    #[test]
    fn date_split_uses_first_index_at_or_after_boundary() {
        let trades = sample(&[1, 2, 3, 4]);
        let params = CohortParams {
            method: SplitMethod::Date,
            split_point: None,
            split_date: Some("2024-05-03".parse().unwrap()),
        };
        let (early, recent) = split_cohorts(&trades, &params);
        assert_eq!(early.len(), 2);
        assert_eq!(recent[0].id, "t2");

        // A boundary after every trade puts everything in the early cohort.
        let params = CohortParams {
            method: SplitMethod::Date,
            split_point: None,
            split_date: Some("2025-01-01".parse().unwrap()),
        };
        let (early, recent) = split_cohorts(&trades, &params);
        assert_eq!(early.len(), 4);
        assert!(recent.is_empty());
    }

    #[test]
    fn profit_factor_sentinels() {
        // Wins only: 999 sentinel.
        let metrics = cohort_metrics(&sample(&[200, 300]));
        assert_eq!(metrics.profit_factor, RATIO_SENTINEL);

        // No wins, no losses: 0.
        let metrics = cohort_metrics(&sample(&[0, 0]));
        assert_eq!(metrics.profit_factor, Decimal::ZERO);

        // Mixed: plain ratio.
        let metrics = cohort_metrics(&sample(&[300, -100]));
        assert_eq!(metrics.profit_factor, Decimal::from(3));
    }

    #[test]
    fn metrics_cover_the_standard_profile() {
        let trades = vec![
            trade_full("t1", "A", "2024-05-01", "2024-05-02", Decimal::from(100), None),
            trade_full("t2", "A", "2024-05-03", "2024-05-05", Decimal::from(-50), None),
            trade_full("t3", "A", "2024-05-06", "2024-05-10", Decimal::from(150), None),
            trade_full("t4", "A", "2024-05-11", "2024-05-13", Decimal::from(0), None),
        ];
        let metrics = cohort_metrics(&trades);

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.winning_trades, 2);
        assert_eq!(metrics.losing_trades, 1);
        assert_eq!(metrics.break_even_trades, 1);
        assert_eq!(metrics.win_rate, Decimal::from(50));
        assert_eq!(metrics.total_pnl, Decimal::from(200));
        assert_eq!(metrics.average_win, Decimal::from(125));
        assert_eq!(metrics.average_loss, Decimal::from(50));
        assert_eq!(metrics.largest_win, Decimal::from(150));
        assert_eq!(metrics.largest_loss, Decimal::from(-50));
        // 0.5 * 125 - 0.5 * 50
        assert_eq!(metrics.expectancy, dec!(37.5));
        assert_eq!(metrics.max_drawdown, Decimal::from(50));
        // Hold times: 1, 2, 4, 2 days.
        assert_eq!(metrics.average_hold_time_days, 2.25);
        assert!(metrics.sharpe_ratio > 0.0);
    }

    #[test]
    fn empty_cohort_is_all_zero() {
        assert_eq!(cohort_metrics(&[]), CohortMetrics::default());
    }

    #[test]
    fn improving_history_scores_positive() {
        // Early: mostly losers. Recent: mostly winners.
        let trades = sample(&[-100, -120, 50, -80, 900, 850, 920, -40]);
        let (early, recent) = split_cohorts(&trades, &split(SplitMethod::Equal));
        let comparison = compare_cohorts(&early, &recent);

        assert!(comparison.trend_score > 10);
        assert_eq!(comparison.overall_trend, Trend::Improving);
        assert!(
            comparison
                .key_insights
                .iter()
                .any(|i| i.impact == Significance::High)
        );
    }

    #[test]
    fn trading_frequency_never_counts_toward_trend() {
        let metric = comparison_metrics(
            &CohortMetrics {
                trading_frequency: 2.0,
                ..CohortMetrics::default()
            },
            &CohortMetrics {
                trading_frequency: 40.0,
                ..CohortMetrics::default()
            },
        )
        .into_iter()
        .find(|m| m.name == "Trading Frequency")
        .unwrap();

        assert_eq!(metric.direction, MetricDirection::Neutral);
        assert!(!metric.is_improvement);
        assert_eq!(metric.significance, Significance::High);

        // Despite the huge frequency delta, the trend stays stable.
        let early = sample(&[10, -10, 10, -10]);
        let recent = sample(&[10, -10, 10, -10]);
        let comparison = compare_cohorts(&early, &recent);
        assert_eq!(comparison.overall_trend, Trend::Stable);
        assert!(
            comparison
                .stable_metrics
                .iter()
                .any(|m| m.name == "Trading Frequency")
        );
    }

    #[test]
    fn comparison_lists_partition_the_eight_metrics() {
        let trades = sample(&[-10, 30, -20, 40, 60, -10, 90, 20]);
        let (early, recent) = split_cohorts(&trades, &split(SplitMethod::Equal));
        let comparison = compare_cohorts(&early, &recent);

        let total = comparison.improvements.len()
            + comparison.deteriorations.len()
            + comparison.stable_metrics.len();
        assert_eq!(total, 8);
    }
}

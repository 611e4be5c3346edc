use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a run of consecutive same-outcome trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Winning,
    Losing,
}

/// A maximal run of consecutive wins or losses, in exit-date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakPeriod {
    pub kind: StreakKind,
    pub length: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_pnl: Decimal,
}

/// Streak statistics over a whole trade set.
///
/// Breakeven trades carry no directional information and are excluded
/// before the scan; the three-state view lives in the sequence module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakMetrics {
    /// Length of the streak still running at the end of the history.
    pub current_streak: usize,
    pub current_streak_kind: Option<StreakKind>,
    pub longest_win_streak: usize,
    pub longest_lose_streak: usize,
    pub average_win_streak: f64,
    pub average_lose_streak: f64,
    pub total_win_streaks: usize,
    pub total_lose_streaks: usize,
    /// Every streak in order, the final (possibly ongoing) one included.
    pub streak_history: Vec<StreakPeriod>,
}

/// Streak summary for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStreaks {
    pub symbol: String,
    pub current_streak: usize,
    pub current_streak_kind: StreakKind,
    pub longest_win_streak: usize,
    pub longest_lose_streak: usize,
    /// Number of win/loss trades in the group.
    pub trades: usize,
}

/// Streak summary for one strategy tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStreaks {
    pub strategy: String,
    pub current_streak: usize,
    pub current_streak_kind: StreakKind,
    pub longest_win_streak: usize,
    pub longest_lose_streak: usize,
    pub trades: usize,
}

/// Computes the global streak statistics for a set of closed trades.
pub fn streak_metrics(trades: &[ClosedTrade]) -> StreakMetrics {
    tracing::debug!(trades = trades.len(), "analyzing streaks");

    let history = streak_history(trades);
    metrics_from_history(history)
}

/// Runs the streak scan independently for every symbol.
///
/// Symbols with no win/loss trades (all breakeven, or no trades at all)
/// are omitted entirely rather than zero-filled.
pub fn symbol_streaks(trades: &[ClosedTrade]) -> Vec<SymbolStreaks> {
    let mut groups: BTreeMap<&str, Vec<ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        groups
            .entry(trade.symbol.as_str())
            .or_default()
            .push(trade.clone());
    }

    let mut result: Vec<SymbolStreaks> = groups
        .into_iter()
        .filter_map(|(symbol, group)| {
            let metrics = streak_metrics(&group);
            let kind = metrics.current_streak_kind?;
            Some(SymbolStreaks {
                symbol: symbol.to_string(),
                current_streak: metrics.current_streak,
                current_streak_kind: kind,
                longest_win_streak: metrics.longest_win_streak,
                longest_lose_streak: metrics.longest_lose_streak,
                trades: metrics.streak_history.iter().map(|s| s.length).sum(),
            })
        })
        .collect();

    result.sort_by(|a, b| {
        b.current_streak
            .cmp(&a.current_streak)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    result
}

/// Runs the streak scan independently for every strategy tag.
///
/// Untagged trades belong to no strategy group; groups with no win/loss
/// trades are omitted.
pub fn strategy_streaks(trades: &[ClosedTrade]) -> Vec<StrategyStreaks> {
    let mut groups: BTreeMap<&str, Vec<ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        if let Some(strategy) = trade.strategy.as_deref() {
            groups.entry(strategy).or_default().push(trade.clone());
        }
    }

    let mut result: Vec<StrategyStreaks> = groups
        .into_iter()
        .filter_map(|(strategy, group)| {
            let metrics = streak_metrics(&group);
            let kind = metrics.current_streak_kind?;
            Some(StrategyStreaks {
                strategy: strategy.to_string(),
                current_streak: metrics.current_streak,
                current_streak_kind: kind,
                longest_win_streak: metrics.longest_win_streak,
                longest_lose_streak: metrics.longest_lose_streak,
                trades: metrics.streak_history.iter().map(|s| s.length).sum(),
            })
        })
        .collect();

    result.sort_by(|a, b| {
        b.current_streak
            .cmp(&a.current_streak)
            .then_with(|| a.strategy.cmp(&b.strategy))
    });
    result
}

/// Single-pass run extraction over exit-date-sorted win/loss trades.
///
/// The final run is always closed and recorded, so the concatenation of
/// all recorded lengths equals the number of eligible trades.
fn streak_history(trades: &[ClosedTrade]) -> Vec<StreakPeriod> {
    let sorted = ClosedTrade::sorted_by_exit(trades);

    let mut history = Vec::new();
    let mut run: Option<StreakPeriod> = None;

    for trade in sorted.iter().filter(|t| t.pnl != Decimal::ZERO) {
        let kind = if trade.is_win() {
            StreakKind::Winning
        } else {
            StreakKind::Losing
        };

        match &mut run {
            Some(current) if current.kind == kind => {
                current.length += 1;
                current.total_pnl += trade.pnl;
                current.end_date = trade.exit_date;
            }
            _ => {
                if let Some(finished) = run.take() {
                    history.push(finished);
                }
                run = Some(StreakPeriod {
                    kind,
                    length: 1,
                    start_date: trade.exit_date,
                    end_date: trade.exit_date,
                    total_pnl: trade.pnl,
                });
            }
        }
    }

    if let Some(finished) = run {
        history.push(finished);
    }

    history
}

fn metrics_from_history(history: Vec<StreakPeriod>) -> StreakMetrics {
    let win_lengths: Vec<usize> = history
        .iter()
        .filter(|s| s.kind == StreakKind::Winning)
        .map(|s| s.length)
        .collect();
    let lose_lengths: Vec<usize> = history
        .iter()
        .filter(|s| s.kind == StreakKind::Losing)
        .map(|s| s.length)
        .collect();

    let current = history.last();

    StreakMetrics {
        current_streak: current.map(|s| s.length).unwrap_or(0),
        current_streak_kind: current.map(|s| s.kind),
        longest_win_streak: win_lengths.iter().copied().max().unwrap_or(0),
        longest_lose_streak: lose_lengths.iter().copied().max().unwrap_or(0),
        average_win_streak: average(&win_lengths),
        average_lose_streak: average(&lose_lengths),
        total_win_streaks: win_lengths.len(),
        total_lose_streaks: lose_lengths.len(),
        streak_history: history,
    }
}

fn average(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
}

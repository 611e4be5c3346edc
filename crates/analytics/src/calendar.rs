use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Net P&L of one civil day (UTC), attributed by exit date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub trade_count: usize,
}

/// Day-level statistics across the whole journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarStats {
    pub trading_days: usize,
    pub win_days: usize,
    pub loss_days: usize,
    pub max_win_day_streak: usize,
    pub max_loss_day_streak: usize,
    /// Share of trading days that closed positive, in percent.
    pub day_win_rate: f64,
    pub max_profit_day: Decimal,
    /// Largest single-day loss, as a positive magnitude.
    pub max_loss_day: Decimal,
    pub avg_profit_day: Decimal,
    pub avg_loss_day: Decimal,
    pub total_profit: Decimal,
    pub total_loss: Decimal,
    pub net_pnl: Decimal,
    pub avg_daily_pnl: Decimal,
}

/// One calendar month of trading activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_pnl: Decimal,
    pub win_rate: f64,
    pub average_pnl: Decimal,
    /// Average win over average loss; 0 when the month has no losses.
    pub risk_reward_ratio: Decimal,
}

/// Groups closed trades into per-day P&L rows, sorted by date.
pub fn daily_pnl(trades: &[ClosedTrade]) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for trade in trades {
        let entry = by_day.entry(trade.exit_date.date_naive()).or_default();
        entry.0 += trade.pnl;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (pnl, trade_count))| DailyPnl {
            date,
            pnl,
            trade_count,
        })
        .collect()
}

/// Aggregates daily rows into `CalendarStats`. Empty input yields zeros.
pub fn calendar_stats(daily: &[DailyPnl]) -> CalendarStats {
    if daily.is_empty() {
        return CalendarStats::default();
    }

    let mut stats = CalendarStats {
        trading_days: daily.len(),
        ..CalendarStats::default()
    };

    // Flat (zero P&L) days neither extend nor break a day streak.
    let mut win_run = 0usize;
    let mut loss_run = 0usize;

    for day in daily {
        if day.pnl > Decimal::ZERO {
            stats.win_days += 1;
            stats.total_profit += day.pnl;
            stats.max_profit_day = stats.max_profit_day.max(day.pnl);
            win_run += 1;
            loss_run = 0;
            stats.max_win_day_streak = stats.max_win_day_streak.max(win_run);
        } else if day.pnl < Decimal::ZERO {
            stats.loss_days += 1;
            stats.total_loss += day.pnl.abs();
            stats.max_loss_day = stats.max_loss_day.max(day.pnl.abs());
            loss_run += 1;
            win_run = 0;
            stats.max_loss_day_streak = stats.max_loss_day_streak.max(loss_run);
        }
    }

    stats.net_pnl = stats.total_profit - stats.total_loss;
    stats.day_win_rate = stats.win_days as f64 / stats.trading_days as f64 * 100.0;
    if stats.win_days > 0 {
        stats.avg_profit_day = stats.total_profit / Decimal::from(stats.win_days);
    }
    if stats.loss_days > 0 {
        stats.avg_loss_day = stats.total_loss / Decimal::from(stats.loss_days);
    }
    stats.avg_daily_pnl = stats.net_pnl / Decimal::from(stats.trading_days);

    stats
}

/// Per-month trade statistics, in chronological order.
pub fn monthly_breakdown(trades: &[ClosedTrade]) -> Vec<MonthlyBreakdown> {
    let mut by_month: BTreeMap<(i32, u32), Vec<&ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        let date = trade.exit_date.date_naive();
        by_month
            .entry((date.year(), date.month()))
            .or_default()
            .push(trade);
    }

    by_month
        .into_iter()
        .map(|((year, month), group)| {
            let winners: Vec<&&ClosedTrade> = group.iter().filter(|t| t.pnl > Decimal::ZERO).collect();
            let losers: Vec<&&ClosedTrade> = group.iter().filter(|t| t.pnl < Decimal::ZERO).collect();

            let total_pnl: Decimal = group.iter().map(|t| t.pnl).sum();
            let total_wins: Decimal = winners.iter().map(|t| t.pnl).sum();
            let total_losses: Decimal = losers.iter().map(|t| t.pnl).sum::<Decimal>().abs();

            let avg_win = if winners.is_empty() {
                Decimal::ZERO
            } else {
                total_wins / Decimal::from(winners.len())
            };
            let avg_loss = if losers.is_empty() {
                Decimal::ZERO
            } else {
                total_losses / Decimal::from(losers.len())
            };

            MonthlyBreakdown {
                year,
                month,
                total_trades: group.len(),
                winning_trades: winners.len(),
                losing_trades: losers.len(),
                total_pnl,
                win_rate: winners.len() as f64 / group.len() as f64 * 100.0,
                average_pnl: total_pnl / Decimal::from(group.len()),
                risk_reward_ratio: if avg_loss > Decimal::ZERO {
                    avg_win / avg_loss
                } else {
                    Decimal::ZERO
                },
            }
        })
        .collect()
}

use chrono::{DateTime, Utc};
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point on the cumulative P&L curve, emitted per closed trade.
///
/// Equity is tracked relative to zero (no P&L), not relative to starting
/// capital: the running peak starts at zero, so a losing first trade
/// immediately registers as a drawdown from the zero baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Exit date of the trade that produced this point.
    pub date: DateTime<Utc>,
    /// This trade's contribution.
    pub pnl: Decimal,
    /// Running sum of P&L in chronological order.
    pub cumulative_pnl: Decimal,
    /// Highest cumulative P&L seen so far. Monotonically non-decreasing.
    pub running_peak: Decimal,
    /// `running_peak - cumulative_pnl`; zero exactly at and after new peaks.
    pub drawdown: Decimal,
    /// Drawdown as a percentage of the peak; zero while the peak is <= 0.
    pub drawdown_percentage: Decimal,
    pub is_in_drawdown: bool,
}

/// Builds the equity curve for a set of closed trades.
///
/// Trades are sorted ascending by exit date (stable on ties) and reduced
/// into one `EquityPoint` each. An empty input produces an empty curve.
pub fn equity_curve(trades: &[ClosedTrade]) -> Vec<EquityPoint> {
    let sorted = ClosedTrade::sorted_by_exit(trades);

    let mut cumulative_pnl = Decimal::ZERO;
    let mut running_peak = Decimal::ZERO;
    let mut points = Vec::with_capacity(sorted.len());

    for trade in &sorted {
        cumulative_pnl += trade.pnl;
        if cumulative_pnl > running_peak {
            running_peak = cumulative_pnl;
        }

        let drawdown = running_peak - cumulative_pnl;
        let drawdown_percentage = if running_peak > Decimal::ZERO {
            drawdown / running_peak * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        points.push(EquityPoint {
            date: trade.exit_date,
            pnl: trade.pnl,
            cumulative_pnl,
            running_peak,
            drawdown,
            drawdown_percentage,
            is_in_drawdown: drawdown > Decimal::ZERO,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trade;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_input_yields_empty_curve() {
        assert!(equity_curve(&[]).is_empty());
    }

    #[test]
    fn accumulates_and_tracks_peak() {
        let trades = vec![
            trade("t1", "A", "2024-01-01", dec!(100)),
            trade("t2", "A", "2024-01-02", dec!(-150)),
            trade("t3", "A", "2024-01-03", dec!(-50)),
            trade("t4", "A", "2024-01-04", dec!(300)),
        ];
        let curve = equity_curve(&trades);

        let cumulative: Vec<Decimal> = curve.iter().map(|p| p.cumulative_pnl).collect();
        assert_eq!(cumulative, vec![dec!(100), dec!(-50), dec!(-100), dec!(200)]);

        let peaks: Vec<Decimal> = curve.iter().map(|p| p.running_peak).collect();
        assert_eq!(peaks, vec![dec!(100), dec!(100), dec!(100), dec!(200)]);

        let drawdowns: Vec<Decimal> = curve.iter().map(|p| p.drawdown).collect();
        assert_eq!(drawdowns, vec![dec!(0), dec!(150), dec!(200), dec!(0)]);
    }

    #[test]
    fn peak_is_monotonic_and_dominates_equity() {
        let pnls = [
            dec!(50),
            dec!(-20),
            dec!(75),
            dec!(-120),
            dec!(10),
            dec!(200),
            dec!(-5),
        ];
        let trades: Vec<_> = pnls
            .iter()
            .enumerate()
            .map(|(i, pnl)| trade(&format!("t{i}"), "A", &format!("2024-01-{:02}", i + 1), *pnl))
            .collect();

        let curve = equity_curve(&trades);
        for pair in curve.windows(2) {
            assert!(pair[1].running_peak >= pair[0].running_peak);
        }
        for point in &curve {
            assert!(point.running_peak >= point.cumulative_pnl);
            assert!(point.drawdown >= Decimal::ZERO);
            if point.cumulative_pnl == point.running_peak {
                assert_eq!(point.drawdown, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn losing_first_trade_draws_down_from_zero_baseline() {
        let trades = vec![trade("t1", "A", "2024-01-01", dec!(-80))];
        let curve = equity_curve(&trades);

        assert_eq!(curve[0].running_peak, dec!(0));
        assert_eq!(curve[0].drawdown, dec!(80));
        // Peak is not positive, so the percentage stays at zero.
        assert_eq!(curve[0].drawdown_percentage, dec!(0));
        assert!(curve[0].is_in_drawdown);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let trades = vec![
            trade("t1", "A", "2024-01-01", dec!(10)),
            trade("t2", "A", "2024-01-02", dec!(-4)),
        ];
        let before = trades.clone();
        let first = equity_curve(&trades);
        let second = equity_curve(&trades);
        assert_eq!(first, second);
        assert_eq!(trades, before);
    }
}

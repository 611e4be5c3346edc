use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The result class of a single closed trade.
///
/// A trade is a win only when it realized a strictly positive P&L; a zero
/// P&L is breakeven, not a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
    Breakeven,
}

impl TradeOutcome {
    /// Classifies a realized P&L amount.
    pub fn from_pnl(pnl: Decimal) -> Self {
        if pnl > Decimal::ZERO {
            TradeOutcome::Win
        } else if pnl < Decimal::ZERO {
            TradeOutcome::Loss
        } else {
            TradeOutcome::Breakeven
        }
    }

    /// Single-letter state code used by sequence/pattern encodings.
    pub fn state_char(&self) -> char {
        match self {
            TradeOutcome::Win => 'W',
            TradeOutcome::Loss => 'L',
            TradeOutcome::Breakeven => 'B',
        }
    }

    /// Stable index into 3x3 transition tables (W=0, L=1, B=2).
    pub fn index(&self) -> usize {
        match self {
            TradeOutcome::Win => 0,
            TradeOutcome::Loss => 1,
            TradeOutcome::Breakeven => 2,
        }
    }

    /// All outcomes in transition-table order.
    pub const ALL: [TradeOutcome; 3] = [
        TradeOutcome::Win,
        TradeOutcome::Loss,
        TradeOutcome::Breakeven,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn classifies_pnl_sign() {
        assert_eq!(TradeOutcome::from_pnl(dec!(10)), TradeOutcome::Win);
        assert_eq!(TradeOutcome::from_pnl(dec!(-0.01)), TradeOutcome::Loss);
        assert_eq!(TradeOutcome::from_pnl(dec!(0)), TradeOutcome::Breakeven);
    }

    #[test]
    fn state_chars_are_unique() {
        assert_eq!(TradeOutcome::Win.state_char(), 'W');
        assert_eq!(TradeOutcome::Loss.state_char(), 'L');
        assert_eq!(TradeOutcome::Breakeven.state_char(), 'B');
    }
}

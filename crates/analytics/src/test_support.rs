//! Shared builders for unit tests.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use core_types::ClosedTrade;
use rust_decimal::Decimal;

pub fn day(date: &str) -> DateTime<Utc> {
    date.parse::<NaiveDate>()
        .expect("test date must be YYYY-MM-DD")
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// A closed trade entered the same day it exits.
pub fn trade(id: &str, symbol: &str, exit: &str, pnl: Decimal) -> ClosedTrade {
    ClosedTrade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        entry_date: day(exit),
        exit_date: day(exit),
        pnl,
        strategy: None,
        notes: None,
        lessons: None,
    }
}

/// A closed trade with an explicit entry date and strategy tag.
pub fn trade_full(
    id: &str,
    symbol: &str,
    entry: &str,
    exit: &str,
    pnl: Decimal,
    strategy: Option<&str>,
) -> ClosedTrade {
    ClosedTrade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        entry_date: day(entry),
        exit_date: day(exit),
        pnl,
        strategy: strategy.map(str::to_string),
        notes: None,
        lessons: None,
    }
}

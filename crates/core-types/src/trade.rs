use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::enums::TradeOutcome;
use crate::error::CoreError;

/// A trade record exactly as the persistence collaborator delivers it.
///
/// Dates arrive as ISO-8601 strings (either an RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date) and the P&L arrives as a plain float. Nothing here is
/// validated; `Trade::from_record` is the single place where that happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    pub symbol: String,
    pub entry_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<String>,
}

/// A validated trade. Open positions (no exit yet) are representable; the
/// analytics only ever see the `ClosedTrade` projection below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub pnl_amount: Option<Decimal>,
    pub strategy: Option<String>,
    pub notes: Option<String>,
    pub lessons: Option<String>,
}

impl Trade {
    /// Parses and validates a raw record.
    ///
    /// Fails on an unparseable date or a non-finite P&L; a missing exit date
    /// or missing P&L is not an error (the position is simply still open).
    pub fn from_record(record: &TradeRecord) -> Result<Self, CoreError> {
        let entry_date = parse_date(&record.id, "entry", &record.entry_date)?;
        let exit_date = record
            .exit_date
            .as_deref()
            .map(|raw| parse_date(&record.id, "exit", raw))
            .transpose()?;

        let pnl_amount = record
            .pnl_amount
            .map(|v| Decimal::from_f64(v).ok_or_else(|| CoreError::NonFinitePnl(record.id.clone())))
            .transpose()?;

        Ok(Self {
            id: record.id.clone(),
            symbol: record.symbol.clone(),
            entry_date,
            exit_date,
            pnl_amount,
            strategy: record.strategy.clone(),
            notes: record.notes.clone(),
            lessons: record.lessons.clone(),
        })
    }

    /// A trade is closed once it has both an exit date and a realized P&L.
    pub fn is_closed(&self) -> bool {
        self.exit_date.is_some() && self.pnl_amount.is_some()
    }
}

/// The analysis input: a closed position with both dates and a realized P&L.
///
/// Every analytic function in the workspace takes `&[ClosedTrade]` and
/// treats it as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: String,
    pub symbol: String,
    pub entry_date: DateTime<Utc>,
    pub exit_date: DateTime<Utc>,
    pub pnl: Decimal,
    pub strategy: Option<String>,
    pub notes: Option<String>,
    pub lessons: Option<String>,
}

impl ClosedTrade {
    /// The defensive filter every analysis assumes has run: open positions
    /// are dropped, closed ones are projected into the analysis shape.
    pub fn filter_closed(trades: &[Trade]) -> Vec<ClosedTrade> {
        trades
            .iter()
            .filter_map(|t| {
                let exit_date = t.exit_date?;
                let pnl = t.pnl_amount?;
                Some(ClosedTrade {
                    id: t.id.clone(),
                    symbol: t.symbol.clone(),
                    entry_date: t.entry_date,
                    exit_date,
                    pnl,
                    strategy: t.strategy.clone(),
                    notes: t.notes.clone(),
                    lessons: t.lessons.clone(),
                })
            })
            .collect()
    }

    /// Returns a copy of the slice sorted ascending by exit date.
    ///
    /// The sort is stable: trades sharing an exit date keep their input
    /// order. Every chronological analysis starts from this ordering.
    pub fn sorted_by_exit(trades: &[ClosedTrade]) -> Vec<ClosedTrade> {
        let mut sorted = trades.to_vec();
        sorted.sort_by_key(|t| t.exit_date);
        sorted
    }

    pub fn outcome(&self) -> TradeOutcome {
        TradeOutcome::from_pnl(self.pnl)
    }

    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Holding period from entry to exit, in fractional days.
    pub fn hold_days(&self) -> f64 {
        let millis = (self.exit_date - self.entry_date).num_milliseconds();
        millis as f64 / MILLIS_PER_DAY
    }
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn parse_date(trade_id: &str, field: &'static str, raw: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(CoreError::InvalidDate {
        trade_id: trade_id.to_string(),
        field,
        raw: raw.to_string(),
    })
}

//! # Journal Analytics Engine
//!
//! This crate provides the quantitative analysis of a trading journal: it
//! turns a chronological sequence of closed trades into equity curves,
//! drawdown segmentations, streak statistics, outcome-sequence models,
//! calendar aggregates and cohort comparisons. It acts as the "unbiased
//! judge" of the journal.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` and `configuration`.
//! - **Stateless Calculation:** Every function here is a stateless
//!   calculator. It takes a snapshot of closed trades as input and produces
//!   freshly computed result structs as output, which makes it reliable,
//!   trivially parallel and easy to test.
//! - **Edge states are results, not errors:** an empty journal or a group
//!   with too little data yields a well-defined zero/empty result. A brand
//!   new user must never see an analytics error.

// Declare the modules that constitute this crate.
pub mod calendar;
pub mod cohort;
pub mod drawdown;
pub mod equity;
pub mod markov;
pub mod streak;

#[cfg(test)]
mod test_support;

// Re-export the key components to create a clean, public-facing API.
pub use calendar::{CalendarStats, DailyPnl, MonthlyBreakdown};
pub use cohort::{
    CohortComparison, CohortInsight, CohortMetrics, CohortPeriod, ComparisonMetric,
    MetricDirection, Significance, Trend,
};
pub use drawdown::{
    DrawdownAnalysis, DrawdownMetrics, DrawdownPeriod, SymbolDrawdownPeriod, SymbolDrawdownSummary,
};
pub use equity::EquityPoint;
pub use markov::{
    CurrentOutcomeStreak, LongestOutcomeStreak, MarkovPrediction, OutcomeStreaks,
    PatternOccurrence, SequenceMetrics, SequencePattern, TransitionMatrix,
};
pub use streak::{StrategyStreaks, StreakKind, StreakMetrics, StreakPeriod, SymbolStreaks};

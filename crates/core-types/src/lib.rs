//! # Journal Core Types
//!
//! The foundation (Layer 0) of the journal analytics workspace. It defines
//! the data contracts shared by every analytic crate: the raw trade record
//! as delivered by the persistence collaborator, the validated in-memory
//! `Trade`, the `ClosedTrade` view that all analytics consume, and the
//! outcome classification used by streak and sequence analysis.
//!
//! ## Architectural Principles
//!
//! - **No upward dependencies:** this crate depends on no other workspace
//!   crate. Everything above it (analytics, drift, sentiment) depends on it.
//! - **Validate once at the boundary:** raw records are parsed and checked
//!   exactly once (`Trade::from_record`). Past that point, analytic code may
//!   assume well-typed dates and finite P&L values.
//! - **Snapshots, not state:** analytics receive immutable slices of
//!   `ClosedTrade` and never mutate them.

// Declare the modules that constitute this crate.
pub mod enums;
pub mod error;
pub mod trade;

// Re-export the core types to provide a clean public API.
pub use enums::TradeOutcome;
pub use error::CoreError;
pub use trade::{ClosedTrade, Trade, TradeRecord};

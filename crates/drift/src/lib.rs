//! # Journal Drift Detector
//!
//! Statistical regime-change detection over a trader's return series. The
//! detector combines two classic control-chart signals:
//!
//! - a **rolling Z-score**, which standardizes each return against its
//!   trailing window and flags short-lived volatility spikes, and
//! - **Page's one-sided CUSUM recursions**, which accumulate deviations
//!   from the full-series mean and flag sustained shifts while a slack
//!   term filters out noise.
//!
//! From those signals it derives a per-trade regime label, contiguous
//! drift events, a regime-change log and a rule-based alert list.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** pure calculation over a snapshot of closed trades;
//!   no knowledge of external systems.
//! - **Insufficient data is a result, not an error:** fewer trades than
//!   the Z-score window yields an empty analysis carrying a single
//!   informational alert that names the required window size.

// Declare the modules that constitute this crate.
pub mod alert;
pub mod detector;

// Re-export the key components to create a clean, public-facing API.
pub use alert::{AlertLevel, DriftAlert};
pub use detector::{
    DriftAnalysis, DriftEvent, DriftKind, DriftPoint, DriftStatistics, Regime, RegimeChange,
    Severity, analyze_drift, classify_regime, cusum, rolling_z_scores,
};

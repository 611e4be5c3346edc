//! # Journal Note Sentiment
//!
//! Lexicon-based analysis of free-text trade notes: sentiment scoring,
//! emotional-state tagging, keyword/win-rate correlation, discipline
//! scoring and rule-based insight generation. Everything here is plain
//! substring and token matching against fixed word lists; there is no
//! model inference and no network access.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** pure calculation over a snapshot of closed trades;
//!   depends only on `core-types` and `configuration`.
//! - **A trade's analyzable text** is its `notes` and `lessons` fields
//!   joined by a blank line when both are present; trades with neither are
//!   excluded from every aggregate.

// Declare the modules that constitute this crate.
pub mod analysis;
pub mod discipline;
pub mod insight;
pub mod keywords;
pub mod lexicon;
pub mod score;

// Re-export the key components to create a clean, public-facing API.
pub use analysis::{
    NlpAnalysis, NoteSentiment, SentimentCorrelation, SentimentTrendPoint, analyze_notes,
};
pub use discipline::DisciplineMetrics;
pub use insight::{Impact, InsightCategory, InsightEvidence, InsightKind, NlpInsight};
pub use keywords::{EmotionalPattern, KeywordFrequency};
pub use lexicon::EmotionalState;
pub use score::{
    SentimentKind, SentimentScore, analyze_sentiment, combined_notes, detect_emotions,
    has_actionable_content, tokenize,
};

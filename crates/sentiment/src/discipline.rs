use configuration::SentimentParams;
use core_types::ClosedTrade;
use serde::{Deserialize, Serialize};

use crate::score::{analyze_sentiment, combined_notes, has_actionable_content};

/// Note length a reflection must exceed to count as substantive.
const REFLECTION_MIN_CHARS: usize = 100;

/// Substring-presence scores over the trades with qualifying notes.
///
/// The three `*_score` fields are percentages of qualifying notes; the
/// remaining fields are raw counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineMetrics {
    /// Notes referencing a plan, strategy or rule-following, in percent.
    pub plan_following_score: u32,
    /// Notes showing patience or deliberate waiting, in percent.
    pub emotional_control_score: u32,
    /// Long notes that also explain causes or lessons, in percent.
    pub reflection_quality: u32,
    /// Notes containing forward-looking, actionable language.
    pub actionable_insights: usize,
    /// Strongly positive notes attached to winning trades.
    pub positive_reinforcement: usize,
    /// Notes mentioning revenge trading, FOMO or impulsive behavior.
    pub negative_patterns: usize,
}

/// Scores journaling discipline across the trades with qualifying notes.
pub fn discipline_metrics(trades: &[ClosedTrade], params: &SentimentParams) -> DisciplineMetrics {
    let mut plan_following = 0usize;
    let mut emotional_control = 0usize;
    let mut reflection_quality = 0usize;
    let mut metrics = DisciplineMetrics::default();
    let mut valid_notes = 0usize;

    for trade in trades {
        let Some(text) = combined_notes(trade) else {
            continue;
        };
        if text.chars().count() < params.min_note_length {
            continue;
        }

        valid_notes += 1;
        let lower = text.to_lowercase();
        let sentiment = analyze_sentiment(&text, params.sentiment_threshold);

        if ["plan", "strategy", "followed"].iter().any(|kw| lower.contains(kw)) {
            plan_following += 1;
        }
        if ["patient", "disciplined", "waited"].iter().any(|kw| lower.contains(kw)) {
            emotional_control += 1;
        }
        if text.chars().count() > REFLECTION_MIN_CHARS
            && (lower.contains("because") || lower.contains("learned"))
        {
            reflection_quality += 1;
        }
        if has_actionable_content(&text) {
            metrics.actionable_insights += 1;
        }
        if sentiment.overall > 0.5 && trade.is_win() {
            metrics.positive_reinforcement += 1;
        }
        if ["revenge", "fomo", "impulsive"].iter().any(|kw| lower.contains(kw)) {
            metrics.negative_patterns += 1;
        }
    }

    let total = valid_notes.max(1);
    metrics.plan_following_score = percentage(plan_following, total);
    metrics.emotional_control_score = percentage(emotional_control, total);
    metrics.reflection_quality = percentage(reflection_quality, total);
    metrics
}

fn percentage(count: usize, total: usize) -> u32 {
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn noted(id: &str, pnl: Decimal, notes: &str) -> ClosedTrade {
        ClosedTrade {
            id: id.to_string(),
            symbol: "A".to_string(),
            entry_date: Utc::now(),
            exit_date: Utc::now(),
            pnl,
            strategy: None,
            notes: Some(notes.to_string()),
            lessons: None,
        }
    }

    #[test]
    fn scores_are_percentages_of_qualifying_notes() {
        let trades = vec![
            noted("t1", dec!(50), "followed the plan and waited patiently"),
            noted("t2", dec!(-20), "chased the move, classic fomo entry"),
            noted("t3", dec!(10), "quiet session, small scalp"),
            noted("t4", dec!(5), "no"), // below the minimum length, ignored
        ];
        let metrics = discipline_metrics(&trades, &SentimentParams::default());

        assert_eq!(metrics.plan_following_score, 33);
        assert_eq!(metrics.emotional_control_score, 33);
        assert_eq!(metrics.negative_patterns, 1);
    }

    #[test]
    fn reflection_requires_length_and_causal_language() {
        let long_reflection = "Stopped out early because I sized up before confirmation. \
            I learned that waiting for the retest keeps me out of weak setups, and \
            I will write the checklist down before entering next time.";
        let trades = vec![
            noted("t1", dec!(10), long_reflection),
            noted("t2", dec!(10), "learned a lot"), // causal word, but too short
        ];
        let metrics = discipline_metrics(&trades, &SentimentParams::default());

        assert_eq!(metrics.reflection_quality, 50);
        assert!(metrics.actionable_insights >= 1);
    }

    #[test]
    fn positive_reinforcement_needs_both_sentiment_and_profit() {
        let trades = vec![
            noted("t1", dec!(100), "great execution, perfect patient entry, strong target"),
            noted("t2", dec!(-100), "great setup, perfect read, strong momentum"),
        ];
        let metrics = discipline_metrics(&trades, &SentimentParams::default());
        assert_eq!(metrics.positive_reinforcement, 1);
    }

    #[test]
    fn empty_journal_scores_zero() {
        assert_eq!(
            discipline_metrics(&[], &SentimentParams::default()),
            DisciplineMetrics::default()
        );
    }
}

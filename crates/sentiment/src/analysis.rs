use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use configuration::SentimentParams;
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::discipline::{DisciplineMetrics, discipline_metrics};
use crate::insight::{NlpInsight, generate_insights};
use crate::keywords::{EmotionalPattern, KeywordFrequency, emotional_patterns, extract_keywords};
use crate::lexicon::EmotionalState;
use crate::score::{
    SentimentKind, SentimentScore, analyze_sentiment, combined_notes, detect_emotions,
    has_actionable_content,
};

/// Notes at which the overall-sentiment confidence saturates.
const OVERALL_CONFIDENCE_NOTES: f64 = 20.0;

/// Co-moment magnitude above which a directional description is given.
const CORRELATION_BAND: f64 = 0.1;

/// Sentiment and emotional tagging of one trade's notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSentiment {
    pub trade_id: String,
    pub date: DateTime<Utc>,
    pub sentiment: SentimentScore,
    pub emotional_state: Vec<EmotionalState>,
    pub note_length: usize,
    pub has_action: bool,
}

/// Average sentiment and outcome of one entry day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrendPoint {
    pub date: NaiveDate,
    pub sentiment: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub pnl: Decimal,
}

/// Sentiment/performance co-movement.
///
/// `co_moment` is the raw quantity `E[s*p] - E[s]*E[p]` over notes-bearing
/// trades: a covariance-like estimate, not a normalized Pearson
/// coefficient. It is unbounded and only its sign and rough magnitude are
/// meaningful, which is all the directional description uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentCorrelation {
    pub co_moment: f64,
    pub description: String,
}

/// The complete note-analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpAnalysis {
    /// Trades carrying any note text at all.
    pub total_notes: usize,
    /// Trades whose combined notes meet the minimum length.
    pub notes_with_content: usize,
    pub avg_note_length: f64,
    pub overall_sentiment: SentimentScore,
    pub sentiment_by_trade: Vec<NoteSentiment>,
    pub sentiment_trend: Vec<SentimentTrendPoint>,
    pub top_keywords: Vec<KeywordFrequency>,
    pub emotional_patterns: Vec<EmotionalPattern>,
    pub discipline: DisciplineMetrics,
    pub insights: Vec<NlpInsight>,
    pub sentiment_vs_performance: SentimentCorrelation,
}

/// Runs the complete note analysis over a set of closed trades.
///
/// Trades without notes are excluded from every aggregate; an entirely
/// note-free journal yields a zeroed analysis, not an error.
pub fn analyze_notes(trades: &[ClosedTrade], params: &SentimentParams) -> NlpAnalysis {
    tracing::debug!(trades = trades.len(), "analyzing trade notes");

    let total_notes = trades
        .iter()
        .filter(|t| combined_notes(t).is_some_and(|n| !n.is_empty()))
        .count();

    let with_notes: Vec<&ClosedTrade> = trades
        .iter()
        .filter(|t| {
            combined_notes(t).is_some_and(|n| n.chars().count() >= params.min_note_length)
        })
        .collect();
    let with_notes_owned: Vec<ClosedTrade> = with_notes.iter().map(|t| (*t).clone()).collect();

    let sentiment_by_trade: Vec<NoteSentiment> = with_notes
        .iter()
        .filter_map(|trade| {
            let text = combined_notes(trade)?;
            Some(NoteSentiment {
                trade_id: trade.id.clone(),
                date: trade.entry_date,
                sentiment: analyze_sentiment(&text, params.sentiment_threshold),
                emotional_state: detect_emotions(&text),
                note_length: text.chars().count(),
                has_action: has_actionable_content(&text),
            })
        })
        .collect();

    let overall_sentiment = overall_sentiment(&sentiment_by_trade, params.sentiment_threshold);
    let top_keywords = extract_keywords(&with_notes_owned, params);
    let patterns = emotional_patterns(&with_notes_owned, params);
    let discipline = discipline_metrics(&with_notes_owned, params);
    let insights = generate_insights(with_notes_owned.len(), &top_keywords, &patterns, &discipline);

    let divisor = with_notes.len().max(1) as f64;
    let avg_note_length = sentiment_by_trade
        .iter()
        .map(|s| s.note_length as f64)
        .sum::<f64>()
        / divisor;

    NlpAnalysis {
        total_notes,
        notes_with_content: with_notes.len(),
        avg_note_length,
        sentiment_vs_performance: sentiment_correlation(&with_notes, &sentiment_by_trade),
        sentiment_trend: sentiment_trend(&with_notes, &sentiment_by_trade),
        overall_sentiment,
        sentiment_by_trade,
        top_keywords,
        emotional_patterns: patterns,
        discipline,
        insights,
    }
}

/// Mean per-note sentiment, classified with the same band as single notes.
fn overall_sentiment(notes: &[NoteSentiment], threshold: f64) -> SentimentScore {
    let divisor = notes.len().max(1) as f64;
    let overall = notes.iter().map(|s| s.sentiment.overall).sum::<f64>() / divisor;

    let kind = if overall > threshold {
        SentimentKind::Positive
    } else if overall < -threshold {
        SentimentKind::Negative
    } else {
        SentimentKind::Neutral
    };

    SentimentScore {
        overall,
        kind,
        confidence: (notes.len() as f64 / OVERALL_CONFIDENCE_NOTES).min(1.0),
        positive_words: Vec::new(),
        negative_words: Vec::new(),
    }
}

/// Per-entry-day sentiment averages, in date order.
fn sentiment_trend(
    trades: &[&ClosedTrade],
    notes: &[NoteSentiment],
) -> Vec<SentimentTrendPoint> {
    struct DayAccumulator {
        sentiment_sum: f64,
        trades: usize,
        wins: usize,
        pnl: Decimal,
    }

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for (trade, note) in trades.iter().zip(notes) {
        let entry = days
            .entry(trade.entry_date.date_naive())
            .or_insert(DayAccumulator {
                sentiment_sum: 0.0,
                trades: 0,
                wins: 0,
                pnl: Decimal::ZERO,
            });
        entry.sentiment_sum += note.sentiment.overall;
        entry.trades += 1;
        if trade.is_win() {
            entry.wins += 1;
        }
        entry.pnl += trade.pnl;
    }

    days.into_iter()
        .map(|(date, acc)| SentimentTrendPoint {
            date,
            sentiment: acc.sentiment_sum / acc.trades as f64,
            trade_count: acc.trades,
            win_rate: acc.wins as f64 / acc.trades as f64 * 100.0,
            pnl: acc.pnl,
        })
        .collect()
}

fn sentiment_correlation(
    trades: &[&ClosedTrade],
    notes: &[NoteSentiment],
) -> SentimentCorrelation {
    let divisor = trades.len().max(1) as f64;

    let mut sentiment_pnl_sum = 0.0;
    let mut sentiment_sum = 0.0;
    let mut pnl_sum = 0.0;
    for (trade, note) in trades.iter().zip(notes) {
        let pnl = trade.pnl.to_f64().unwrap_or(0.0);
        sentiment_pnl_sum += note.sentiment.overall * pnl;
        sentiment_sum += note.sentiment.overall;
        pnl_sum += pnl;
    }

    let co_moment =
        sentiment_pnl_sum / divisor - (sentiment_sum / divisor) * (pnl_sum / divisor);

    let description = if co_moment > CORRELATION_BAND {
        "Positive sentiment correlates with better performance"
    } else if co_moment < -CORRELATION_BAND {
        "Negative sentiment correlates with worse performance"
    } else {
        "No strong correlation between sentiment and performance"
    };

    SentimentCorrelation {
        co_moment,
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn noted(id: &str, day: u32, pnl: Decimal, notes: Option<&str>, lessons: Option<&str>) -> ClosedTrade {
        let date = NaiveDate::from_ymd_opt(2024, 8, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();
        ClosedTrade {
            id: id.to_string(),
            symbol: "A".to_string(),
            entry_date: date,
            exit_date: date,
            pnl,
            strategy: None,
            notes: notes.map(str::to_string),
            lessons: lessons.map(str::to_string),
        }
    }

    #[test]
    fn noteless_journal_yields_zeroed_analysis() {
        let trades = vec![noted("t1", 1, dec!(10), None, None)];
        let analysis = analyze_notes(&trades, &SentimentParams::default());

        assert_eq!(analysis.total_notes, 0);
        assert_eq!(analysis.notes_with_content, 0);
        assert_eq!(analysis.avg_note_length, 0.0);
        assert_eq!(analysis.overall_sentiment.overall, 0.0);
        assert_eq!(analysis.overall_sentiment.kind, SentimentKind::Neutral);
        assert!(analysis.sentiment_by_trade.is_empty());
        assert!(analysis.sentiment_trend.is_empty());
        assert_eq!(analysis.sentiment_vs_performance.co_moment, 0.0);
    }

    #[test]
    fn short_notes_count_as_present_but_not_analyzable() {
        let trades = vec![noted("t1", 1, dec!(10), Some("ok"), None)];
        let analysis = analyze_notes(&trades, &SentimentParams::default());

        assert_eq!(analysis.total_notes, 1);
        assert_eq!(analysis.notes_with_content, 0);
    }

    #[test]
    fn lessons_field_alone_is_analyzable() {
        let trades = vec![noted(
            "t1",
            1,
            dec!(50),
            None,
            Some("followed the plan, great patience"),
        )];
        let analysis = analyze_notes(&trades, &SentimentParams::default());

        assert_eq!(analysis.notes_with_content, 1);
        assert_eq!(analysis.sentiment_by_trade.len(), 1);
        assert_eq!(
            analysis.sentiment_by_trade[0].sentiment.kind,
            SentimentKind::Positive
        );
    }

    #[test]
    fn trend_groups_by_entry_day() {
        let trades = vec![
            noted("t1", 1, dec!(100), Some("great breakout, followed plan"), None),
            noted("t2", 1, dec!(-20), Some("late entry, chased the move"), None),
            noted("t3", 2, dec!(30), Some("patient wait for the setup"), None),
        ];
        let analysis = analyze_notes(&trades, &SentimentParams::default());

        assert_eq!(analysis.sentiment_trend.len(), 2);
        let first = &analysis.sentiment_trend[0];
        assert_eq!(first.trade_count, 2);
        assert_eq!(first.win_rate, 50.0);
        assert_eq!(first.pnl, dec!(80));
    }

    #[test]
    fn positive_notes_on_winners_give_positive_co_moment() {
        let trades = vec![
            noted("t1", 1, dec!(100), Some("great trade, perfect plan, strong win"), None),
            noted("t2", 2, dec!(-100), Some("bad mistake, terrible impulsive loss"), None),
        ];
        let analysis = analyze_notes(&trades, &SentimentParams::default());

        assert!(analysis.sentiment_vs_performance.co_moment > 0.0);
        assert!(
            analysis
                .sentiment_vs_performance
                .description
                .contains("Positive sentiment")
        );
    }

    #[test]
    fn repeat_analysis_is_identical() {
        let trades = vec![
            noted("t1", 1, dec!(100), Some("followed the plan, disciplined entry"), None),
            noted("t2", 2, dec!(-50), Some("fomo chase, revenge trade after the loss"), None),
        ];
        let params = SentimentParams::default();
        let first = analyze_notes(&trades, &params);
        let second = analyze_notes(&trades, &params);
        assert_eq!(first, second);
    }
}

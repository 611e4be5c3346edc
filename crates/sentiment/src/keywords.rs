use std::collections::BTreeMap;

use configuration::SentimentParams;
use core_types::ClosedTrade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lexicon::EmotionalState;
use crate::score::{analyze_sentiment, combined_notes, detect_emotions};

/// Keywords reported per analysis, by occurrence count.
pub const MAX_KEYWORDS: usize = 50;

/// One recurring token across the journal's notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    pub word: String,
    /// Total occurrences, counting repeats within one note.
    pub count: usize,
    /// Mean note sentiment at the token's occurrences.
    pub sentiment: f64,
    /// Distinct trades whose notes contain the token.
    pub trades: Vec<String>,
    /// Win rate (percent) across those distinct trades.
    pub win_rate: f64,
}

/// Aggregate outcome statistics for one emotional state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalPattern {
    pub emotion: EmotionalState,
    /// Notes tagged with this state.
    pub frequency: usize,
    pub win_rate: f64,
    pub avg_pnl: Decimal,
    pub description: String,
}

/// Extracts recurring tokens (length > 3) with their sentiment and
/// win-rate context, most frequent first, capped at `MAX_KEYWORDS`.
pub fn extract_keywords(trades: &[ClosedTrade], params: &SentimentParams) -> Vec<KeywordFrequency> {
    struct Accumulator {
        count: usize,
        sentiment_sum: f64,
        trades: Vec<String>,
        wins: usize,
    }

    let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();

    for trade in trades {
        let Some(text) = combined_notes(trade) else {
            continue;
        };
        if text.chars().count() < params.min_note_length {
            continue;
        }

        let sentiment = analyze_sentiment(&text, params.sentiment_threshold);
        let is_win = trade.is_win();

        for word in crate::score::tokenize(&text) {
            let entry = buckets.entry(word).or_insert(Accumulator {
                count: 0,
                sentiment_sum: 0.0,
                trades: Vec::new(),
                wins: 0,
            });
            entry.count += 1;
            entry.sentiment_sum += sentiment.overall;
            if !entry.trades.contains(&trade.id) {
                entry.trades.push(trade.id.clone());
                if is_win {
                    entry.wins += 1;
                }
            }
        }
    }

    let mut keywords: Vec<KeywordFrequency> = buckets
        .into_iter()
        .filter(|(word, acc)| acc.count >= params.keyword_min_frequency && word.chars().count() > 3)
        .map(|(word, acc)| KeywordFrequency {
            word,
            count: acc.count,
            sentiment: acc.sentiment_sum / acc.count as f64,
            win_rate: if acc.trades.is_empty() {
                0.0
            } else {
                acc.wins as f64 / acc.trades.len() as f64 * 100.0
            },
            trades: acc.trades,
        })
        .collect();

    keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Win-rate and P&L statistics per detected emotional state, most
/// frequent first.
pub fn emotional_patterns(trades: &[ClosedTrade], params: &SentimentParams) -> Vec<EmotionalPattern> {
    struct Accumulator {
        count: usize,
        wins: usize,
        total_pnl: Decimal,
    }

    let mut buckets: BTreeMap<usize, Accumulator> = BTreeMap::new();

    for trade in trades {
        let Some(text) = combined_notes(trade) else {
            continue;
        };
        if text.chars().count() < params.min_note_length {
            continue;
        }

        for emotion in detect_emotions(&text) {
            let entry = buckets
                .entry(emotion as usize)
                .or_insert(Accumulator { count: 0, wins: 0, total_pnl: Decimal::ZERO });
            entry.count += 1;
            if trade.is_win() {
                entry.wins += 1;
            }
            entry.total_pnl += trade.pnl;
        }
    }

    let mut patterns: Vec<EmotionalPattern> = EmotionalState::ALL
        .into_iter()
        .filter_map(|emotion| {
            let acc = buckets.get(&(emotion as usize))?;
            let win_fraction = acc.wins as f64 / acc.count as f64;
            Some(EmotionalPattern {
                emotion,
                frequency: acc.count,
                win_rate: win_fraction * 100.0,
                avg_pnl: acc.total_pnl / Decimal::from(acc.count),
                description: emotion_description(emotion, win_fraction),
            })
        })
        .collect();

    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    patterns
}

fn emotion_description(emotion: EmotionalState, win_fraction: f64) -> String {
    let text = match emotion {
        EmotionalState::Confident => {
            if win_fraction > 0.5 {
                "Confidence correlates with success"
            } else {
                "Overconfidence may be an issue"
            }
        }
        EmotionalState::Fearful => "Fear often leads to missed opportunities",
        EmotionalState::Greedy => "Greed typically results in poor outcomes",
        EmotionalState::Disciplined => "Discipline is key to consistent performance",
        EmotionalState::Frustrated => "Frustration can cloud judgment",
        EmotionalState::Calm => "Staying calm improves decision quality",
        EmotionalState::Excited => "Excitement needs to be balanced with discipline",
        EmotionalState::Anxious => "Anxiety often precedes poor decisions",
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
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
    fn keywords_count_occurrences_but_win_rate_uses_distinct_trades() {
        let trades = vec![
            noted("t1", dec!(100), "breakout entry, clean breakout follow-through"),
            noted("t2", dec!(-50), "failed breakout against the trend"),
            noted("t3", dec!(80), "no setup today, stayed flat mostly"),
        ];
        let keywords = extract_keywords(&trades, &SentimentParams::default());

        let breakout = keywords.iter().find(|k| k.word == "breakout").unwrap();
        assert_eq!(breakout.count, 3);
        assert_eq!(breakout.trades, vec!["t1", "t2"]);
        assert_eq!(breakout.win_rate, 50.0);
    }

    #[test]
    fn short_tokens_and_rare_tokens_are_dropped() {
        let trades = vec![
            noted("t1", dec!(10), "took the gap fill trade"),
            noted("t2", dec!(10), "another gap fill setup"),
        ];
        let keywords = extract_keywords(&trades, &SentimentParams::default());

        // "gap" is frequent but too short; "fill" passes both gates.
        assert!(keywords.iter().all(|k| k.word != "gap"));
        assert!(keywords.iter().any(|k| k.word == "fill"));
        // "took" appears once, below the default minimum frequency.
        assert!(keywords.iter().all(|k| k.word != "took"));
    }

    #[test]
    fn emotional_patterns_aggregate_outcomes() {
        let trades = vec![
            noted("t1", dec!(100), "felt confident and followed the plan"),
            noted("t2", dec!(60), "confident entry with conviction"),
            noted("t3", dec!(-40), "was scared and worried the whole time"),
        ];
        let patterns = emotional_patterns(&trades, &SentimentParams::default());

        let confident = patterns.iter().find(|p| p.emotion == EmotionalState::Confident).unwrap();
        assert_eq!(confident.frequency, 2);
        assert_eq!(confident.win_rate, 100.0);
        assert_eq!(confident.avg_pnl, dec!(80));
        assert_eq!(confident.description, "Confidence correlates with success");

        let fearful = patterns.iter().find(|p| p.emotion == EmotionalState::Fearful).unwrap();
        assert_eq!(fearful.frequency, 1);
        assert_eq!(fearful.win_rate, 0.0);
        assert_eq!(fearful.avg_pnl, dec!(-40));
    }

    #[test]
    fn notes_below_minimum_length_are_ignored() {
        let trades = vec![noted("t1", dec!(10), "ok")];
        assert!(extract_keywords(&trades, &SentimentParams::default()).is_empty());
        assert!(emotional_patterns(&trades, &SentimentParams::default()).is_empty());
    }
}

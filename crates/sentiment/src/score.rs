use core_types::ClosedTrade;
use serde::{Deserialize, Serialize};

use crate::lexicon::{ACTION_PHRASES, EmotionalState, NEGATIVE_WORDS, POSITIVE_WORDS};

/// Matches at which a note's confidence saturates at 1.0.
const FULL_CONFIDENCE_MATCHES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentKind {
    Positive,
    Negative,
    Neutral,
    /// Both polarities present, but the net score stays inside the
    /// neutral band.
    Mixed,
}

/// Lexicon score of one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// (positive matches - negative matches) / total matches, in [-1, 1].
    pub overall: f64,
    pub kind: SentimentKind,
    /// min(total matches / 10, 1); 0.5 for a note with no matches at all.
    pub confidence: f64,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
}

impl SentimentScore {
    /// The score of a note with no lexicon matches.
    pub fn neutral() -> Self {
        Self {
            overall: 0.0,
            kind: SentimentKind::Neutral,
            confidence: 0.5,
            positive_words: Vec::new(),
            negative_words: Vec::new(),
        }
    }
}

/// Lowercases, strips non-word characters and drops tokens of length <= 2.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Scores a note against the positive/negative lexicons.
///
/// `threshold` is the neutral band boundary: scores above it classify as
/// positive, below its negation as negative.
pub fn analyze_sentiment(text: &str, threshold: f64) -> SentimentScore {
    let words = tokenize(text);
    let positive_words: Vec<String> = words
        .iter()
        .filter(|w| POSITIVE_WORDS.contains(&w.as_str()))
        .cloned()
        .collect();
    let negative_words: Vec<String> = words
        .iter()
        .filter(|w| NEGATIVE_WORDS.contains(&w.as_str()))
        .cloned()
        .collect();

    let positive = positive_words.len();
    let negative = negative_words.len();
    let total = positive + negative;

    if total == 0 {
        return SentimentScore::neutral();
    }

    let overall = (positive as f64 - negative as f64) / total as f64;
    let kind = if overall > threshold {
        SentimentKind::Positive
    } else if overall < -threshold {
        SentimentKind::Negative
    } else if positive > 0 && negative > 0 {
        SentimentKind::Mixed
    } else {
        SentimentKind::Neutral
    };

    SentimentScore {
        overall,
        kind,
        confidence: (total as f64 / FULL_CONFIDENCE_MATCHES).min(1.0),
        positive_words,
        negative_words,
    }
}

/// Tags a note with every emotional state whose keywords appear in it.
/// A note matching nothing defaults to calm, never to an empty list.
pub fn detect_emotions(text: &str) -> Vec<EmotionalState> {
    let lower = text.to_lowercase();
    let emotions: Vec<EmotionalState> = EmotionalState::ALL
        .into_iter()
        .filter(|state| state.keywords().iter().any(|kw| lower.contains(kw)))
        .collect();

    if emotions.is_empty() {
        vec![EmotionalState::Calm]
    } else {
        emotions
    }
}

/// Whether the note contains forward-looking, actionable language.
pub fn has_actionable_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    ACTION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// A trade's analyzable text: `notes` and `lessons` joined by a blank line
/// when both are present, either alone otherwise, `None` when the trade
/// has neither.
pub fn combined_notes(trade: &ClosedTrade) -> Option<String> {
    let notes = trade.notes.as_deref().unwrap_or("");
    let lessons = trade.lessons.as_deref().unwrap_or("");

    match (notes.is_empty(), lessons.is_empty()) {
        (false, false) => Some(format!("{notes}\n\n{lessons}")),
        (false, true) => Some(notes.to_string()),
        (true, false) => Some(lessons.to_string()),
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_strips_punctuation_and_short_tokens() {
        let tokens = tokenize("Followed my plan -- no FOMO, A+ entry!");
        assert_eq!(tokens, vec!["followed", "plan", "fomo", "entry"]);
    }

    #[test]
    fn unmatched_text_is_neutral_with_half_confidence() {
        let score = analyze_sentiment("entered at the open and closed before lunch", 0.3);
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.kind, SentimentKind::Neutral);
        assert_eq!(score.confidence, 0.5);
        assert!(score.positive_words.is_empty());
        assert!(score.negative_words.is_empty());
    }

    #[test]
    fn positive_note_scores_above_threshold() {
        let score = analyze_sentiment("great breakout, followed the plan, perfect target", 0.3);
        assert_eq!(score.kind, SentimentKind::Positive);
        assert_eq!(score.overall, 1.0);
        assert!(score.confidence > 0.0);
    }

    #[test]
    fn balanced_polarities_classify_as_mixed() {
        // One positive and one negative match: net 0, both present.
        let score = analyze_sentiment("good entry but late exit", 0.3);
        assert_eq!(score.kind, SentimentKind::Mixed);
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.positive_words, vec!["good"]);
        assert_eq!(score.negative_words, vec!["late"]);
    }

    #[test]
    fn confidence_saturates_at_ten_matches() {
        let text = "win win win win win win win win win win win win";
        let score = analyze_sentiment(text, 0.3);
        assert_eq!(score.confidence, 1.0);
    }

    #[test]
    fn unmatched_note_defaults_to_calm() {
        assert_eq!(detect_emotions("entered on the retest"), vec![EmotionalState::Calm]);
    }

    #[test]
    fn emotion_stems_match_word_forms() {
        let emotions = detect_emotions("was frustrated and anxious all morning");
        assert!(emotions.contains(&EmotionalState::Frustrated));
        assert!(emotions.contains(&EmotionalState::Anxious));
    }

    #[test]
    fn actionable_language_is_detected() {
        assert!(has_actionable_content("Next time I will wait for confirmation"));
        assert!(!has_actionable_content("flat day"));
    }

    #[test]
    fn notes_and_lessons_join_with_blank_line() {
        let mut trade = ClosedTrade {
            id: "t1".to_string(),
            symbol: "A".to_string(),
            entry_date: chrono::Utc::now(),
            exit_date: chrono::Utc::now(),
            pnl: rust_decimal::Decimal::ZERO,
            strategy: None,
            notes: Some("solid entry".to_string()),
            lessons: Some("wait for volume".to_string()),
        };
        assert_eq!(
            combined_notes(&trade).as_deref(),
            Some("solid entry\n\nwait for volume")
        );

        trade.lessons = None;
        assert_eq!(combined_notes(&trade).as_deref(), Some("solid entry"));

        trade.notes = None;
        assert_eq!(combined_notes(&trade), None);
    }
}

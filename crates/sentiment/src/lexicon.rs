//! Fixed word lists driving the note analysis.
//!
//! The lexicons are deliberately small and trading-specific: they score
//! journal entries, not arbitrary prose.

use serde::{Deserialize, Serialize};

/// Tokens that count toward a positive note score.
pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "perfect",
    "successful",
    "profit",
    "win",
    "gained",
    "strong",
    "confident",
    "disciplined",
    "patient",
    "followed",
    "plan",
    "executed",
    "opportunity",
    "momentum",
    "breakout",
    "target",
    "reward",
    "achieved",
    "worked",
    "smart",
    "correct",
    "right",
    "better",
    "improved",
    "learning",
    "growth",
];

/// Tokens that count toward a negative note score.
pub const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "loss",
    "lost",
    "failed",
    "mistake",
    "error",
    "wrong",
    "fear",
    "panic",
    "revenge",
    "greed",
    "fomo",
    "impulsive",
    "emotional",
    "stopped",
    "missed",
    "late",
    "early",
    "hesitated",
    "chased",
    "overtraded",
    "poor",
    "weak",
    "difficult",
    "struggle",
    "regret",
    "shouldve",
    "couldve",
];

/// Substrings that mark a note as containing actionable language.
pub const ACTION_PHRASES: &[&str] = &[
    "will",
    "should",
    "must",
    "need to",
    "plan to",
    "going to",
    "next time",
    "remember",
    "focus",
    "improve",
    "work on",
    "avoid",
    "continue",
];

/// The emotional states a note can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    Confident,
    Fearful,
    Greedy,
    Disciplined,
    Frustrated,
    Calm,
    Excited,
    Anxious,
}

impl EmotionalState {
    pub const ALL: [EmotionalState; 8] = [
        EmotionalState::Confident,
        EmotionalState::Fearful,
        EmotionalState::Greedy,
        EmotionalState::Disciplined,
        EmotionalState::Frustrated,
        EmotionalState::Calm,
        EmotionalState::Excited,
        EmotionalState::Anxious,
    ];

    /// Substrings whose presence tags a note with this state. Stems such
    /// as "frustrat" intentionally match several word forms.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            EmotionalState::Confident => {
                &["confident", "sure", "certain", "conviction", "strong belief", "comfortable"]
            }
            EmotionalState::Fearful => {
                &["fear", "scared", "worried", "nervous", "hesitant", "uncertain"]
            }
            EmotionalState::Greedy => &["greed", "more", "bigger", "fomo", "chase", "oversize"],
            EmotionalState::Disciplined => {
                &["plan", "discipline", "rules", "strategy", "followed", "patient", "waited"]
            }
            EmotionalState::Frustrated => {
                &["frustrat", "annoyed", "irritated", "stuck", "struggle"]
            }
            EmotionalState::Calm => &["calm", "patient", "relaxed", "composed", "steady"],
            EmotionalState::Excited => &["excited", "enthusiast", "eager", "pumped", "hyped"],
            EmotionalState::Anxious => &["anxious", "stress", "pressure", "tense", "uneasy"],
        }
    }
}

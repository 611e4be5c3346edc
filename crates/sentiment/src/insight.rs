use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::discipline::DisciplineMetrics;
use crate::keywords::{EmotionalPattern, KeywordFrequency};
use crate::lexicon::EmotionalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Tip,
    Pattern,
    Correlation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Emotional,
    Discipline,
    Strategy,
    Timing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// The measured backing of an insight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightEvidence {
    pub trade_count: usize,
    pub win_rate: Option<f64>,
    pub avg_pnl: Option<Decimal>,
    pub keywords: Vec<String>,
}

/// A rule-derived observation about journaling behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpInsight {
    pub kind: InsightKind,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub evidence: InsightEvidence,
}

/// Evaluates the fixed insight rules against discipline scores, emotional
/// patterns and keyword statistics. Results are ordered by impact tier.
pub fn generate_insights(
    note_count: usize,
    keywords: &[KeywordFrequency],
    emotional_patterns: &[EmotionalPattern],
    discipline: &DisciplineMetrics,
) -> Vec<NlpInsight> {
    let mut insights = Vec::new();

    if discipline.plan_following_score < 30 {
        insights.push(NlpInsight {
            kind: InsightKind::Warning,
            category: InsightCategory::Discipline,
            title: "Low Plan Following".to_string(),
            description: format!(
                "Only {}% of notes mention following a plan. Consider documenting the strategy before each trade.",
                discipline.plan_following_score
            ),
            impact: Impact::High,
            evidence: InsightEvidence {
                trade_count: note_count,
                ..InsightEvidence::default()
            },
        });
    }

    if discipline.emotional_control_score > 70 {
        insights.push(NlpInsight {
            kind: InsightKind::Tip,
            category: InsightCategory::Emotional,
            title: "Strong Emotional Control".to_string(),
            description: format!(
                "{}% of trades show emotional discipline. Keep maintaining this mental edge.",
                discipline.emotional_control_score
            ),
            impact: Impact::High,
            evidence: InsightEvidence {
                trade_count: note_count,
                ..InsightEvidence::default()
            },
        });
    }

    if discipline.negative_patterns * 5 > note_count {
        insights.push(NlpInsight {
            kind: InsightKind::Warning,
            category: InsightCategory::Emotional,
            title: "Emotional Trading Patterns Detected".to_string(),
            description: format!(
                "{} trades show revenge trading, FOMO or impulsive behavior. Focus on emotional control.",
                discipline.negative_patterns
            ),
            impact: Impact::High,
            evidence: InsightEvidence {
                trade_count: discipline.negative_patterns,
                ..InsightEvidence::default()
            },
        });
    }

    let disciplined = emotional_patterns
        .iter()
        .find(|p| p.emotion == EmotionalState::Disciplined);
    if let Some(pattern) = disciplined {
        if pattern.win_rate > 60.0 {
            insights.push(NlpInsight {
                kind: InsightKind::Pattern,
                category: InsightCategory::Discipline,
                title: "Discipline Leads to Success".to_string(),
                description: format!(
                    "Trades with documented discipline have a {:.1}% win rate.",
                    pattern.win_rate
                ),
                impact: Impact::High,
                evidence: InsightEvidence {
                    trade_count: pattern.frequency,
                    win_rate: Some(pattern.win_rate),
                    avg_pnl: Some(pattern.avg_pnl),
                    keywords: Vec::new(),
                },
            });
        }
    }

    let fearful = emotional_patterns
        .iter()
        .find(|p| p.emotion == EmotionalState::Fearful);
    if let Some(pattern) = fearful {
        if pattern.win_rate < 40.0 {
            insights.push(NlpInsight {
                kind: InsightKind::Warning,
                category: InsightCategory::Emotional,
                title: "Fear Impacts Performance".to_string(),
                description: format!(
                    "Trades marked by fear have only a {:.1}% win rate. Work on confidence building.",
                    pattern.win_rate
                ),
                impact: Impact::Medium,
                evidence: InsightEvidence {
                    trade_count: pattern.frequency,
                    win_rate: Some(pattern.win_rate),
                    avg_pnl: None,
                    keywords: Vec::new(),
                },
            });
        }
    }

    if let Some(best) = keywords.iter().find(|k| k.win_rate > 70.0 && k.count >= 3) {
        insights.push(NlpInsight {
            kind: InsightKind::Correlation,
            category: InsightCategory::Strategy,
            title: "High Win Rate Pattern".to_string(),
            description: format!(
                "Trades mentioning \"{}\" have a {:.1}% win rate across {} occurrences.",
                best.word, best.win_rate, best.count
            ),
            impact: Impact::Medium,
            evidence: InsightEvidence {
                trade_count: best.trades.len(),
                win_rate: Some(best.win_rate),
                avg_pnl: None,
                keywords: vec![best.word.clone()],
            },
        });
    }

    if let Some(worst) = keywords.iter().find(|k| k.win_rate < 30.0 && k.count >= 3) {
        insights.push(NlpInsight {
            kind: InsightKind::Warning,
            category: InsightCategory::Strategy,
            title: "Poor Performance Pattern".to_string(),
            description: format!(
                "Trades mentioning \"{}\" have only a {:.1}% win rate. Avoid this pattern.",
                worst.word, worst.win_rate
            ),
            impact: Impact::Medium,
            evidence: InsightEvidence {
                trade_count: worst.trades.len(),
                win_rate: Some(worst.win_rate),
                avg_pnl: None,
                keywords: vec![worst.word.clone()],
            },
        });
    }

    insights.sort_by_key(|i| i.impact);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(word: &str, count: usize, win_rate: f64) -> KeywordFrequency {
        KeywordFrequency {
            word: word.to_string(),
            count,
            sentiment: 0.0,
            trades: (0..count).map(|i| format!("t{i}")).collect(),
            win_rate,
        }
    }

    #[test]
    fn low_plan_following_is_a_high_impact_warning() {
        let discipline = DisciplineMetrics {
            plan_following_score: 10,
            ..DisciplineMetrics::default()
        };
        let insights = generate_insights(20, &[], &[], &discipline);

        assert_eq!(insights[0].impact, Impact::High);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].description.contains("10%"));
    }

    #[test]
    fn keyword_rules_need_three_occurrences() {
        let discipline = DisciplineMetrics {
            plan_following_score: 80,
            ..DisciplineMetrics::default()
        };
        let strong_but_rare = [keyword("retest", 2, 100.0)];
        assert!(generate_insights(10, &strong_but_rare, &[], &discipline).is_empty());

        let strong = [keyword("retest", 3, 100.0)];
        let insights = generate_insights(10, &strong, &[], &discipline);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Correlation);
        assert_eq!(insights[0].evidence.keywords, vec!["retest"]);
    }

    #[test]
    fn insights_are_ordered_by_impact() {
        let discipline = DisciplineMetrics {
            plan_following_score: 10, // high-impact warning
            ..DisciplineMetrics::default()
        };
        let keywords = [keyword("chop", 4, 10.0)]; // medium-impact warning
        let insights = generate_insights(10, &keywords, &[], &discipline);

        assert!(insights.len() >= 2);
        assert_eq!(insights[0].impact, Impact::High);
        assert_eq!(insights.last().unwrap().impact, Impact::Medium);
    }
}

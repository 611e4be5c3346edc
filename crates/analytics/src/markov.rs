use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_types::{ClosedTrade, TradeOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Window length used for pattern mining.
pub const DEFAULT_PATTERN_LENGTH: usize = 3;

/// Sample size at which a prediction reaches full confidence.
const FULL_CONFIDENCE_SAMPLE: f64 = 30.0;

/// Empirical next-outcome probabilities, indexed `[from][to]` in
/// win/loss/breakeven order. Rows of observed source states sum to 1;
/// unobserved states have all-zero rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    probabilities: [[f64; 3]; 3],
}

impl TransitionMatrix {
    /// Counts every adjacent outcome pair and normalizes per source state.
    pub fn from_outcomes(sequence: &[TradeOutcome]) -> Self {
        let mut transitions = [[0usize; 3]; 3];
        let mut from_counts = [0usize; 3];

        for pair in sequence.windows(2) {
            let from = pair[0].index();
            let to = pair[1].index();
            transitions[from][to] += 1;
            from_counts[from] += 1;
        }

        let mut probabilities = [[0.0; 3]; 3];
        for from in 0..3 {
            if from_counts[from] > 0 {
                for to in 0..3 {
                    probabilities[from][to] = transitions[from][to] as f64 / from_counts[from] as f64;
                }
            }
        }

        Self { probabilities }
    }

    pub fn probability(&self, from: TradeOutcome, to: TradeOutcome) -> f64 {
        self.probabilities[from.index()][to.index()]
    }

    /// The full outgoing distribution of one state, in W/L/B order.
    pub fn row(&self, from: TradeOutcome) -> [f64; 3] {
        self.probabilities[from.index()]
    }
}

/// One occurrence of a mined pattern in the trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOccurrence {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_pnl: Decimal,
    pub trades: usize,
}

/// A fixed-length outcome pattern (e.g. "WLW") with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePattern {
    pub pattern: String,
    pub count: usize,
    /// Share of all same-length windows matching this pattern.
    pub probability: f64,
    /// Mean total P&L across the pattern's occurrences.
    pub avg_pnl: Decimal,
    pub occurrences: Vec<PatternOccurrence>,
}

/// The streak still running at the end of the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentOutcomeStreak {
    pub outcome: TradeOutcome,
    pub length: usize,
    pub total_pnl: Decimal,
}

/// The longest observed run of one outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongestOutcomeStreak {
    pub length: usize,
    pub total_pnl: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Three-state streak view: unlike the win/loss streak module, breakeven
/// trades form runs of their own here instead of being skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStreaks {
    pub current: Option<CurrentOutcomeStreak>,
    pub longest_win: LongestOutcomeStreak,
    pub longest_loss: LongestOutcomeStreak,
    pub average_win_streak: f64,
    pub average_loss_streak: f64,
}

/// Next-outcome forecast from the transition matrix row of the latest trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovPrediction {
    pub current_state: TradeOutcome,
    pub next_win_probability: f64,
    pub next_loss_probability: f64,
    pub next_breakeven_probability: f64,
    /// Strongest outgoing probability, discounted on small samples.
    pub confidence: f64,
    pub sample_size: usize,
}

/// Complete outcome-sequence model for one trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetrics {
    pub total_trades: usize,
    pub transition_matrix: TransitionMatrix,
    pub streaks: OutcomeStreaks,
    pub common_patterns: Vec<SequencePattern>,
    pub prediction: Option<MarkovPrediction>,
    /// Probability of a win immediately after a loss.
    pub recovery_rate: f64,
    /// Mean P&L of trades taken right after a loss, minus the overall mean.
    /// Negative values mean losses bleed into the next trade.
    pub consecutive_loss_impact: Decimal,
}

/// Builds the full sequence model over exit-date-sorted trades.
pub fn sequence_metrics(trades: &[ClosedTrade]) -> SequenceMetrics {
    tracing::debug!(trades = trades.len(), "building sequence model");

    let sorted = ClosedTrade::sorted_by_exit(trades);
    let sequence: Vec<TradeOutcome> = sorted.iter().map(|t| t.outcome()).collect();
    let matrix = TransitionMatrix::from_outcomes(&sequence);

    SequenceMetrics {
        total_trades: sorted.len(),
        prediction: predict_next(&sequence, &matrix),
        streaks: outcome_streaks(&sorted),
        common_patterns: find_patterns(&sorted, DEFAULT_PATTERN_LENGTH),
        recovery_rate: recovery_rate(&sequence),
        consecutive_loss_impact: consecutive_loss_impact(&sorted),
        transition_matrix: matrix,
    }
}

/// Mines all fixed-length outcome windows, most frequent first.
pub fn find_patterns(sorted: &[ClosedTrade], pattern_length: usize) -> Vec<SequencePattern> {
    if pattern_length == 0 || sorted.len() < pattern_length {
        return Vec::new();
    }

    let total_windows = sorted.len() - pattern_length + 1;
    let mut buckets: BTreeMap<String, Vec<PatternOccurrence>> = BTreeMap::new();

    for (start, window) in sorted.windows(pattern_length).enumerate() {
        let pattern: String = window.iter().map(|t| t.outcome().state_char()).collect();
        let total_pnl: Decimal = window.iter().map(|t| t.pnl).sum();
        buckets.entry(pattern).or_default().push(PatternOccurrence {
            start_date: sorted[start].exit_date,
            end_date: sorted[start + pattern_length - 1].exit_date,
            total_pnl,
            trades: pattern_length,
        });
    }

    let mut patterns: Vec<SequencePattern> = buckets
        .into_iter()
        .map(|(pattern, occurrences)| {
            let count = occurrences.len();
            let avg_pnl = occurrences
                .iter()
                .map(|o| o.total_pnl)
                .sum::<Decimal>()
                / Decimal::from(count);
            SequencePattern {
                pattern,
                count,
                probability: count as f64 / total_windows as f64,
                avg_pnl,
                occurrences,
            }
        })
        .collect();

    patterns.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.pattern.cmp(&b.pattern))
    });
    patterns
}

/// Forecasts the next outcome from the latest trade's matrix row.
pub fn predict_next(
    sequence: &[TradeOutcome],
    matrix: &TransitionMatrix,
) -> Option<MarkovPrediction> {
    let current_state = *sequence.last()?;
    let [win, loss, breakeven] = matrix.row(current_state);

    let max_probability = win.max(loss).max(breakeven);
    let confidence = max_probability * (sequence.len() as f64 / FULL_CONFIDENCE_SAMPLE).min(1.0);

    Some(MarkovPrediction {
        current_state,
        next_win_probability: win,
        next_loss_probability: loss,
        next_breakeven_probability: breakeven,
        confidence,
        sample_size: sequence.len(),
    })
}

/// Probability that a loss is immediately followed by a win.
pub fn recovery_rate(sequence: &[TradeOutcome]) -> f64 {
    let mut losses = 0usize;
    let mut recoveries = 0usize;

    for pair in sequence.windows(2) {
        if pair[0] == TradeOutcome::Loss {
            losses += 1;
            if pair[1] == TradeOutcome::Win {
                recoveries += 1;
            }
        }
    }

    if losses > 0 {
        recoveries as f64 / losses as f64
    } else {
        0.0
    }
}

/// An in-progress run of identical outcomes.
struct OutcomeRun {
    outcome: TradeOutcome,
    length: usize,
    total_pnl: Decimal,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

/// Three-state run extraction with longest-run bookkeeping.
fn outcome_streaks(sorted: &[ClosedTrade]) -> OutcomeStreaks {
    let mut streaks = OutcomeStreaks::default();
    let mut win_lengths = Vec::new();
    let mut loss_lengths = Vec::new();
    let mut run: Option<OutcomeRun> = None;

    for trade in sorted {
        let outcome = trade.outcome();
        match &mut run {
            Some(current) if current.outcome == outcome => {
                current.length += 1;
                current.total_pnl += trade.pnl;
                current.end_date = trade.exit_date;
            }
            _ => {
                if let Some(finished) = run.take() {
                    close_run(finished, &mut streaks, &mut win_lengths, &mut loss_lengths);
                }
                run = Some(OutcomeRun {
                    outcome,
                    length: 1,
                    total_pnl: trade.pnl,
                    start_date: trade.exit_date,
                    end_date: trade.exit_date,
                });
            }
        }
    }

    if let Some(current) = &run {
        streaks.current = Some(CurrentOutcomeStreak {
            outcome: current.outcome,
            length: current.length,
            total_pnl: current.total_pnl,
        });
    }
    if let Some(finished) = run {
        close_run(finished, &mut streaks, &mut win_lengths, &mut loss_lengths);
    }

    streaks.average_win_streak = average(&win_lengths);
    streaks.average_loss_streak = average(&loss_lengths);
    streaks
}

fn close_run(
    run: OutcomeRun,
    streaks: &mut OutcomeStreaks,
    win_lengths: &mut Vec<usize>,
    loss_lengths: &mut Vec<usize>,
) {
    let longest = match run.outcome {
        TradeOutcome::Win => {
            win_lengths.push(run.length);
            &mut streaks.longest_win
        }
        TradeOutcome::Loss => {
            loss_lengths.push(run.length);
            &mut streaks.longest_loss
        }
        TradeOutcome::Breakeven => return,
    };

    if run.length > longest.length {
        *longest = LongestOutcomeStreak {
            length: run.length,
            total_pnl: run.total_pnl,
            start_date: Some(run.start_date),
            end_date: Some(run.end_date),
        };
    }
}

/// Mean P&L of trades immediately following a loss, minus the overall mean.
fn consecutive_loss_impact(sorted: &[ClosedTrade]) -> Decimal {
    if sorted.is_empty() {
        return Decimal::ZERO;
    }

    let overall_avg =
        sorted.iter().map(|t| t.pnl).sum::<Decimal>() / Decimal::from(sorted.len());

    let post_loss: Vec<Decimal> = sorted
        .windows(2)
        .filter(|pair| pair[0].outcome() == TradeOutcome::Loss)
        .map(|pair| pair[1].pnl)
        .collect();

    if post_loss.is_empty() {
        return Decimal::ZERO;
    }

    let post_loss_avg = post_loss.iter().copied().sum::<Decimal>() / Decimal::from(post_loss.len());
    post_loss_avg - overall_avg
}

fn average(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
}

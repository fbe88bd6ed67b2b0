//! Fatigue Scorer
//!
//! Splits a chronological answer sequence into quartiles and turns the
//! early-versus-late trends into four weighted components:
//!
//! - **cognitive load** - Q4 mean time per question relative to Q1
//! - **decision quality** - accuracy drop from Q1 to Q4
//! - **engagement** - skip rate and rapid-guess share
//! - **consistency** - coefficient of variation of time spent
//!
//! The weighted sum is the 0-100 fatigue index, which is classified into a
//! [`BurnoutLevel`](crate::types::BurnoutLevel) and mapped to a [`Recommendation`](crate::types::Recommendation).

use crate::config::{BurnoutConfig, ComponentWeights, NormalizationParams};
use crate::recommendation::recommend;
use crate::types::{
    round_to, AnswerEvent, BurnoutComponents, BurnoutError, BurnoutResult, ComponentScore,
    QuartileStats, SessionContext, SessionStats, EPSILON, MAX_FATIGUE_INDEX, QUARTILE_COUNT,
};
use crate::validation::ensure_scorable;

/// Splits `events` into four contiguous windows, Q1 earliest.
///
/// Each window gets `n / 4` events; the `n % 4` leftovers go one each to
/// Q1, Q2 and Q3 in that order.
pub fn split_quartiles(events: &[AnswerEvent]) -> [&[AnswerEvent]; QUARTILE_COUNT] {
    let n = events.len();
    let base = n / QUARTILE_COUNT;
    let remainder = n % QUARTILE_COUNT;

    let empty: &[AnswerEvent] = &[];
    let mut windows = [empty; QUARTILE_COUNT];
    let mut start = 0;
    for (i, window) in windows.iter_mut().enumerate() {
        let len = base + usize::from(i < remainder);
        *window = &events[start..start + len];
        start += len;
    }
    windows
}

pub fn quartile_stats(quartile: u8, window: &[AnswerEvent]) -> QuartileStats {
    let skipped = window.iter().filter(|e| e.is_skipped).count();
    let answered: Vec<&AnswerEvent> = window.iter().filter(|e| !e.is_skipped).collect();

    let (avg_time, accuracy) = if answered.is_empty() {
        (0.0, 0.0)
    } else {
        let total: f64 = answered.iter().map(|e| e.time_spent).sum();
        let correct = answered.iter().filter(|e| e.is_correct).count();
        (
            total / answered.len() as f64,
            correct as f64 / answered.len() as f64,
        )
    };

    QuartileStats {
        quartile,
        question_count: window.len(),
        avg_time,
        accuracy,
        skip_rate: ratio(skipped, window.len()),
    }
}

pub struct BurnoutCalculator {
    config: BurnoutConfig,
    weights: ComponentWeights,
}

impl Default for BurnoutCalculator {
    fn default() -> Self {
        Self::new(BurnoutConfig::default())
    }
}

impl BurnoutCalculator {
    pub fn new(config: BurnoutConfig) -> Self {
        let weights = config.weights.normalized();
        Self { config, weights }
    }

    pub fn config(&self) -> &BurnoutConfig {
        &self.config
    }

    /// Validates, then scores.
    pub fn calculate(
        &self,
        events: &[AnswerEvent],
        context: &SessionContext,
    ) -> Result<BurnoutResult, BurnoutError> {
        ensure_scorable(events, &self.config)?;
        Ok(self.score(events, context))
    }

    /// Scores `events` as given; they must already be in answer order.
    ///
    /// Total over any input. Callers are expected to run the validator
    /// first, since short sequences give near-empty quartiles.
    pub fn score(&self, events: &[AnswerEvent], context: &SessionContext) -> BurnoutResult {
        let norm = &self.config.normalization;
        let quartiles: Vec<QuartileStats> = split_quartiles(events)
            .iter()
            .enumerate()
            .map(|(i, window)| quartile_stats(i as u8 + 1, window))
            .collect();
        let first = &quartiles[0];
        let last = &quartiles[QUARTILE_COUNT - 1];

        let answered_times: Vec<f64> = events
            .iter()
            .filter(|e| !e.is_skipped)
            .map(|e| e.time_spent)
            .collect();
        let answered = answered_times.len();
        let correct = events.iter().filter(|e| !e.is_skipped && e.is_correct).count();
        let skipped = events.len() - answered + context.skipped_count;
        let presented = events.len() + context.skipped_count;

        let total_duration: f64 = answered_times.iter().sum();
        let avg_time = if answered > 0 { total_duration / answered as f64 } else { 0.0 };
        let skip_rate = ratio(skipped, presented);
        let rapid_rate = ratio(
            answered_times
                .iter()
                .filter(|t| **t < norm.rapid_response_secs)
                .count(),
            answered,
        );
        let cv = coefficient_of_variation(&answered_times);

        let cognitive_load = self.component(
            cognitive_load_value(first, last, norm),
            self.weights.cognitive_load,
            interpret_cognitive_load(first, last, norm),
        );
        let decision_quality = self.component(
            decision_quality_value(first, last, norm),
            self.weights.decision_quality,
            interpret_decision_quality(first, last, norm),
        );
        let engagement_value = norm.skip_share * unit(skip_rate / norm.skip_rate_ceiling)
            + (1.0 - norm.skip_share) * unit(rapid_rate / norm.rapid_rate_ceiling);
        let engagement = self.component(
            engagement_value,
            self.weights.engagement,
            format!(
                "{} disengagement: {:.0}% of questions skipped, {:.0}% answered in under {:.0}s",
                severity(engagement_value),
                skip_rate * 100.0,
                rapid_rate * 100.0,
                norm.rapid_response_secs
            ),
        );
        let consistency_value = unit(cv / norm.cv_ceiling);
        let consistency = self.component(
            consistency_value,
            self.weights.consistency,
            format!(
                "{} pace variability: time per question varies by {:.0}% around a {:.1}s mean",
                severity(consistency_value),
                cv * 100.0,
                avg_time
            ),
        );

        let components = BurnoutComponents {
            cognitive_load,
            decision_quality,
            engagement,
            consistency,
        };
        let fatigue_index = round_to(
            components.total_contribution().clamp(0.0, MAX_FATIGUE_INDEX),
            2,
        );
        let burnout_level = self.config.thresholds.classify(fatigue_index);
        let recommendations = recommend(burnout_level, fatigue_index, &self.config.policy);

        BurnoutResult {
            burnout_level,
            fatigue_index,
            components,
            recommendations,
            session_stats: SessionStats {
                total_questions: answered,
                total_duration: round_to(total_duration, 2),
                avg_time_per_q: round_to(avg_time, 2),
                accuracy_rate: round_to(ratio(correct, answered), 4),
                skip_rate: round_to(skip_rate, 4),
                quartiles: quartiles
                    .into_iter()
                    .map(|q| QuartileStats {
                        avg_time: round_to(q.avg_time, 2),
                        accuracy: round_to(q.accuracy, 4),
                        skip_rate: round_to(q.skip_rate, 4),
                        ..q
                    })
                    .collect(),
            },
        }
    }

    fn component(&self, value: f64, weight: f64, interpretation: String) -> ComponentScore {
        let value = unit(value);
        ComponentScore {
            value: round_to(value, 4),
            weight: round_to(weight, 4),
            contribution: round_to(value * weight * MAX_FATIGUE_INDEX, 2),
            interpretation,
        }
    }
}

fn cognitive_load_value(first: &QuartileStats, last: &QuartileStats, norm: &NormalizationParams) -> f64 {
    if first.avg_time <= EPSILON || last.avg_time <= EPSILON {
        return 0.0;
    }
    let ratio = last.avg_time / first.avg_time;
    unit((ratio - 1.0) / (norm.time_ratio_ceiling - 1.0))
}

fn decision_quality_value(first: &QuartileStats, last: &QuartileStats, norm: &NormalizationParams) -> f64 {
    if !has_answers(first) || !has_answers(last) {
        return 0.0;
    }
    unit((first.accuracy - last.accuracy) / norm.accuracy_drop_ceiling)
}

fn interpret_cognitive_load(first: &QuartileStats, last: &QuartileStats, norm: &NormalizationParams) -> String {
    if !has_answers(first) || !has_answers(last) {
        return "Not enough answers to compare early and late pace".to_string();
    }
    let value = cognitive_load_value(first, last, norm);
    let change = if first.avg_time > EPSILON {
        (last.avg_time / first.avg_time - 1.0) * 100.0
    } else {
        0.0
    };
    format!(
        "{} cognitive load: {:.1}s per question in Q1 vs {:.1}s in Q4 ({:+.0}%)",
        severity(value),
        first.avg_time,
        last.avg_time,
        change
    )
}

fn interpret_decision_quality(first: &QuartileStats, last: &QuartileStats, norm: &NormalizationParams) -> String {
    if !has_answers(first) || !has_answers(last) {
        return "Not enough answers to compare early and late accuracy".to_string();
    }
    format!(
        "{} decline in decision quality: accuracy {:.0}% in Q1 vs {:.0}% in Q4",
        severity(decision_quality_value(first, last, norm)),
        first.accuracy * 100.0,
        last.accuracy * 100.0
    )
}

fn has_answers(q: &QuartileStats) -> bool {
    q.question_count > 0 && q.skip_rate < 1.0
}

fn severity(value: f64) -> &'static str {
    if value < 0.25 {
        "Low"
    } else if value < 0.6 {
        "Moderate"
    } else {
        "High"
    }
}

/// Population standard deviation over mean; 0 for empty or zero-mean input.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= EPSILON {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

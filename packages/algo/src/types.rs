//! Common Types
//!
//! Input events, intermediate statistics and the scored result shared by
//! the validator, the scorer and the recommendation table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Number of windows the answer sequence is split into
pub const QUARTILE_COUNT: usize = 4;

/// Upper bound of the fatigue index
pub const MAX_FATIGUE_INDEX: f64 = 100.0;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-9;

// ==================== Input ====================

/// One response to one question inside a practice session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    /// Seconds spent on the question (> 0 for scored events)
    pub time_spent: f64,
    /// Whether the selected answer was correct
    pub is_correct: bool,
    /// Skipped questions are filtered out before scoring
    pub is_skipped: bool,
    /// When the answer was submitted; defines sequence order
    pub answered_at: DateTime<Utc>,
}

impl AnswerEvent {
    pub fn new(time_spent: f64, is_correct: bool, answered_at: DateTime<Utc>) -> Self {
        Self {
            time_spent,
            is_correct,
            is_skipped: false,
            answered_at,
        }
    }

    /// Answered, timed and finite
    pub fn is_scorable(&self) -> bool {
        !self.is_skipped && self.time_spent.is_finite() && self.time_spent > 0.0
    }
}

/// Facts about the session that the filtered event list no longer carries
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Presented questions that were skipped or abandoned
    pub skipped_count: usize,
}

impl SessionContext {
    pub fn with_skipped(skipped_count: usize) -> Self {
        Self { skipped_count }
    }
}

// ==================== Classification ====================

/// Discrete burnout classification, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BurnoutLevel {
    None,
    Mild,
    Moderate,
    Severe,
}

impl BurnoutLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BurnoutLevel::None => "NONE",
            BurnoutLevel::Mild => "MILD",
            BurnoutLevel::Moderate => "MODERATE",
            BurnoutLevel::Severe => "SEVERE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(BurnoutLevel::None),
            "MILD" => Some(BurnoutLevel::Mild),
            "MODERATE" => Some(BurnoutLevel::Moderate),
            "SEVERE" => Some(BurnoutLevel::Severe),
            _ => None,
        }
    }
}

impl std::fmt::Display for BurnoutLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the student should do next
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextAction {
    Continue,
    SwitchTopic,
    Rest,
    StopSession,
}

// ==================== Statistics ====================

/// Statistics of one contiguous quarter of the answer sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuartileStats {
    /// 1 (earliest) to 4 (latest)
    pub quartile: u8,
    pub question_count: usize,
    /// Mean seconds per question
    pub avg_time: f64,
    /// Correct / answered, [0, 1]
    pub accuracy: f64,
    /// Skipped / presented, [0, 1]
    pub skip_rate: f64,
}

/// Whole-session summary attached to every result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_questions: usize,
    /// Sum of time spent, seconds
    pub total_duration: f64,
    pub avg_time_per_q: f64,
    pub accuracy_rate: f64,
    pub skip_rate: f64,
    pub quartiles: Vec<QuartileStats>,
}

// ==================== Result ====================

/// One weighted component of the fatigue index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    /// Normalized signal, [0, 1]
    pub value: f64,
    /// Normalized weight, weights sum to 1
    pub weight: f64,
    /// Points added to the fatigue index
    pub contribution: f64,
    /// Human readable description of the signal
    pub interpretation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnoutComponents {
    pub cognitive_load: ComponentScore,
    pub decision_quality: ComponentScore,
    pub engagement: ComponentScore,
    pub consistency: ComponentScore,
}

impl BurnoutComponents {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ComponentScore)> {
        [
            ("cognitiveLoad", &self.cognitive_load),
            ("decisionQuality", &self.decision_quality),
            ("engagement", &self.engagement),
            ("consistency", &self.consistency),
        ]
        .into_iter()
    }

    pub fn total_contribution(&self) -> f64 {
        self.iter().map(|(_, c)| c.contribution).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub should_rest: bool,
    /// Suggested break in minutes, 0 when no rest is needed
    pub rest_duration: u32,
    pub message: String,
    pub next_action: NextAction,
}

/// Scored output for one session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnoutResult {
    pub burnout_level: BurnoutLevel,
    /// [0, 100]
    pub fatigue_index: f64,
    pub components: BurnoutComponents,
    pub recommendations: Recommendation,
    pub session_stats: SessionStats,
}

/// Validator verdict
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: Option<String>,
    pub answered_count: usize,
    pub required_count: usize,
}

// ==================== Errors ====================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BurnoutError {
    #[error("insufficient data: {answered} answered questions, at least {required} required")]
    InsufficientData { answered: usize, required: usize },
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

//! Scoring Configuration
//!
//! Every weight, normalization ceiling, band cutoff and recommendation
//! duration used by the scorer lives here so deployments can tune them
//! without touching the algorithm.

use serde::{Deserialize, Serialize};

use crate::types::{BurnoutLevel, MAX_FATIGUE_INDEX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentWeights {
    pub cognitive_load: f64,
    pub decision_quality: f64,
    pub engagement: f64,
    pub consistency: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            cognitive_load: 0.30,
            decision_quality: 0.30,
            engagement: 0.15,
            consistency: 0.25,
        }
    }
}

impl ComponentWeights {
    /// Re-weights so the four weights sum to 1. Negative weights count as 0;
    /// a non-positive sum falls back to the defaults.
    pub fn normalized(&self) -> Self {
        let raw = [
            self.cognitive_load.max(0.0),
            self.decision_quality.max(0.0),
            self.engagement.max(0.0),
            self.consistency.max(0.0),
        ];
        let sum: f64 = raw.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Self::default().normalized();
        }
        Self {
            cognitive_load: raw[0] / sum,
            decision_quality: raw[1] / sum,
            engagement: raw[2] / sum,
            consistency: raw[3] / sum,
        }
    }
}

/// Ceilings that map raw statistics onto [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationParams {
    /// Q4/Q1 mean-time ratio that saturates cognitive load
    pub time_ratio_ceiling: f64,
    /// Q1-Q4 accuracy drop that saturates decision quality
    pub accuracy_drop_ceiling: f64,
    /// Coefficient of variation that saturates consistency
    pub cv_ceiling: f64,
    /// Skip rate that saturates the skip half of engagement
    pub skip_rate_ceiling: f64,
    /// Answers faster than this count as rapid guesses
    pub rapid_response_secs: f64,
    /// Rapid-guess share that saturates the rapid half of engagement
    pub rapid_rate_ceiling: f64,
    /// Share of engagement driven by skips, the rest by rapid guesses
    pub skip_share: f64,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self {
            time_ratio_ceiling: 2.0,
            accuracy_drop_ceiling: 0.5,
            cv_ceiling: 0.6,
            skip_rate_ceiling: 0.3,
            rapid_response_secs: 3.0,
            rapid_rate_ceiling: 0.3,
            skip_share: 0.6,
        }
    }
}

/// Lower bounds of the MILD, MODERATE and SEVERE bands on the 0-100 index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelThresholds {
    pub mild: f64,
    pub moderate: f64,
    pub severe: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            mild: 25.0,
            moderate: 50.0,
            severe: 75.0,
        }
    }
}

impl LevelThresholds {
    pub fn classify(&self, fatigue_index: f64) -> BurnoutLevel {
        if fatigue_index >= self.severe {
            BurnoutLevel::Severe
        } else if fatigue_index >= self.moderate {
            BurnoutLevel::Moderate
        } else if fatigue_index >= self.mild {
            BurnoutLevel::Mild
        } else {
            BurnoutLevel::None
        }
    }
}

/// Level to recommendation lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPolicy {
    /// MODERATE at or above this index escalates from a topic switch to a rest
    pub moderate_escalation_index: f64,
    pub moderate_switch_rest_minutes: u32,
    pub moderate_rest_minutes: u32,
    pub severe_rest_minutes: u32,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            moderate_escalation_index: 62.5,
            moderate_switch_rest_minutes: 5,
            moderate_rest_minutes: 15,
            severe_rest_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnoutConfig {
    /// Minimum answered-and-timed events before scoring is attempted
    pub min_answers: usize,
    pub weights: ComponentWeights,
    pub normalization: NormalizationParams,
    pub thresholds: LevelThresholds,
    pub policy: RecommendationPolicy,
}

impl Default for BurnoutConfig {
    fn default() -> Self {
        Self {
            min_answers: 10,
            weights: ComponentWeights::default(),
            normalization: NormalizationParams::default(),
            thresholds: LevelThresholds::default(),
            policy: RecommendationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("minAnswers must be at least {min}, got {value}")]
    MinAnswersTooSmall { value: usize, min: usize },
    #[error("thresholds must satisfy 0 < mild < moderate < severe <= 100")]
    ThresholdOrder,
    #[error("{field} must be a positive finite number")]
    NonPositive { field: &'static str },
    #[error("skipShare must be within [0, 1]")]
    SkipShareRange,
}

impl BurnoutConfig {
    /// Four quartiles need at least one event each.
    pub const MIN_SUPPORTED_ANSWERS: usize = 4;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_answers < Self::MIN_SUPPORTED_ANSWERS {
            return Err(ConfigError::MinAnswersTooSmall {
                value: self.min_answers,
                min: Self::MIN_SUPPORTED_ANSWERS,
            });
        }

        let t = &self.thresholds;
        let ordered = t.mild > 0.0
            && t.mild < t.moderate
            && t.moderate < t.severe
            && t.severe <= MAX_FATIGUE_INDEX;
        if !ordered {
            return Err(ConfigError::ThresholdOrder);
        }

        let n = &self.normalization;
        // Ratio ceiling is compared against 1, everything else against 0.
        if !(n.time_ratio_ceiling.is_finite() && n.time_ratio_ceiling > 1.0) {
            return Err(ConfigError::NonPositive { field: "timeRatioCeiling" });
        }
        for (field, value) in [
            ("accuracyDropCeiling", n.accuracy_drop_ceiling),
            ("cvCeiling", n.cv_ceiling),
            ("skipRateCeiling", n.skip_rate_ceiling),
            ("rapidResponseSecs", n.rapid_response_secs),
            ("rapidRateCeiling", n.rapid_rate_ceiling),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if !(0.0..=1.0).contains(&n.skip_share) {
            return Err(ConfigError::SkipShareRange);
        }

        Ok(())
    }
}

//! Recommendation Table
//!
//! Maps a burnout level (and, for MODERATE, the index inside the band) to a
//! suggested next action and break length.

use crate::config::RecommendationPolicy;
use crate::types::{BurnoutLevel, NextAction, Recommendation};

pub fn recommend(
    level: BurnoutLevel,
    fatigue_index: f64,
    policy: &RecommendationPolicy,
) -> Recommendation {
    match level {
        BurnoutLevel::None => Recommendation {
            should_rest: false,
            rest_duration: 0,
            message: "You're focused and steady. Keep going.".to_string(),
            next_action: NextAction::Continue,
        },
        BurnoutLevel::Mild => Recommendation {
            should_rest: false,
            rest_duration: 0,
            message: "Early signs of fatigue. Stretch for a moment, then continue.".to_string(),
            next_action: NextAction::Continue,
        },
        BurnoutLevel::Moderate if fatigue_index >= policy.moderate_escalation_index => {
            Recommendation {
                should_rest: true,
                rest_duration: policy.moderate_rest_minutes,
                message: format!(
                    "Fatigue is building up. Take a {} minute break before the next set.",
                    policy.moderate_rest_minutes
                ),
                next_action: NextAction::Rest,
            }
        }
        BurnoutLevel::Moderate => Recommendation {
            should_rest: true,
            rest_duration: policy.moderate_switch_rest_minutes,
            message: format!(
                "Your pace is slipping. Rest {} minutes and switch to a different subtest.",
                policy.moderate_switch_rest_minutes
            ),
            next_action: NextAction::SwitchTopic,
        },
        BurnoutLevel::Severe => Recommendation {
            should_rest: true,
            rest_duration: policy.severe_rest_minutes,
            message: format!(
                "Strong burnout signals. Stop this session and rest at least {} minutes.",
                policy.severe_rest_minutes
            ),
            next_action: NextAction::StopSession,
        },
    }
}

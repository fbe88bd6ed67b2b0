//! Input Validation
//!
//! Decides whether an answer sequence carries enough data to be scored, and
//! offers the filter the HTTP layer applies to raw answer records.

use crate::config::BurnoutConfig;
use crate::types::{AnswerEvent, BurnoutError, ValidationResult};

/// Events ready for the scorer plus what the filter dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedEvents {
    pub events: Vec<AnswerEvent>,
    pub skipped_count: usize,
    /// Answered records without a usable time
    pub untimed_count: usize,
}

/// Keeps answered, timed events in chronological order.
///
/// The sort is stable, so records sharing a timestamp keep their
/// submission order.
pub fn prepare_events(raw: impl IntoIterator<Item = AnswerEvent>) -> PreparedEvents {
    let mut prepared = PreparedEvents::default();
    for event in raw {
        if event.is_skipped {
            prepared.skipped_count += 1;
        } else if event.is_scorable() {
            prepared.events.push(event);
        } else {
            prepared.untimed_count += 1;
        }
    }
    prepared.events.sort_by_key(|e| e.answered_at);
    prepared
}

pub fn validate_events(events: &[AnswerEvent], config: &BurnoutConfig) -> ValidationResult {
    let answered_count = events.len();
    let required_count = config.min_answers;

    if answered_count < required_count {
        return ValidationResult {
            is_valid: false,
            reason: Some(format!(
                "need at least {required_count} answered questions with recorded time, got {answered_count}"
            )),
            answered_count,
            required_count,
        };
    }

    ValidationResult {
        is_valid: true,
        reason: None,
        answered_count,
        required_count,
    }
}

pub fn ensure_scorable(events: &[AnswerEvent], config: &BurnoutConfig) -> Result<(), BurnoutError> {
    let verdict = validate_events(events, config);
    if verdict.is_valid {
        Ok(())
    } else {
        Err(BurnoutError::InsufficientData {
            answered: verdict.answered_count,
            required: verdict.required_count,
        })
    }
}

//! # utbk-burnout - fatigue scoring for timed practice sessions
//!
//! Pure, deterministic scoring of a UTBK practice session's answer sequence:
//!
//! - **Validation** - rejects sequences too short for quartile statistics
//! - **Scoring** - four weighted components (cognitive load, decision
//!   quality, engagement, consistency) combined into a 0-100 fatigue index
//! - **Classification** - `NONE` / `MILD` / `MODERATE` / `SEVERE`
//! - **Recommendation** - rest flag, break length and next action
//!
//! No I/O and no shared state: fetching and filtering answer records and
//! persisting results belongs to the caller.
//!
//! ## Modules
//!
//! - [`types`] - answer events, statistics and the scored result
//! - [`config`] - weights, normalization ceilings, thresholds, policy table
//! - [`validation`] - minimum-length check and the record filter
//! - [`scorer`] - quartile windows and the component model
//! - [`recommendation`] - level to next-action lookup
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use utbk_burnout::{AnswerEvent, BurnoutCalculator, BurnoutLevel, SessionContext};
//!
//! let start = Utc::now();
//! let events: Vec<AnswerEvent> = (0..12)
//!     .map(|i| AnswerEvent::new(20.0, true, start + Duration::seconds(20 * i)))
//!     .collect();
//!
//! let result = BurnoutCalculator::default()
//!     .calculate(&events, &SessionContext::default())
//!     .unwrap();
//! assert_eq!(result.burnout_level, BurnoutLevel::None);
//! assert!(!result.recommendations.should_rest);
//! ```

pub mod config;
pub mod recommendation;
pub mod scorer;
pub mod types;
pub mod validation;

pub use config::{
    BurnoutConfig, ComponentWeights, ConfigError, LevelThresholds, NormalizationParams,
    RecommendationPolicy,
};
pub use recommendation::recommend;
pub use scorer::{split_quartiles, BurnoutCalculator};
pub use types::*;
pub use validation::{ensure_scorable, prepare_events, validate_events, PreparedEvents};

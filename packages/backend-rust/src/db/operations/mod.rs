pub mod answers;
pub mod burnout_metrics;
pub mod sessions;

pub use answers::{count_answers, list_answers, upsert_answer, AnswerRecord, NewAnswer};
pub use burnout_metrics::{get_metrics, upsert_metrics, StoredBurnoutMetrics};
pub use sessions::{
    create_session, end_session, get_session, list_completed_without_metrics,
    list_session_ids_for_user, list_sessions, mark_unscorable, require_session, NewSession,
    QuizSession, SessionStatus,
};

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use utbk_burnout::BurnoutCalculator;

use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db: Database,
    calculator: Arc<BurnoutCalculator>,
}

impl AppState {
    pub fn new(db: Database, calculator: BurnoutCalculator) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db,
            calculator: Arc::new(calculator),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn calculator(&self) -> Arc<BurnoutCalculator> {
        Arc::clone(&self.calculator)
    }
}

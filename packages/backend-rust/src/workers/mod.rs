mod burnout_batch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use utbk_burnout::BurnoutCalculator;

use crate::config::WorkerConfig;
use crate::db::{Database, DbError};

pub use burnout_batch::{score_pending_sessions, SESSIONS_PER_CYCLE};

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    db: Database,
    calculator: Arc<BurnoutCalculator>,
    config: WorkerConfig,
    running: AtomicBool,
}

impl WorkerManager {
    pub async fn new(
        db: Database,
        calculator: Arc<BurnoutCalculator>,
        config: WorkerConfig,
    ) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            db,
            calculator,
            config,
            running: AtomicBool::new(false),
        })
    }

    pub async fn start(&self) -> Result<(), WorkerError> {
        if !self.config.leader {
            info!("WORKER_LEADER not set, skipping worker startup");
            return Ok(());
        }
        if !self.config.burnout_batch_enabled {
            info!("Burnout batch worker disabled");
            return Ok(());
        }

        let scheduler = self.scheduler.lock().await;

        let schedule = self.config.burnout_batch_schedule.clone();
        let db = self.db.clone();
        let calculator = Arc::clone(&self.calculator);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let db = db.clone();
            let calculator = Arc::clone(&calculator);
            let mut rx = shutdown_rx.resubscribe();
            Box::pin(async move {
                tokio::select! {
                    _ = rx.recv() => {},
                    result = score_pending_sessions(&db, &calculator, SESSIONS_PER_CYCLE) => {
                        if let Err(e) = result {
                            error!(error = %e, "Burnout batch worker error");
                        }
                    }
                }
            })
        })?;
        scheduler.add(job).await?;
        info!(schedule = %schedule, "Burnout batch worker scheduled");

        scheduler.start().await?;
        self.running.store(true, Ordering::Relaxed);
        info!("Workers started");
        Ok(())
    }

    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }
        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

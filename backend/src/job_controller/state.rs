//! Shared state for long-running background jobs (CSV verification, bulk
//! generation).
//!
//! Workers never write the jobs map directly: they send `JobUpdate` messages
//! through the channel in `JobsState`, and the single `start_job_updater`
//! task applies them. Handlers that poll job status only take read locks.

pub use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Clonable handle to the job system, injected as actix app data.
#[derive(Clone)]
pub struct JobsState {
    /// Current status per job id; the single source of truth for polling.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    /// Sender used by background workers to report progress.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Builds the shared state plus the receiver that `start_job_updater`
    /// must be given.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(100);
        (
            Self {
                jobs: Arc::new(RwLock::new(HashMap::new())),
                tx,
            },
            rx,
        )
    }

    /// Registers a job as `Pending` before its worker starts.
    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }
}

/// A status change for one job, sent by its worker.
#[derive(Debug)]
pub struct JobUpdate {
    pub job_id: String,
    pub status: JobStatus,
}

/// Applies incoming updates to the jobs map. Spawned once at startup and
/// runs until every sender is dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}

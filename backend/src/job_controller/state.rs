//! Tracks the state of long-running background jobs.
//!
//! The revision pipeline and the batch file generator both run outside the
//! request/response cycle. Handlers schedule a job, get back a job id and
//! let the client poll `GET /api/jobs/{job_id}` for status.
//!
//! Components:
//! - `JobsState`: clonable, thread-safe map of job id to `JobStatus`,
//!   injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: message sent by background workers to the central updater.
//! - `start_job_updater`: long-running task that drains the MPSC channel and
//!   writes updates into the shared map.
//!
//! Cancellation is cooperative: every job gets an `AtomicBool` flag that the
//! worker checks between units of work (recipients or revision steps).

use common::jobs::JobStatus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Single source of truth for job statuses. Concurrent reads come from
    /// the status endpoint, exclusive writes from the updater task.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Cooperative cancellation flags, one per registered job.
    pub cancel_flags: Arc<RwLock<HashMap<String, Arc<AtomicBool>>>>,

    /// Sender used by background workers to push status changes without
    /// needing direct write access to the map.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        JobUpdate {
            job_id: job_id.into(),
            status,
        }
    }
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            cancel_flags: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    /// Register a new job as `Pending` and hand out its cancellation flag.
    pub async fn register(&self, job_id: &str) -> Arc<AtomicBool> {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
        let flag = Arc::new(AtomicBool::new(false));
        self.cancel_flags
            .write()
            .await
            .insert(job_id.to_string(), flag.clone());
        flag
    }

    /// Request cancellation of a job. Returns false for unknown job ids.
    pub async fn request_cancel(&self, job_id: &str) -> bool {
        match self.cancel_flags.read().await.get(job_id) {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Record a terminal status. Goes through the same channel as progress
    /// updates so a queued `InProgress` can never overwrite the terminal
    /// state after the fact.
    pub async fn finish(&self, job_id: &str, status: JobStatus) {
        let _ = self.tx.send(JobUpdate::new(job_id, status)).await;
        self.cancel_flags.write().await.remove(job_id);
    }
}

/// Central job state updater task; spawn once from `main.rs`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id.clone(), update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::jobs::JobProgress;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    /// Poll the map until `job_id` reaches a status matching `pred`; the
    /// updater keeps a `JobsState` clone (and thus a sender) alive, so the
    /// channel never closes and the updater task never exits on its own.
    async fn wait_for_status(
        state: &JobsState,
        job_id: &str,
        pred: impl Fn(&JobStatus) -> bool,
    ) -> bool {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if state.jobs.read().await.get(job_id).is_some_and(&pred) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test]
    async fn register_and_cancel() {
        let (tx, _rx) = mpsc::channel(4);
        let state = JobsState::new(tx);
        let flag = state.register("job-1").await;
        assert!(matches!(
            state.jobs.read().await.get("job-1"),
            Some(JobStatus::Pending)
        ));
        assert!(!flag.load(Ordering::Relaxed));

        assert!(state.request_cancel("job-1").await);
        assert!(flag.load(Ordering::Relaxed));
        assert!(!state.request_cancel("missing").await);
    }

    #[tokio::test]
    async fn updater_writes_incoming_statuses() {
        let (tx, rx) = mpsc::channel(4);
        let state = JobsState::new(tx.clone());
        tokio::spawn(start_job_updater(state.clone(), rx));

        tx.send(JobUpdate::new("job-2", JobStatus::Completed("ok".into())))
            .await
            .unwrap();

        assert!(
            wait_for_status(&state, "job-2", |s| matches!(s, JobStatus::Completed(_))).await,
            "updater never applied the queued status"
        );
    }

    #[tokio::test]
    async fn terminal_status_is_not_clobbered_by_queued_progress() {
        let (tx, rx) = mpsc::channel(8);
        let state = JobsState::new(tx.clone());
        state.register("job-3").await;

        // Queue a progress update, then finish, then let the updater drain.
        // Because finish goes through the same channel, the terminal status
        // must land last.
        tx.send(JobUpdate::new(
            "job-3",
            JobStatus::InProgress(JobProgress::default()),
        ))
        .await
        .unwrap();
        state
            .finish("job-3", JobStatus::Completed("ok".into()))
            .await;
        tokio::spawn(start_job_updater(state.clone(), rx));

        assert!(
            wait_for_status(&state, "job-3", |s| matches!(s, JobStatus::Completed(_))).await,
            "job never reached its terminal status"
        );
        // And it stays terminal once the queue has drained.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(
            state.jobs.read().await.get("job-3"),
            Some(JobStatus::Completed(_))
        ));
        assert!(state.cancel_flags.read().await.get("job-3").is_none());
    }
}

use serde::{Deserialize, Serialize};

/// Lifecycle of a background job as exposed by the status endpoints.
///
/// `Completed` carries a JSON payload describing the outcome (revision step
/// summary, generation summary) so pollers get the result without a second
/// round trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(JobProgress),
    Completed(String),
    Failed(String),
}

/// Incremental progress of a revision or batch-generation job.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobProgress {
    /// Number of work units in the run (recipients or revision steps).
    pub total: usize,
    /// Units finished so far, in declared order.
    pub completed: usize,
    /// Name of the unit currently being processed (recipient name or
    /// revision step title). Empty once the run is over.
    pub current: String,
    pub phase: JobPhase,
    /// Accumulated per-unit failure messages; the run keeps going.
    pub errors: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    #[default]
    Preparing,
    Generating,
    Revising,
    Completed,
    Error,
    Cancelled,
}

/// Per-step state of the feedback revision pipeline, serialized into the
/// `Completed` payload of a revision job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionStepState {
    Pending,
    Processing,
    Completed,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevisionStepReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub state: RevisionStepState,
    /// Human-readable outcome, e.g. "3개 수정사항 적용 완료".
    pub result: Option<String>,
}

//! Error types shared across mathdrill crates.
//!
//! Store errors are defined here rather than in `mathdrill-store` so that the
//! session layer can classify persistence failures without string matching.

use thiserror::Error;

/// Failures while producing a task batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// No draw satisfied the constraints within the attempt budget.
    #[error("constraints unsatisfiable: no valid task after {attempts} attempts")]
    Unsatisfiable { attempts: usize },

    /// Table mode was asked to generate with no base selected.
    #[error("at least one multiplication table must be selected")]
    EmptySelection,
}

/// Errors that can occur when talking to a result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend (filesystem, database, network) failed.
    #[error("storage failure: {0}")]
    Backend(String),

    /// A record could not be encoded or decoded.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// The admin secret was missing or wrong.
    #[error("unauthorized: wrong admin password")]
    Unauthorized,

    /// An unknown mode was requested.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// The remote service answered with an unexpected status.
    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
}

impl StoreError {
    /// Returns `true` if re-invoking the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Backend(_) => true,
            StoreError::Service { status, .. } => *status >= 500,
            StoreError::Serialization(_) | StoreError::Unauthorized | StoreError::InvalidMode(_) => {
                false
            }
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Rejections raised by the session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was saved and must be regenerated before further changes.
    #[error("session is locked; generate new tasks to continue")]
    Locked,

    /// The countdown cannot start because required fields are missing.
    #[error("missing required fields: {}", missing.join(", "))]
    NotReady { missing: Vec<String> },

    /// A countdown or run is already in progress.
    #[error("session already started")]
    AlreadyStarted,

    /// Answers are only accepted while the clock is running.
    #[error("session is not running")]
    NotRunning,

    /// No row is selected for a reveal-one action.
    #[error("select a task first")]
    NoSelection,

    #[error("task index {0} out of range")]
    IndexOutOfRange(usize),

    /// The solution for this task has already been shown.
    #[error("task {0} has already been revealed")]
    AlreadyViewed(String),

    #[error("generate tasks first")]
    NoTasks,

    #[error("participant name is required to save")]
    NameMissing,

    /// Some task is neither answered nor revealed.
    #[error("{unsettled} task(s) still need an answer")]
    Incomplete { unsettled: usize },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Persisting the result failed; in-memory state is untouched.
    #[error("save failed: {0}")]
    Store(#[from] StoreError),
}

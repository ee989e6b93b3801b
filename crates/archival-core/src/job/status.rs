use serde::{Deserialize, Serialize};

use crate::errors::JobError;

/// Estado de un job dentro de una ejecución.
///
/// Transiciones válidas:
/// - `Pending` -> `Running`
/// - `Running` -> `Succeeded` | `Failed` | `TimedOut` | `LaunchFailed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    /// El job runner terminó con código distinto de cero.
    Failed { exit_code: Option<i32> },
    /// Se agotó el timeout por job; distinto de `Failed`.
    TimedOut { after_ms: u64 },
    /// El job runner no pudo arrancar.
    LaunchFailed { reason: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed { .. } => "FAILED",
            JobStatus::TimedOut { .. } => "TIMED_OUT",
            JobStatus::LaunchFailed { .. } => "LAUNCH_FAILED",
        }
    }
}

impl From<&JobError> for JobStatus {
    fn from(error: &JobError) -> Self {
        match error {
            JobError::Invocation { reason } => JobStatus::LaunchFailed { reason: reason.clone() },
            JobError::Failure { exit_code } => JobStatus::Failed { exit_code: *exit_code },
            JobError::TimedOut { after_ms } => JobStatus::TimedOut { after_ms: *after_ms },
        }
    }
}

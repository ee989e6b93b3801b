use std::path::PathBuf;

use archival_domain::JobSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JobStatus;

/// Estado reconstruido de un job (lo que ve el operador en el `RunResult`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub spec: JobSpec,
    pub job_key: String,
    pub status: JobStatus,
    pub log_path: Option<PathBuf>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl JobRecord {
    pub fn pending(spec: JobSpec, job_key: String) -> Self {
        Self { spec,
               job_key,
               status: JobStatus::Pending,
               log_path: None,
               started_at: None,
               finished_at: None,
               duration_ms: None }
    }

    pub fn was_attempted(&self) -> bool {
        !matches!(self.status, JobStatus::Pending)
    }
}

use std::path::PathBuf;

use archival_domain::{JobKind, JobSpec, Night};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RunState;
use crate::job::JobRecord;

/// Veredicto global de una ejecución.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Succeeded,
    /// Sólo fallaron jobs de índice: primario y estadísticas terminaron bien.
    PartialFailure,
    /// Falló el archivado primario o las estadísticas.
    Failed,
    /// La ejecución no llegó a cerrarse (p.ej. el proceso murió a mitad).
    Incomplete,
}

/// Resultado agregado de la orquestación de una noche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub night: Night,
    pub plan_hash: String,
    pub config_path: PathBuf,
    pub rerun_of: Option<Uuid>,
    /// Jobs planificados, en orden.
    pub planned: Vec<JobSpec>,
    /// Jobs intentados, en orden de invocación.
    pub jobs: Vec<JobRecord>,
    pub state: RunState,
    pub verdict: Verdict,
    pub run_fingerprint: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    pub fn invocation_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Succeeded
    }

    pub fn job(&self, kind: JobKind, index_table: Option<&str>) -> Option<&JobRecord> {
        self.jobs.iter().find(|r| r.spec.kind() == kind && r.spec.index_name() == index_table)
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.iter().filter(|r| r.status.is_terminal() && !r.status.is_success())
    }

    /// Índices cuyo job terminó sin éxito, para relanzarlos por separado.
    pub fn failed_index_tables(&self) -> Vec<&str> {
        self.failed_jobs().filter_map(|r| r.spec.index_name()).collect()
    }
}

//! Tipos de evento de una ejecución y estructura `RunEvent`.
//!
//! Rol en el flujo:
//! - Cada ejecución del orquestador emite eventos a un `EventStore`
//!   append-only.
//! - El `RunResult` devuelto al operador se reconstruye siempre por replay de
//!   estos eventos (ver `repo::replay`), de modo que un ledger persistido
//!   permite consultar o relanzar una ejecución más tarde.
use std::path::PathBuf;

use archival_domain::{JobSpec, Night};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::JobError;
use crate::run::{RunState, Verdict};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEventKind {
    /// Primer evento de un `run_id`: fija el plan completo.
    RunInitialized {
        night: Night,
        plan_hash: String,
        config_path: PathBuf,
        jobs: Vec<JobSpec>,
        rerun_of: Option<Uuid>,
    },
    /// Transición de la máquina de estados de la ejecución.
    PhaseEntered { state: RunState },
    /// Un job se entregó al runner. No implica éxito.
    JobStarted { job_index: usize, job_key: String },
    JobFinished {
        job_index: usize,
        job_key: String,
        log_path: Option<PathBuf>,
        duration_ms: u64,
    },
    JobFailed {
        job_index: usize,
        job_key: String,
        error: JobError,
        log_path: Option<PathBuf>,
        duration_ms: u64,
    },
    /// Cierre con veredicto y fingerprint agregado.
    RunCompleted { verdict: Verdict, run_fingerprint: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // orden de append dentro del run
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}

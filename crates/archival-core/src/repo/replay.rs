//! Replay lineal: consume los eventos de una ejecución en orden y reconstruye
//! su `RunResult`. Es la única fuente del resultado que ve el operador, tanto
//! al terminar una ejecución como al releer un ledger persistido.
use uuid::Uuid;

use crate::event::{RunEvent, RunEventKind};
use crate::hashing::job_key;
use crate::job::{JobRecord, JobStatus};
use crate::run::{RunResult, RunState, Verdict};

/// Devuelve `None` si no hay `RunInitialized` para `run_id`.
pub fn replay(run_id: Uuid, events: &[RunEvent]) -> Option<RunResult> {
    let (init, rest) = events.iter()
                             .position(|e| e.run_id == run_id && matches!(e.kind, RunEventKind::RunInitialized { .. }))
                             .map(|pos| (&events[pos], &events[pos + 1..]))?;
    let RunEventKind::RunInitialized { night,
                                       plan_hash,
                                       config_path,
                                       jobs,
                                       rerun_of, } = &init.kind
    else {
        return None;
    };

    let mut slots: Vec<JobRecord> = jobs.iter().map(|j| JobRecord::pending(j.clone(), job_key(j))).collect();
    let mut state = RunState::Pending;
    let mut verdict = None;
    let mut run_fingerprint = None;
    let mut finished_at = None;

    for ev in rest.iter().filter(|e| e.run_id == run_id) {
        match &ev.kind {
            RunEventKind::RunInitialized { .. } => {}
            RunEventKind::PhaseEntered { state: next } => state = *next,
            RunEventKind::JobStarted { job_index, .. } => {
                if let Some(slot) = slots.get_mut(*job_index) {
                    slot.status = JobStatus::Running;
                    slot.started_at = Some(ev.ts);
                }
            }
            RunEventKind::JobFinished { job_index,
                                        log_path,
                                        duration_ms,
                                        .. } => {
                if let Some(slot) = slots.get_mut(*job_index) {
                    slot.status = JobStatus::Succeeded;
                    slot.log_path = log_path.clone();
                    slot.finished_at = Some(ev.ts);
                    slot.duration_ms = Some(*duration_ms);
                }
            }
            RunEventKind::JobFailed { job_index,
                                      error,
                                      log_path,
                                      duration_ms,
                                      .. } => {
                if let Some(slot) = slots.get_mut(*job_index) {
                    slot.status = JobStatus::from(error);
                    slot.log_path = log_path.clone();
                    slot.finished_at = Some(ev.ts);
                    slot.duration_ms = Some(*duration_ms);
                }
            }
            RunEventKind::RunCompleted { verdict: v,
                                         run_fingerprint: fp, } => {
                verdict = Some(*v);
                run_fingerprint = Some(fp.clone());
                finished_at = Some(ev.ts);
            }
        }
    }

    Some(RunResult { run_id,
                     night: night.clone(),
                     plan_hash: plan_hash.clone(),
                     config_path: config_path.clone(),
                     rerun_of: *rerun_of,
                     planned: jobs.clone(),
                     jobs: slots.into_iter().filter(JobRecord::was_attempted).collect(),
                     state,
                     verdict: verdict.unwrap_or(Verdict::Incomplete),
                     run_fingerprint,
                     started_at: init.ts,
                     finished_at })
}

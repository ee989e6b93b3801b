//! Orquestador nocturno: primario -> índices -> estadísticas.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use archival_domain::{IndexTableSet, JobSpec, Night, ResolvedConfig};
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use uuid::Uuid;

use crate::engine::OrchestratorBuilder;
use crate::errors::{JobError, OrchestratorError};
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::hashing::{job_key, run_fingerprint};
use crate::job::{JobRunner, JobStatus};
use crate::repo::{replay, RunPlan};
use crate::run::{RunResult, RunState, Verdict};

/// Opciones de ejecución, fijas para toda la vida del orquestador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Timeout por job; `None` espera indefinidamente.
    pub job_timeout: Option<Duration>,
    /// Jobs de índice simultáneos. 1 reproduce el driver secuencial.
    pub index_parallelism: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { job_timeout: None,
               index_parallelism: crate::constants::DEFAULT_INDEX_PARALLELISM }
    }
}

/// Entradas sin validar de una ejecución, tal como llegan del operador.
#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub night: &'a str,
    pub config_path: &'a Path,
    /// Instantánea del entorno usada para expandir referencias del fichero.
    pub env: &'a HashMap<String, String>,
    pub required_keys: &'a [String],
    pub index_tables: &'a [String],
}

/// Motor de orquestación de una noche.
///
/// Garantiza el orden de fases: el archivado primario termina con éxito antes
/// de que empiece cualquier índice, y las estadísticas sólo arrancan cuando
/// todos los índices han vuelto (con éxito o no). Cada job se entrega al
/// `JobRunner` y su resultado queda en el `EventStore`; el `RunResult` se
/// obtiene por replay.
pub struct NightlyOrchestrator<J, E>
    where J: JobRunner + 'static,
          E: EventStore + Send + 'static
{
    runner: Arc<J>,
    event_store: Arc<Mutex<E>>,
    options: RunOptions,
}

impl<J> NightlyOrchestrator<J, InMemoryEventStore> where J: JobRunner + 'static
{
    /// Crea un builder con store en memoria.
    #[inline]
    pub fn builder(runner: J) -> OrchestratorBuilder<J, InMemoryEventStore> {
        OrchestratorBuilder::new(runner, InMemoryEventStore::default())
    }
}

impl<J, E> NightlyOrchestrator<J, E>
    where J: JobRunner + 'static,
          E: EventStore + Send + 'static
{
    pub fn new_with_store(runner: J, event_store: E, options: RunOptions) -> Self {
        Self { runner: Arc::new(runner),
               event_store: Arc::new(Mutex::new(event_store)),
               options }
    }

    pub fn runner(&self) -> &J {
        &self.runner
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Acceso de lectura al store (p.ej. para listar ejecuciones previas).
    pub fn with_event_store<T>(&self, f: impl FnOnce(&E) -> T) -> T {
        let guard = self.event_store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn events_for(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.with_event_store(|s| s.list(run_id))
    }

    pub fn result_for(&self, run_id: Uuid) -> Option<RunResult> {
        replay(run_id, &self.events_for(run_id))
    }

    /// Ejecuta la noche completa sobre un conjunto de índices ya validado.
    pub async fn run(&self, night: &Night, config: &ResolvedConfig, index_tables: &IndexTableSet) -> Result<RunResult, OrchestratorError> {
        self.run_plan(RunPlan::full(night, config, index_tables)).await
    }

    /// Valida todas las entradas y después ejecuta. Cualquier error de
    /// validación se devuelve antes de lanzar un job o escribir un evento.
    pub async fn run_from_inputs(&self, inputs: RunInputs<'_>) -> Result<RunResult, OrchestratorError> {
        let night = Night::parse(inputs.night)?;
        let index_tables = IndexTableSet::from_names(inputs.index_tables)?;
        let config = ResolvedConfig::load(inputs.config_path, inputs.env, inputs.required_keys)?;
        self.run(&night, &config, &index_tables).await
    }

    /// Relanza sólo lo que falló en `previous` (ver `RunPlan::rerun`).
    pub async fn rerun(&self, previous: &RunResult, config: &ResolvedConfig) -> Result<RunResult, OrchestratorError> {
        self.run_plan(RunPlan::rerun(previous, config)?).await
    }

    /// Ejecuta un plan respetando el orden de fases.
    pub async fn run_plan(&self, plan: RunPlan) -> Result<RunResult, OrchestratorError> {
        let run_id = Uuid::new_v4();
        info!("night {}: inicio de ejecución {} ({} jobs, plan {})",
              plan.night(),
              run_id,
              plan.len(),
              &plan.plan_hash()[..12]);
        self.append(run_id,
                    RunEventKind::RunInitialized { night: plan.night().clone(),
                                                   plan_hash: plan.plan_hash().to_string(),
                                                   config_path: plan.config_path().to_path_buf(),
                                                   jobs: plan.jobs().to_vec(),
                                                   rerun_of: plan.rerun_of() });

        let mut state = RunState::Pending;

        if let Some((job_index, spec)) = plan.primary() {
            state = self.enter(run_id, state, RunState::ArchivingPrimary)?;
            let status = self.execute(run_id, job_index, spec).await;
            if !status.is_success() {
                error!("night {}: el archivado primario terminó en {}; se omiten índices y estadísticas",
                       plan.night(),
                       status.label());
                self.enter(run_id, state, RunState::ArchivingPrimaryFailed)?;
                return self.complete(run_id, &plan, Verdict::Failed);
            }
        }

        state = self.enter(run_id, state, RunState::ArchivingIndexes)?;
        let index_statuses = self.archive_indexes(run_id, plan.index_jobs()).await?;
        let index_failures = index_statuses.iter().filter(|s| !s.is_success()).count();
        if index_failures > 0 {
            warn!("night {}: {} de {} índices fallaron; se calculan estadísticas igualmente",
                  plan.night(),
                  index_failures,
                  index_statuses.len());
        }

        state = self.enter(run_id, state, RunState::ComputingStats)?;
        let stats_ok = match plan.stats() {
            Some((job_index, spec)) => self.execute(run_id, job_index, spec).await.is_success(),
            None => true,
        };

        let (terminal, verdict) = if !stats_ok {
            (RunState::StatsFailed, Verdict::Failed)
        } else if index_failures > 0 {
            (RunState::PartialFailure, Verdict::PartialFailure)
        } else {
            (RunState::Succeeded, Verdict::Succeeded)
        };
        self.enter(run_id, state, terminal)?;
        self.complete(run_id, &plan, verdict)
    }

    async fn execute(&self, run_id: Uuid, job_index: usize, spec: &JobSpec) -> JobStatus {
        execute_job(&*self.runner, &*self.event_store, self.options.job_timeout, run_id, job_index, spec).await
    }

    /// Fase de índices. Con paralelismo 1 es secuencial; si no, las tareas se
    /// lanzan en el orden dado, acotadas por un semáforo, y se esperan todas.
    async fn archive_indexes(&self, run_id: Uuid, jobs: Vec<(usize, JobSpec)>) -> Result<Vec<JobStatus>, OrchestratorError> {
        let parallelism = self.options.index_parallelism.max(1);
        let mut statuses = Vec::with_capacity(jobs.len());
        if parallelism == 1 || jobs.len() <= 1 {
            for (job_index, spec) in &jobs {
                statuses.push(self.execute(run_id, *job_index, spec).await);
            }
            return Ok(statuses);
        }

        debug!("fase de índices con paralelismo {parallelism}");
        let semaphore = Arc::new(Semaphore::new(parallelism));
        let mut handles = Vec::with_capacity(jobs.len());
        for (job_index, spec) in jobs {
            let permit = semaphore.clone()
                                  .acquire_owned()
                                  .await
                                  .map_err(|e| OrchestratorError::Internal(format!("semáforo de índices cerrado: {e}")))?;
            let runner = Arc::clone(&self.runner);
            let store = Arc::clone(&self.event_store);
            let timeout = self.options.job_timeout;
            let task_spec = spec.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                execute_job(&*runner, &*store, timeout, run_id, job_index, &task_spec).await
            });
            handles.push((job_index, spec, handle));
        }

        for (job_index, spec, handle) in handles {
            match handle.await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    error!("{}: la tarea terminó de forma anómala: {e}", spec.label());
                    let error = JobError::invocation(format!("tarea abortada: {e}"));
                    let status = JobStatus::from(&error);
                    self.append(run_id,
                                RunEventKind::JobFailed { job_index,
                                                          job_key: job_key(&spec),
                                                          error,
                                                          log_path: self.runner.log_path(&spec),
                                                          duration_ms: 0 });
                    statuses.push(status);
                }
            }
        }
        Ok(statuses)
    }

    fn enter(&self, run_id: Uuid, from: RunState, to: RunState) -> Result<RunState, OrchestratorError> {
        let next = from.transition(to)?;
        debug!("run {run_id}: {from:?} -> {next:?}");
        self.append(run_id, RunEventKind::PhaseEntered { state: next });
        Ok(next)
    }

    fn complete(&self, run_id: Uuid, plan: &RunPlan, verdict: Verdict) -> Result<RunResult, OrchestratorError> {
        let partial = self.result_for(run_id)
                          .ok_or_else(|| OrchestratorError::Internal(format!("run {run_id} sin RunInitialized")))?;
        let fingerprint = run_fingerprint(plan.plan_hash(), &partial.jobs);
        self.append(run_id,
                    RunEventKind::RunCompleted { verdict,
                                                 run_fingerprint: fingerprint });
        let result = self.result_for(run_id)
                         .ok_or_else(|| OrchestratorError::Internal(format!("run {run_id} sin RunInitialized")))?;
        info!("night {}: ejecución {} terminada con veredicto {:?} ({} jobs invocados)",
              result.night,
              run_id,
              result.verdict,
              result.invocation_count());
        Ok(result)
    }

    fn append(&self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        append_event(&self.event_store, run_id, kind)
    }
}

fn append_event<E: EventStore>(store: &Mutex<E>, run_id: Uuid, kind: RunEventKind) -> RunEvent {
    let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
    guard.append_kind(run_id, kind)
}

/// Entrega un job al runner, aplica el timeout y registra inicio y fin.
async fn execute_job<J, E>(runner: &J,
                           store: &Mutex<E>,
                           timeout: Option<Duration>,
                           run_id: Uuid,
                           job_index: usize,
                           spec: &JobSpec)
                           -> JobStatus
    where J: JobRunner + ?Sized,
          E: EventStore
{
    let key = job_key(spec);
    append_event(store,
                 run_id,
                 RunEventKind::JobStarted { job_index,
                                            job_key: key.clone() });
    info!("night {}: {} iniciado", spec.night(), spec.label());

    let started = Instant::now();
    let submitted = match timeout {
        Some(limit) => match tokio::time::timeout(limit, runner.submit(spec)).await {
            Ok(res) => res,
            Err(_) => Err(JobError::TimedOut { after_ms: limit.as_millis() as u64 }),
        },
        None => runner.submit(spec).await,
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    let (kind, status) = match submitted {
        Ok(outcome) if outcome.is_success() => {
            info!("night {}: {} terminado en {} ms", spec.night(), spec.label(), duration_ms);
            let log_path = outcome.log_path.or_else(|| runner.log_path(spec));
            (RunEventKind::JobFinished { job_index,
                                         job_key: key,
                                         log_path,
                                         duration_ms },
             JobStatus::Succeeded)
        }
        Ok(outcome) => {
            let log_path: Option<PathBuf> = outcome.log_path.or_else(|| runner.log_path(spec));
            let error = JobError::Failure { exit_code: outcome.exit_code };
            warn!("night {}: {} falló ({error}); log: {}",
                  spec.night(),
                  spec.label(),
                  log_path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".into()));
            let status = JobStatus::from(&error);
            (RunEventKind::JobFailed { job_index,
                                       job_key: key,
                                       error,
                                       log_path,
                                       duration_ms },
             status)
        }
        Err(error) => {
            warn!("night {}: {} no completó: {error}", spec.night(), spec.label());
            let status = JobStatus::from(&error);
            (RunEventKind::JobFailed { job_index,
                                       job_key: key,
                                       error,
                                       log_path: runner.log_path(spec),
                                       duration_ms },
             status)
        }
    };
    append_event(store, run_id, kind);
    status
}

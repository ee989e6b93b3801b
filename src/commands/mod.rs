//! Implementación de las subórdenes de la CLI.
//!
//! Cada orden devuelve el código de salida del proceso; los errores se
//! traducen en `main` con `CoreError::exit_code`.
pub mod plan;
pub mod rerun;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};
use std::time::Duration;

use archival_adapters::{DryRunJobRunner, JsonlEventStore, ProcessJobRunner};
use archival_core::{EventStore, InMemoryEventStore, JobError, JobOutcome, JobRunner, NightlyOrchestrator, RunEvent, RunEventKind};
use archival_domain::{JobSpec, Night};
use async_trait::async_trait;
use uuid::Uuid;

use crate::cli::{ExecArgs, RunnerArgs};
use crate::config::AppConfig;
use crate::errors::CoreError;

/// Runner efectivo: proceso real o simulación.
#[derive(Debug)]
pub enum CliRunner {
    Process(ProcessJobRunner),
    DryRun(DryRunJobRunner),
}

#[async_trait]
impl JobRunner for CliRunner {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError> {
        match self {
            CliRunner::Process(r) => r.submit(job).await,
            CliRunner::DryRun(r) => r.submit(job).await,
        }
    }

    fn log_path(&self, job: &JobSpec) -> Option<PathBuf> {
        match self {
            CliRunner::Process(r) => r.log_path(job),
            CliRunner::DryRun(r) => r.log_path(job),
        }
    }
}

/// Store efectivo: ledger JSONL si se configuró uno, memoria en otro caso.
#[derive(Debug)]
pub enum LedgerStore {
    Memory(InMemoryEventStore),
    Jsonl(JsonlEventStore),
}

impl LedgerStore {
    pub fn open(path: Option<&Path>) -> Result<Self, CoreError> {
        Ok(match path {
               Some(p) => LedgerStore::Jsonl(JsonlEventStore::open(p)?),
               None => LedgerStore::Memory(InMemoryEventStore::default()),
           })
    }

    /// Ejecución elegida: la indicada, la última de la noche o la última registrada.
    pub fn select_run(&self, run_id: Option<Uuid>, night: Option<&str>) -> Result<Uuid, CoreError> {
        if let Some(id) = run_id {
            return Ok(id);
        }
        let found = match night {
            Some(n) => self.latest_run_for(&Night::parse(n)?),
            None => self.run_ids().last().copied(),
        };
        found.ok_or_else(|| CoreError::NotFound(format!("no hay ejecuciones registradas{}",
                                                        night.map(|n| format!(" para la noche {n}")).unwrap_or_default())))
    }
}

impl EventStore for LedgerStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        match self {
            LedgerStore::Memory(s) => s.append_kind(run_id, kind),
            LedgerStore::Jsonl(s) => s.append_kind(run_id, kind),
        }
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        match self {
            LedgerStore::Memory(s) => s.list(run_id),
            LedgerStore::Jsonl(s) => s.list(run_id),
        }
    }

    fn run_ids(&self) -> Vec<Uuid> {
        match self {
            LedgerStore::Memory(s) => s.run_ids(),
            LedgerStore::Jsonl(s) => s.run_ids(),
        }
    }
}

/// Runner de proceso con los valores efectivos (flags sobre `AppConfig`).
pub fn process_runner(job: &RunnerArgs, app: &AppConfig) -> ProcessJobRunner {
    let log_dir = job.log_dir.clone().unwrap_or_else(|| app.log_dir.clone());
    let program = job.runner.clone().unwrap_or_else(|| app.runner.clone());
    ProcessJobRunner::new(log_dir).with_program(program, app.runner_args.clone())
}

/// Orquestador con los valores efectivos. Una simulación nunca escribe en
/// el ledger: sus eventos quedan en memoria.
pub fn build_orchestrator(job: &RunnerArgs,
                          exec: &ExecArgs,
                          app: &AppConfig,
                          store: LedgerStore)
                          -> NightlyOrchestrator<CliRunner, LedgerStore> {
    let process = process_runner(job, app);
    let (runner, store) = if exec.dry_run {
        (CliRunner::DryRun(DryRunJobRunner::new(process)), LedgerStore::Memory(InMemoryEventStore::default()))
    } else {
        (CliRunner::Process(process), store)
    };
    let timeout = exec.timeout_secs
                      .map(|s| (s > 0).then(|| Duration::from_secs(s)))
                      .unwrap_or(app.job_timeout);
    NightlyOrchestrator::builder(runner).event_store(store)
                                        .job_timeout(timeout)
                                        .index_parallelism(exec.parallel.unwrap_or(app.index_parallelism))
                                        .build()
}

/// Ledger efectivo: el flag o `ARCHIVAL_LEDGER`.
pub fn ledger_path<'a>(flag: Option<&'a Path>, app: &'a AppConfig) -> Option<&'a Path> {
    flag.or(app.ledger.as_deref())
}

/// Noche indicada o la fecha UTC actual.
pub fn night_or_today(night: Option<&str>) -> String {
    night.map(str::to_string).unwrap_or_else(|| Night::today_utc().to_string())
}

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use archival_core::{JobError, JobOutcome, JobRunner};
use archival_domain::JobSpec;
use async_trait::async_trait;
use log::info;

use crate::ProcessJobRunner;

/// Runner que sólo anuncia el comando que lanzaría y lo da por bueno.
///
/// No crea logs ni procesos. Útil para revisar un plan contra la
/// configuración real antes de la noche.
#[derive(Debug)]
pub struct DryRunJobRunner {
    target: ProcessJobRunner,
    commands: Mutex<Vec<String>>,
}

impl DryRunJobRunner {
    pub fn new(target: ProcessJobRunner) -> Self {
        Self { target,
               commands: Mutex::new(Vec::new()) }
    }

    /// Comandos anunciados hasta ahora, en orden.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl JobRunner for DryRunJobRunner {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError> {
        let line = self.target.command_line(job);
        info!("[dry-run] {line} > {}", self.target.log_dir().join(job.log_file_name()).display());
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).push(line);
        Ok(JobOutcome::exited(0))
    }

    fn log_path(&self, job: &JobSpec) -> Option<PathBuf> {
        self.target.log_path(job)
    }
}

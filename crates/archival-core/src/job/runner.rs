use std::path::PathBuf;

use archival_domain::JobSpec;
use async_trait::async_trait;

use crate::errors::JobError;

/// Resultado de un job que llegó a ejecutarse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// Código de salida; `None` si el proceso terminó por una señal.
    pub exit_code: Option<i32>,
    /// Dónde quedó la salida del job, si el runner la redirige.
    pub log_path: Option<PathBuf>,
}

impl JobOutcome {
    pub fn exited(code: i32) -> Self {
        Self { exit_code: Some(code),
               log_path: None }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capacidad de ejecutar un job externo y esperar a que termine.
///
/// `Err(JobError::Invocation)` significa que el job no llegó a arrancar. Un
/// código distinto de cero se devuelve como `Ok` y lo interpreta el
/// orquestador. Si el futuro se descarta (timeout), la implementación debe
/// liberar el trabajo en curso.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError>;

    /// Ruta del RunLog que usaría `job`, para poder diagnosticar incluso
    /// jobs que no devolvieron resultado (timeout).
    fn log_path(&self, _job: &JobSpec) -> Option<PathBuf> {
        None
    }
}

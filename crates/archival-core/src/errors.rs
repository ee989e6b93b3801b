//! Errores del orquestador y fallos de jobs individuales.

use archival_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::run::RunState;

/// Errores que abortan una ejecución completa (o impiden empezarla).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuración o noche inválidas: no se ha lanzado ningún job.
    #[error("configuración: {0}")]
    Config(#[from] DomainError),
    #[error("no hay jobs que relanzar para la ejecución {0}")]
    NothingToRerun(uuid::Uuid),
    #[error("transición de estado inválida: {from:?} -> {to:?}")]
    InvalidTransition { from: RunState, to: RunState },
    #[error("interno: {0}")]
    Internal(String),
}

/// Fallo de un job concreto. Se registra en el log de eventos; sólo aborta
/// la ejecución cuando afecta al archivado primario.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobError {
    /// El job runner no pudo arrancar (binario ausente, entorno roto, ...).
    #[error("no se pudo lanzar el job runner: {reason}")]
    Invocation { reason: String },
    /// El job runner arrancó pero terminó con código distinto de cero (o por señal si `None`).
    #[error("el job terminó con código {exit_code:?}")]
    Failure { exit_code: Option<i32> },
    #[error("el job superó el timeout de {after_ms} ms")]
    TimedOut { after_ms: u64 },
}

impl JobError {
    pub fn invocation(reason: impl Into<String>) -> Self {
        JobError::Invocation { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_error_serializes_with_tag() {
        let v = serde_json::to_value(JobError::Failure { exit_code: Some(2) }).unwrap();
        assert_eq!(v, serde_json::json!({"type": "failure", "exit_code": 2}));
    }

    #[test]
    fn config_error_wraps_domain() {
        let err: OrchestratorError = DomainError::InvalidNight("x".into()).into();
        assert!(err.to_string().starts_with("configuración: "));
    }
}

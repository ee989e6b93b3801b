use archival_adapters::LedgerError;
use archival_core::OrchestratorError;
use archival_domain::DomainError;
use thiserror::Error;

/// Código de salida para errores de uso o configuración (no se lanzó nada).
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Error serializando la salida: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Código de salida del proceso para este error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Config(_) | CoreError::Domain(_) | CoreError::NotFound(_) => EXIT_USAGE,
            CoreError::Orchestrator(OrchestratorError::Config(_)) => EXIT_USAGE,
            CoreError::Ledger(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_variant_format() {
        let err = CoreError::Internal("algo malo".into());
        assert_eq!(err.to_string(), "Error interno: algo malo");
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_io_variant_from() {
        let io_err = std::io::Error::other("falló IO");
        let err: CoreError = io_err.into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
    }

    #[test]
    fn test_config_errors_are_usage_errors() {
        let err = CoreError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let night: CoreError = OrchestratorError::from(DomainError::InvalidNight("ayer".into())).into();
        assert_eq!(night.exit_code(), EXIT_USAGE);
        assert!(night.to_string().contains("ayer"));
    }
}

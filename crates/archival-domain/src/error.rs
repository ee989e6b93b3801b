use thiserror::Error;

/// Errores de validación del dominio de archivado.
///
/// Todas las variantes representan entradas inválidas detectadas antes de
/// lanzar cualquier job: nada se ha ejecutado cuando se devuelven.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("noche inválida '{0}': se espera YYYYMMDD")]
    InvalidNight(String),

    #[error("tabla de índice inválida: {0}")]
    InvalidIndexTable(String),

    #[error("configuración inválida: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_night_format() {
        let err = DomainError::InvalidNight("1988-11-03".into());
        assert_eq!(err.to_string(), "noche inválida '1988-11-03': se espera YYYYMMDD");
    }

    #[test]
    fn config_format() {
        let err = DomainError::Config("falta SCIENCE_DB_NAME".into());
        assert_eq!(err.to_string(), "configuración inválida: falta SCIENCE_DB_NAME");
    }
}

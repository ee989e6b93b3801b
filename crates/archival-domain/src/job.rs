// job.rs
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DomainError, IndexTableDescriptor, Night};

/// Tipo de job que acepta el job runner externo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Poblado de la tabla primaria (registro canónico por alerta).
    ScienceArchival,
    /// Derivación de una tabla de índice a partir de las filas de la noche.
    IndexArchival,
    /// Estadísticas agregadas sobre las tablas ya pobladas.
    Stats,
}

impl JobKind {
    /// Token tal como lo recibe el job runner (`fink start <token>`).
    pub fn token(&self) -> &'static str {
        match self {
            JobKind::ScienceArchival => "science_archival",
            JobKind::IndexArchival => "index_archival",
            JobKind::Stats => "stats",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Especificación de una invocación al job runner.
///
/// La construye el orquestador para cada paso de la noche; sólo
/// `IndexArchival` lleva tabla de índice, y al deserializar se exige.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobSpec")]
pub struct JobSpec {
    kind: JobKind,
    night: Night,
    index_table: Option<IndexTableDescriptor>,
    config_path: PathBuf,
}

impl JobSpec {
    pub fn science_archival(night: Night, config_path: impl Into<PathBuf>) -> Self {
        Self { kind: JobKind::ScienceArchival,
               night,
               index_table: None,
               config_path: config_path.into() }
    }

    pub fn index_archival(night: Night, index_table: IndexTableDescriptor, config_path: impl Into<PathBuf>) -> Self {
        Self { kind: JobKind::IndexArchival,
               night,
               index_table: Some(index_table),
               config_path: config_path.into() }
    }

    pub fn stats(night: Night, config_path: impl Into<PathBuf>) -> Self {
        Self { kind: JobKind::Stats,
               night,
               index_table: None,
               config_path: config_path.into() }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn night(&self) -> &Night {
        &self.night
    }

    pub fn index_table(&self) -> Option<&IndexTableDescriptor> {
        self.index_table.as_ref()
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_table.as_ref().map(|t| t.name())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Mismo job (tipo, noche, índice) con otro fichero de configuración.
    pub fn with_config_path(&self, config_path: impl Into<PathBuf>) -> Self {
        Self { config_path: config_path.into(),
               ..self.clone() }
    }

    /// Nombre del RunLog: `<kind>[_<index>]_<night>.log`.
    ///
    /// Es determinista, así que relanzar la misma noche reutiliza el nombre.
    pub fn log_file_name(&self) -> String {
        match &self.index_table {
            Some(t) => format!("{}_{}_{}.log", self.kind.token(), t.name(), self.night),
            None => format!("{}_{}.log", self.kind.token(), self.night),
        }
    }

    /// Etiqueta corta para logs y salida de consola.
    pub fn label(&self) -> String {
        match &self.index_table {
            Some(t) => format!("{}[{}]", self.kind.token(), t.name()),
            None => self.kind.token().to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawJobSpec {
    kind: JobKind,
    night: Night,
    index_table: Option<IndexTableDescriptor>,
    config_path: PathBuf,
}

impl TryFrom<RawJobSpec> for JobSpec {
    type Error = DomainError;

    fn try_from(raw: RawJobSpec) -> Result<Self, Self::Error> {
        match (raw.kind, raw.index_table) {
            (JobKind::IndexArchival, Some(t)) => Ok(Self::index_archival(raw.night, t, raw.config_path)),
            (JobKind::ScienceArchival, None) => Ok(Self::science_archival(raw.night, raw.config_path)),
            (JobKind::Stats, None) => Ok(Self::stats(raw.night, raw.config_path)),
            (JobKind::IndexArchival, None) => {
                Err(DomainError::InvalidIndexTable("index_archival sin tabla de índice".into()))
            }
            (kind, Some(t)) => Err(DomainError::InvalidIndexTable(format!("{kind} no admite tabla de índice ({t})"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn night() -> Night {
        Night::parse("19881103").unwrap()
    }

    #[test]
    fn log_names_are_deterministic() {
        let sci = JobSpec::science_archival(night(), "fink.conf");
        assert_eq!(sci.log_file_name(), "science_archival_19881103.log");

        let idx = JobSpec::index_archival(night(), IndexTableDescriptor::new("pixel4096_jd").unwrap(), "fink.conf");
        assert_eq!(idx.log_file_name(), "index_archival_pixel4096_jd_19881103.log");
        assert_eq!(idx.label(), "index_archival[pixel4096_jd]");

        let stats = JobSpec::stats(night(), "fink.conf");
        assert_eq!(stats.log_file_name(), "stats_19881103.log");
        assert_eq!(stats.index_name(), None);

        let moved = idx.with_config_path("/etc/fink.conf");
        assert_eq!(moved.kind(), JobKind::IndexArchival);
        assert_eq!(moved.index_name(), Some("pixel4096_jd"));
        assert_eq!(moved.config_path(), Path::new("/etc/fink.conf"));
    }

    #[test]
    fn deserialize_rejects_index_shape_mismatch() {
        let missing = serde_json::json!({"kind": "index_archival", "night": "19881103", "index_table": null, "config_path": "c"});
        let err = serde_json::from_value::<JobSpec>(missing).unwrap_err();
        assert!(err.to_string().contains("sin tabla de índice"));

        let extra = serde_json::json!({"kind": "stats", "night": "19881103", "index_table": "jd_objectId", "config_path": "c"});
        assert!(serde_json::from_value::<JobSpec>(extra).is_err());

        let ok = serde_json::json!({"kind": "index_archival", "night": "19881103", "index_table": "jd_objectId", "config_path": "c"});
        let spec: JobSpec = serde_json::from_value(ok).unwrap();
        assert_eq!(spec.index_name(), Some("jd_objectId"));
    }

    #[test]
    fn kind_serializes_as_runner_token() {
        assert_eq!(serde_json::to_string(&JobKind::IndexArchival).unwrap(), "\"index_archival\"");
        assert_eq!(JobKind::ScienceArchival.to_string(), "science_archival");
    }
}

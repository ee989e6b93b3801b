//! Configuración de la aplicación.
//!
//! Lee `.env` una sola vez y las variables `ARCHIVAL_*`. El resultado es un
//! valor inmutable que se resuelve antes de empezar una ejecución; los flags
//! de la CLI tienen prioridad sobre él. El fichero de configuración de los
//! jobs (`fink.conf`) es otra capa: ver `archival_domain::ResolvedConfig`.
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use archival_adapters::process_runner::{DEFAULT_BASE_ARGS, DEFAULT_PROGRAM};
use archival_core::constants::DEFAULT_INDEX_PARALLELISM;
use archival_domain::{DomainError, IndexTableSet};
use once_cell::sync::Lazy;

use crate::errors::CoreError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

pub const RUNNER_VAR: &str = "ARCHIVAL_RUNNER";
pub const RUNNER_ARGS_VAR: &str = "ARCHIVAL_RUNNER_ARGS";
pub const LOG_DIR_VAR: &str = "ARCHIVAL_LOG_DIR";
pub const LEDGER_VAR: &str = "ARCHIVAL_LEDGER";
pub const JOB_TIMEOUT_VAR: &str = "ARCHIVAL_JOB_TIMEOUT_SECS";
pub const INDEX_PARALLELISM_VAR: &str = "ARCHIVAL_INDEX_PARALLELISM";
pub const INDEX_TABLES_VAR: &str = "ARCHIVAL_INDEX_TABLES";
pub const INCLUDE_TNS_VAR: &str = "ARCHIVAL_INCLUDE_TNS";
pub const REQUIRED_KEYS_VAR: &str = "ARCHIVAL_REQUIRED_KEYS";

pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Ejecutable del job runner.
    pub runner: PathBuf,
    pub runner_args: Vec<String>,
    pub log_dir: PathBuf,
    pub ledger: Option<PathBuf>,
    pub job_timeout: Option<Duration>,
    pub index_parallelism: usize,
    /// `None` = conjunto de referencia.
    pub index_tables: Option<Vec<String>>,
    pub include_tns: bool,
    /// Claves que deben existir (y no estar vacías) en el fichero de configuración.
    pub required_keys: Vec<String>,
    /// Instantánea del entorno para expandir `$VAR` en el fichero de configuración.
    pub env_snapshot: HashMap<String, String>,
}

impl AppConfig {
    /// Lee `.env` (una vez) y toma una instantánea del entorno del proceso.
    pub fn from_env() -> Result<Self, CoreError> {
        Lazy::force(&DOTENV_LOADED);
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(vars)
    }

    /// Forma pura de `from_env`, a partir de un mapa de variables.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, CoreError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let runner = get(RUNNER_VAR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
        let runner_args = match vars.get(RUNNER_ARGS_VAR) {
            Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
            None => DEFAULT_BASE_ARGS.iter().map(|a| a.to_string()).collect(),
        };
        let log_dir = get(LOG_DIR_VAR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
        let ledger = get(LEDGER_VAR).map(PathBuf::from);
        let job_timeout = match get(JOB_TIMEOUT_VAR) {
            Some(raw) => match parse_number::<u64>(JOB_TIMEOUT_VAR, raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };
        let index_parallelism = match get(INDEX_PARALLELISM_VAR) {
            Some(raw) => parse_number::<usize>(INDEX_PARALLELISM_VAR, raw)?.max(1),
            None => DEFAULT_INDEX_PARALLELISM,
        };
        let index_tables = get(INDEX_TABLES_VAR).map(split_list);
        let include_tns = match get(INCLUDE_TNS_VAR) {
            Some(raw) => parse_bool(INCLUDE_TNS_VAR, raw)?,
            None => false,
        };
        let required_keys = get(REQUIRED_KEYS_VAR).map(split_list).unwrap_or_default();

        Ok(Self { runner,
                  runner_args,
                  log_dir,
                  ledger,
                  job_timeout,
                  index_parallelism,
                  index_tables,
                  include_tns,
                  required_keys,
                  env_snapshot: vars })
    }

    /// Nombres de índices a archivar: los explícitos si los hay; si no, los
    /// configurados o el conjunto de referencia (con `tns_jd` si se pide).
    pub fn index_names(&self, explicit: &[String], with_tns: bool) -> Vec<String> {
        if !explicit.is_empty() {
            return explicit.to_vec();
        }
        match &self.index_tables {
            Some(names) => names.clone(),
            None => IndexTableSet::reference(with_tns || self.include_tns).names()
                                                                           .into_iter()
                                                                           .map(str::to_string)
                                                                           .collect(),
        }
    }

    pub fn index_table_set(&self, explicit: &[String], with_tns: bool) -> Result<IndexTableSet, DomainError> {
        IndexTableSet::from_names(self.index_names(explicit, with_tns))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ' '])
       .map(str::trim)
       .filter(|s| !s.is_empty())
       .map(str::to_string)
       .collect()
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse().map_err(|_| CoreError::Config(format!("{var}: '{raw}' no es un número válido")))
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::Config(format!("{var}: '{raw}' no es un booleano válido"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_match_reference_driver() {
        let cfg = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(cfg.runner, PathBuf::from("fink"));
        assert_eq!(cfg.runner_args, ["start"]);
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
        assert_eq!(cfg.job_timeout, None);
        assert_eq!(cfg.index_parallelism, 1);
        assert_eq!(cfg.index_names(&[], false).len(), 9);
        assert_eq!(cfg.index_names(&[], true).last().map(String::as_str), Some("tns_jd"));
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = AppConfig::from_vars(vars(&[(RUNNER_VAR, "/opt/fink/bin/fink"),
                                              (RUNNER_ARGS_VAR, ""),
                                              (JOB_TIMEOUT_VAR, "3600"),
                                              (INDEX_PARALLELISM_VAR, "0"),
                                              (INDEX_TABLES_VAR, "pixel128_jd, tns_jd"),
                                              (REQUIRED_KEYS_VAR, "SCIENCE_DB_NAME,HBASEIP")])).unwrap();
        assert!(cfg.runner_args.is_empty());
        assert_eq!(cfg.job_timeout, Some(Duration::from_secs(3600)));
        assert_eq!(cfg.index_parallelism, 1);
        assert_eq!(cfg.index_names(&[], true), ["pixel128_jd", "tns_jd"]);
        assert_eq!(cfg.index_names(&["jd_objectId".to_string()], false), ["jd_objectId"]);
        assert_eq!(cfg.required_keys, ["SCIENCE_DB_NAME", "HBASEIP"]);
        assert_eq!(cfg.env_snapshot.get(RUNNER_VAR).map(String::as_str), Some("/opt/fink/bin/fink"));
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let err = AppConfig::from_vars(vars(&[(JOB_TIMEOUT_VAR, "una hora")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        let err = AppConfig::from_vars(vars(&[(INCLUDE_TNS_VAR, "quizá")])).unwrap_err();
        assert!(err.to_string().contains(INCLUDE_TNS_VAR));
    }
}

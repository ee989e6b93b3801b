// Runner de pruebas: resultados guionizados por job y registro de llamadas.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use archival_core::{JobError, JobOutcome, JobRunner};
use archival_domain::{IndexTableSet, JobSpec, Night, ResolvedConfig};
use async_trait::async_trait;

/// Comportamiento de un job concreto (por etiqueta, p.ej. `index_archival[pixel4096_jd]`).
#[derive(Debug, Clone)]
pub enum Script {
    Exit(i32),
    Launch(String),
    /// Duerme y después sale con el código dado.
    Sleep(Duration, i32),
}

#[derive(Debug, Default, Clone)]
pub struct ScriptedRunner {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    trace: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, label: &str, script: Script) -> Self {
        self.set(label, script);
        self
    }

    pub fn set(&self, label: &str, script: Script) {
        self.scripts.lock().unwrap().insert(label.to_string(), script);
    }

    pub fn clear(&self) {
        self.scripts.lock().unwrap().clear();
    }

    /// Trazas `start:<label>` / `end:<label>` en orden de ocurrencia.
    pub fn trace(&self) -> Vec<String> {
        self.trace.lock().unwrap().clone()
    }

    /// Etiquetas en orden de invocación.
    pub fn calls(&self) -> Vec<String> {
        self.trace()
            .into_iter()
            .filter_map(|t| t.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, entry: String) {
        self.trace.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError> {
        let label = job.label();
        self.record(format!("start:{label}"));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.lock().unwrap().get(&label).cloned();
        let res = match script {
            None => Ok(JobOutcome::exited(0)),
            Some(Script::Exit(code)) => Ok(JobOutcome::exited(code)),
            Some(Script::Launch(reason)) => Err(JobError::invocation(reason)),
            Some(Script::Sleep(d, code)) => {
                tokio::time::sleep(d).await;
                Ok(JobOutcome::exited(code))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record(format!("end:{label}"));
        res
    }

    fn log_path(&self, job: &JobSpec) -> Option<PathBuf> {
        Some(PathBuf::from("logs").join(job.log_file_name()))
    }
}

pub fn night() -> Night {
    Night::parse("19881103").unwrap()
}

pub fn config() -> ResolvedConfig {
    ResolvedConfig::parse(PathBuf::from("fink.conf"), "SCIENCE_DB_NAME=ztf\nLOG_LEVEL=INFO", &HashMap::new()).unwrap()
}

pub fn reference_set() -> IndexTableSet {
    IndexTableSet::reference(false)
}

/// Etiquetas esperadas para el plan completo de referencia.
pub fn expected_labels() -> Vec<String> {
    let mut labels = vec!["science_archival".to_string()];
    labels.extend(reference_set().iter().map(|t| format!("index_archival[{}]", t.name())));
    labels.push("stats".to_string());
    labels
}

//! Plan inmutable de una ejecución.
//!
//! Invariante de forma: como mucho un `science_archival` y siempre en la
//! posición 0, los `index_archival` a continuación en el orden dado y un
//! único `stats` al final. Los constructores son la única forma de crear un
//! plan, así que el orquestador puede confiar en esa forma.
use std::path::{Path, PathBuf};

use archival_domain::{IndexTableSet, JobKind, JobSpec, Night, ResolvedConfig};
use uuid::Uuid;

use crate::errors::OrchestratorError;
use crate::hashing::plan_hash;
use crate::run::{RunResult, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    night: Night,
    config_path: PathBuf,
    jobs: Vec<JobSpec>,
    plan_hash: String,
    rerun_of: Option<Uuid>,
}

impl RunPlan {
    /// Plan completo: primario, índices en el orden dado, estadísticas.
    pub fn full(night: &Night, config: &ResolvedConfig, index_tables: &IndexTableSet) -> Self {
        let config_path = config.path().to_path_buf();
        let mut jobs = Vec::with_capacity(index_tables.len() + 2);
        jobs.push(JobSpec::science_archival(night.clone(), &config_path));
        jobs.extend(index_tables.iter()
                                .map(|t| JobSpec::index_archival(night.clone(), t.clone(), &config_path)));
        jobs.push(JobSpec::stats(night.clone(), &config_path));
        Self::from_jobs(night.clone(), config_path, jobs, None)
    }

    /// Plan de relanzamiento a partir de una ejecución previa.
    ///
    /// - Si el primario falló o no llegó a ejecutarse, se repite el plan
    ///   completo (nada de lo derivado es fiable).
    /// - Si no, sólo los índices que no terminaron con éxito, más `stats`.
    ///
    /// Relanzar es seguro porque el almacenamiento hace upsert por clave de
    /// fila; la identidad de cada job es (noche, tipo, índice).
    pub fn rerun(previous: &RunResult, config: &ResolvedConfig) -> Result<Self, OrchestratorError> {
        let config_path = config.path().to_path_buf();
        let night = previous.night.clone();
        let primary_planned = previous.planned.iter().any(|j| j.kind() == JobKind::ScienceArchival);
        let primary_ok = previous.job(JobKind::ScienceArchival, None)
                                 .is_some_and(|r| r.status.is_success());

        let jobs: Vec<JobSpec> = if primary_planned && !primary_ok {
            previous.planned.iter().map(|j| j.with_config_path(&config_path)).collect()
        } else if previous.verdict == Verdict::Succeeded {
            return Err(OrchestratorError::NothingToRerun(previous.run_id));
        } else {
            let mut jobs: Vec<JobSpec> = previous.planned
                                                 .iter()
                                                 .filter(|j| j.kind() == JobKind::IndexArchival)
                                                 .filter(|j| {
                                                     !previous.job(JobKind::IndexArchival, j.index_name())
                                                              .is_some_and(|r| r.status.is_success())
                                                 })
                                                 .map(|j| j.with_config_path(&config_path))
                                                 .collect();
            jobs.push(JobSpec::stats(night.clone(), &config_path));
            jobs
        };
        Ok(Self::from_jobs(night, config_path, jobs, Some(previous.run_id)))
    }

    fn from_jobs(night: Night, config_path: PathBuf, jobs: Vec<JobSpec>, rerun_of: Option<Uuid>) -> Self {
        let plan_hash = plan_hash(&jobs);
        Self { night,
               config_path,
               jobs,
               plan_hash,
               rerun_of }
    }

    pub fn night(&self) -> &Night {
        &self.night
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    pub fn plan_hash(&self) -> &str {
        &self.plan_hash
    }

    pub fn rerun_of(&self) -> Option<Uuid> {
        self.rerun_of
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn primary(&self) -> Option<(usize, &JobSpec)> {
        self.jobs.iter().enumerate().find(|(_, j)| j.kind() == JobKind::ScienceArchival)
    }

    pub fn index_jobs(&self) -> Vec<(usize, JobSpec)> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.kind() == JobKind::IndexArchival)
            .map(|(i, j)| (i, j.clone()))
            .collect()
    }

    pub fn stats(&self) -> Option<(usize, &JobSpec)> {
        self.jobs.iter().enumerate().find(|(_, j)| j.kind() == JobKind::Stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> ResolvedConfig {
        ResolvedConfig::parse(PathBuf::from("fink.conf"), "SCIENCE_DB_NAME=ztf", &HashMap::new()).unwrap()
    }

    #[test]
    fn full_plan_shape() {
        let night = Night::parse("19881103").unwrap();
        let plan = RunPlan::full(&night, &config(), &IndexTableSet::reference(false));
        assert_eq!(plan.len(), 11);
        assert_eq!(plan.primary().map(|(i, _)| i), Some(0));
        assert_eq!(plan.stats().map(|(i, _)| i), Some(10));
        let idx = plan.index_jobs();
        assert_eq!(idx.len(), 9);
        assert_eq!(idx[2].1.index_name(), Some("pixel4096_jd"));
        assert!(plan.jobs().iter().all(|j| j.config_path() == Path::new("fink.conf")));
    }
}

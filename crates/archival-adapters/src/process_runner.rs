//! `JobRunner` que lanza el job runner externo como proceso hijo.
//!
//! Invocación: `<program> <base_args..> <kind> -c <config> --night <night>
//! [--index_table <name>]`, con stdout y stderr redirigidos al RunLog del job.
use std::path::{Path, PathBuf};
use std::process::Stdio;

use archival_core::{JobError, JobOutcome, JobRunner};
use archival_domain::JobSpec;
use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::RunLog;

pub const DEFAULT_PROGRAM: &str = "fink";
pub const DEFAULT_BASE_ARGS: &[&str] = &["start"];

#[derive(Debug, Clone)]
pub struct ProcessJobRunner {
    program: PathBuf,
    base_args: Vec<String>,
    log_dir: PathBuf,
    envs: Vec<(String, String)>,
}

impl ProcessJobRunner {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self { program: PathBuf::from(DEFAULT_PROGRAM),
               base_args: DEFAULT_BASE_ARGS.iter().map(|a| a.to_string()).collect(),
               log_dir: log_dir.into(),
               envs: Vec::new() }
    }

    /// Sustituye el ejecutable y sus argumentos fijos.
    pub fn with_program(mut self, program: impl Into<PathBuf>, base_args: Vec<String>) -> Self {
        self.program = program.into();
        self.base_args = base_args;
        self
    }

    /// Variables extra para el proceso hijo; el resto del entorno se hereda.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn args_for(&self, job: &JobSpec) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push(job.kind().token().to_string());
        args.push("-c".to_string());
        args.push(job.config_path().display().to_string());
        args.push("--night".to_string());
        args.push(job.night().to_string());
        if let Some(name) = job.index_name() {
            args.push("--index_table".to_string());
            args.push(name.to_string());
        }
        args
    }

    /// Línea de comando legible, para logs y `--dry-run`.
    pub fn command_line(&self, job: &JobSpec) -> String {
        let mut line = self.program.display().to_string();
        for arg in self.args_for(job) {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

#[async_trait]
impl JobRunner for ProcessJobRunner {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError> {
        let (log, stdout) =
            RunLog::create(&self.log_dir, job).await
                                              .map_err(|e| JobError::invocation(format!("no se pudo crear el log en {}: {e}", self.log_dir.display())))?;
        let stderr = stdout.try_clone()
                           .map_err(|e| JobError::invocation(format!("no se pudo duplicar {}: {e}", log.path().display())))?;

        debug!("{}: {}", job.label(), self.command_line(job));
        let mut child = Command::new(&self.program).args(self.args_for(job))
                                                   .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                                                   .stdin(Stdio::null())
                                                   .stdout(Stdio::from(stdout))
                                                   .stderr(Stdio::from(stderr))
                                                   .kill_on_drop(true)
                                                   .spawn()
                                                   .map_err(|e| JobError::invocation(format!("{}: {e}", self.program.display())))?;
        let status = child.wait()
                          .await
                          .map_err(|e| JobError::invocation(format!("espera de {} fallida: {e}", self.program.display())))?;

        Ok(JobOutcome { exit_code: status.code(),
                        log_path: Some(log.path().to_path_buf()) })
    }

    fn log_path(&self, job: &JobSpec) -> Option<PathBuf> {
        Some(RunLog::path_for(&self.log_dir, job))
    }
}

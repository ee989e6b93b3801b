//! RunLog: fichero de salida de un job.
//!
//! Un fichero por job, `<dir>/<kind>[_<index>]_<night>.log`. Se trunca al
//! crearlo, así que relanzar la misma noche sobrescribe el log anterior.
use std::io;
use std::path::{Path, PathBuf};

use archival_domain::JobSpec;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn path_for(dir: &Path, job: &JobSpec) -> PathBuf {
        dir.join(job.log_file_name())
    }

    /// Crea (o trunca) el log y escribe una cabecera. Devuelve el fichero
    /// abierto para redirigir stdout/stderr del job.
    pub async fn create(dir: &Path, job: &JobSpec) -> io::Result<(Self, std::fs::File)> {
        tokio::fs::create_dir_all(dir).await?;
        let path = Self::path_for(dir, job);
        let mut file = tokio::fs::File::create(&path).await?;
        let header = format!("# {} night={} config={} started={}\n",
                             job.label(),
                             job.night(),
                             job.config_path().display(),
                             Utc::now().to_rfc3339());
        file.write_all(header.as_bytes()).await?;
        file.flush().await?;
        let file = file.into_std().await;
        Ok((Self { path }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! Ledger JSONL: `EventStore` durable en un fichero append-only.
//!
//! Cada evento se serializa en una línea JSON. Al abrir se recarga todo el
//! fichero en una caché en memoria; las lecturas (`list`, `run_ids`) se sirven
//! desde ella y las escrituras van a la caché y al fichero.
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use archival_core::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use log::{debug, error, warn};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no se pudo abrir el ledger {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("no se pudo leer el ledger {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub struct JsonlEventStore {
    path: PathBuf,
    cache: InMemoryEventStore,
    writer: File,
}

impl JsonlEventStore {
    /// Abre (o crea) el ledger y recarga los eventos existentes. Las líneas
    /// que no se pueden interpretar se descartan con un aviso.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| LedgerError::Open { path: path.clone(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(open_err)?;
        }

        let mut cache = InMemoryEventStore::default();
        let mut loaded = 0usize;
        if path.is_file() {
            let file = File::open(&path).map_err(open_err)?;
            for (lineno, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|source| LedgerError::Read { path: path.clone(), source })?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<RunEvent>(&line) {
                    Ok(event) => {
                        cache.insert_existing(event);
                        loaded += 1;
                    }
                    Err(e) => warn!("ledger {}:{}: evento ilegible descartado: {e}", path.display(), lineno + 1),
                }
            }
        }
        debug!("ledger {}: {loaded} eventos cargados", path.display());

        let writer = OpenOptions::new().create(true).append(true).open(&path).map_err(open_err)?;
        Ok(Self { path, cache, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, event: &RunEvent) -> io::Result<()> {
        let mut line = serde_json::to_string(event).map_err(io::Error::other)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }
}

impl EventStore for JsonlEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let event = self.cache.append_kind(run_id, kind);
        if let Err(e) = self.write_line(&event) {
            error!("ledger {}: no se pudo persistir el evento {} de {run_id}: {e}", self.path.display(), event.seq);
        }
        event
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.cache.list(run_id)
    }

    fn run_ids(&self) -> Vec<Uuid> {
        self.cache.run_ids()
    }
}

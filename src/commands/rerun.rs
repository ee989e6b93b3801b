use archival_core::{replay, EventStore, OrchestratorError};
use archival_domain::ResolvedConfig;
use tracing::{info, warn};

use super::{build_orchestrator, ledger_path, LedgerStore};
use crate::cli::RerunArgs;
use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::report;

/// Orden `rerun`: relanza, sobre el mismo ledger, lo que falló en una
/// ejecución registrada.
pub async fn execute(args: &RerunArgs, app: &AppConfig) -> Result<i32, CoreError> {
    let ledger = ledger_path(args.exec.ledger.as_deref(), app)
        .ok_or_else(|| CoreError::Config("rerun necesita un ledger (--ledger o ARCHIVAL_LEDGER)".into()))?;
    let store = LedgerStore::open(Some(ledger))?;
    let run_id = store.select_run(args.run_id, args.night.as_deref())?;
    let previous = replay(run_id, &store.list(run_id))
        .ok_or_else(|| CoreError::NotFound(format!("la ejecución {run_id} no está en {}", ledger.display())))?;
    let config = ResolvedConfig::load(&args.job.config, &app.env_snapshot, &app.required_keys)?;

    info!(night = %previous.night, previous = %run_id, verdict = ?previous.verdict, "Relanzamiento");
    let orchestrator = build_orchestrator(&args.job, &args.exec, app, store);
    match orchestrator.rerun(&previous, &config).await {
        Ok(result) => report::print(&result, args.exec.json),
        Err(OrchestratorError::NothingToRerun(id)) => {
            warn!("la ejecución {id} terminó con éxito; no hay nada que relanzar");
            Ok(report::EXIT_SUCCESS)
        }
        Err(e) => Err(e.into()),
    }
}

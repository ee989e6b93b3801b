use archival_core::RunInputs;
use tracing::info;

use super::{build_orchestrator, ledger_path, night_or_today, LedgerStore};
use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::report;

/// Orden `run`: valida todo, archiva la noche y muestra el resultado.
pub async fn execute(args: &RunArgs, app: &AppConfig) -> Result<i32, CoreError> {
    let night = night_or_today(args.night.as_deref());
    let index_tables = app.index_names(&args.index.index_tables, args.index.with_tns);
    let ledger = ledger_path(args.exec.ledger.as_deref(), app).filter(|_| !args.exec.dry_run);
    let store = LedgerStore::open(ledger)?;
    let orchestrator = build_orchestrator(&args.job, &args.exec, app, store);

    info!(night = %night,
          config = %args.job.config.display(),
          indexes = index_tables.len(),
          parallel = orchestrator.options().index_parallelism,
          dry_run = args.exec.dry_run,
          "Inicio de la noche");

    let result = orchestrator.run_from_inputs(RunInputs { night: &night,
                                                          config_path: &args.job.config,
                                                          env: &app.env_snapshot,
                                                          required_keys: &app.required_keys,
                                                          index_tables: &index_tables })
                             .await?;
    report::print(&result, args.exec.json)
}

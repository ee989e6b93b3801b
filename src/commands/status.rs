use archival_core::{replay, EventStore};

use super::{ledger_path, LedgerStore};
use crate::cli::StatusArgs;
use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::report;

/// Orden `status`: reconstruye una ejecución desde el ledger. El código de
/// salida es el de su veredicto, así que sirve como comprobación en CI.
pub fn execute(args: &StatusArgs, app: &AppConfig) -> Result<i32, CoreError> {
    let ledger = ledger_path(args.ledger.as_deref(), app)
        .ok_or_else(|| CoreError::Config("status necesita un ledger (--ledger o ARCHIVAL_LEDGER)".into()))?;
    if !ledger.is_file() {
        return Err(CoreError::NotFound(format!("no existe el ledger {}", ledger.display())));
    }
    let store = LedgerStore::open(Some(ledger))?;
    let run_id = store.select_run(args.run_id, args.night.as_deref())?;
    let result = replay(run_id, &store.list(run_id))
        .ok_or_else(|| CoreError::NotFound(format!("la ejecución {run_id} no está en {}", ledger.display())))?;
    report::print(&result, args.json)
}

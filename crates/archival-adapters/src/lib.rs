//! archival-adapters: implementaciones concretas de las capacidades del core.
//!
//! - `ProcessJobRunner`: lanza el job runner externo y redirige su salida al
//!   `RunLog` de cada job.
//! - `DryRunJobRunner`: anuncia los comandos sin ejecutarlos.
//! - `JsonlEventStore`: ledger de eventos durable en JSONL.
pub mod dry_run;
pub mod ledger;
pub mod process_runner;
pub mod run_log;

pub use dry_run::DryRunJobRunner;
pub use ledger::{JsonlEventStore, LedgerError};
pub use process_runner::ProcessJobRunner;
pub use run_log::RunLog;

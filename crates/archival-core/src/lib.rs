//! archival-core: orquestador nocturno de archivado.
//!
//! Ejecuta en orden estricto el archivado primario, los índices y las
//! estadísticas de una noche, delegando cada paso en un `JobRunner`. Todo lo
//! que ocurre queda en un log de eventos append-only del que se reconstruye
//! el `RunResult`.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod job;
pub mod repo;
pub mod run;

pub use engine::{NightlyOrchestrator, OrchestratorBuilder, RunInputs, RunOptions};
pub use errors::{JobError, OrchestratorError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use job::{JobOutcome, JobRecord, JobRunner, JobStatus};
pub use repo::{replay, RunPlan};
pub use run::{RunResult, RunState, Verdict};

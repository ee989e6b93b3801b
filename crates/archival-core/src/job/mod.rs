//! Jobs: la capacidad `JobRunner`, su resultado y el estado de cada job.
//!
//! El orquestador no lanza procesos por sí mismo: entrega cada `JobSpec` a un
//! `JobRunner` (proceso real en los adapters, fake determinista en tests) y
//! traduce el resultado a un `JobStatus` tipado.

mod record;
mod runner;
mod status;

pub use record::JobRecord;
pub use runner::{JobOutcome, JobRunner};
pub use status::JobStatus;

//! Motor de orquestación nocturna.
//!
//! Expone el orquestador, su builder y las opciones de ejecución.

pub mod builder;
pub mod core;

pub use builder::OrchestratorBuilder;
pub use core::{NightlyOrchestrator, RunInputs, RunOptions};

pub use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use crate::run::{RunResult, RunState, Verdict};

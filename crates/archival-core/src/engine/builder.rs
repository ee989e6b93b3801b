//! Builder para `NightlyOrchestrator`.
//!
//! Permite fijar el store de eventos y las opciones de ejecución antes de
//! construir el orquestador:
//!
//! ```ignore
//! let orchestrator = NightlyOrchestrator::builder(runner)
//!     .job_timeout(Duration::from_secs(3600))
//!     .index_parallelism(3)
//!     .build();
//! ```

use std::time::Duration;

use crate::engine::{NightlyOrchestrator, RunOptions};
use crate::event::EventStore;
use crate::job::JobRunner;

#[derive(Debug)]
pub struct OrchestratorBuilder<J: JobRunner + 'static, E: EventStore + Send + 'static> {
    runner: J,
    event_store: E,
    options: RunOptions,
}

impl<J, E> OrchestratorBuilder<J, E>
    where J: JobRunner + 'static,
          E: EventStore + Send + 'static
{
    pub fn new(runner: J, event_store: E) -> Self {
        Self { runner,
               event_store,
               options: RunOptions::default() }
    }

    /// Sustituye el store de eventos (p.ej. por un ledger durable).
    pub fn event_store<E2>(self, event_store: E2) -> OrchestratorBuilder<J, E2>
        where E2: EventStore + Send + 'static
    {
        OrchestratorBuilder { runner: self.runner,
                              event_store,
                              options: self.options }
    }

    pub fn job_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.options.job_timeout = timeout.into();
        self
    }

    /// Número de jobs de índice simultáneos; se ajusta a un mínimo de 1.
    pub fn index_parallelism(mut self, n: usize) -> Self {
        self.options.index_parallelism = n.max(1);
        self
    }

    #[inline]
    pub fn build(self) -> NightlyOrchestrator<J, E> {
        NightlyOrchestrator::new_with_store(self.runner, self.event_store, self.options)
    }
}

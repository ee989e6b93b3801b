//! fink-archival
//!
//! Binario de operador del orquestador nocturno:
//! - `config`: ajustes de la aplicación (`.env` + variables `ARCHIVAL_*`).
//! - `cli` y `commands`: subórdenes `run`, `rerun`, `status` y `plan`.
//! - `report`: salida para el operador y códigos de salida.
//! - `errors` y `logging`: error de nivel superior y arranque de `tracing`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod report;

pub use config::AppConfig;
pub use errors::CoreError;

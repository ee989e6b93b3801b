//! Constantes del orquestador.
//!
//! `ENGINE_VERSION` entra en el cálculo de `plan_hash` y del fingerprint de
//! la ejecución: cambiarla invalida la comparación con ejecuciones previas
//! aunque la noche y los jobs sean los mismos.

/// Versión lógica del orquestador. Mantener estable mientras no haya cambios
/// incompatibles en el orden de fases o en el formato de eventos.
pub const ENGINE_VERSION: &str = "A1.0";

/// Paralelismo por defecto de la fase de índices (secuencial, como el driver
/// de referencia).
pub const DEFAULT_INDEX_PARALLELISM: usize = 1;

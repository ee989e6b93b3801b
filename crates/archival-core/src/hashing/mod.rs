//! Hashing de planes, jobs y ejecuciones.
//!
//! - `job_key`: identidad idempotente de un job, (noche, tipo, índice). Dos
//!   ejecuciones que relanzan el mismo job producen la misma clave.
//! - `plan_hash`: hash de la secuencia ordenada de `job_key`.
//! - `run_fingerprint`: hash del plan más el estado final de cada job.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_str, hash_value};

use archival_domain::JobSpec;
use serde_json::json;

use crate::constants::ENGINE_VERSION;
use crate::job::JobRecord;

pub fn job_key(spec: &JobSpec) -> String {
    hash_value(&json!({
        "night": spec.night().as_str(),
        "kind": spec.kind().token(),
        "index_table": spec.index_name(),
    }))
}

pub fn plan_hash(jobs: &[JobSpec]) -> String {
    let keys: Vec<String> = jobs.iter().map(job_key).collect();
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "jobs": keys,
    }))
}

pub fn run_fingerprint(plan_hash: &str, records: &[JobRecord]) -> String {
    let statuses: Vec<serde_json::Value> = records.iter()
                                                  .map(|r| json!({ "job_key": r.job_key, "status": r.status.label() }))
                                                  .collect();
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "plan_hash": plan_hash,
        "jobs": statuses,
    }))
}

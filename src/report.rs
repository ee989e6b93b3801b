//! Presentación de un `RunResult` al operador y traducción a código de salida.
use std::fmt::Write;

use archival_core::{JobStatus, RunResult, Verdict};

use crate::errors::CoreError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 3;

/// 0 éxito, 3 fallo parcial (sólo índices), 1 fallo o ejecución incompleta.
pub fn exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Succeeded => EXIT_SUCCESS,
        Verdict::PartialFailure => EXIT_PARTIAL,
        Verdict::Failed | Verdict::Incomplete => crate::errors::EXIT_FAILURE,
    }
}

pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out,
                     "noche {}  ejecución {}  veredicto {:?}  estado {:?}",
                     result.night, result.run_id, result.verdict, result.state);
    let _ = writeln!(out, "inicio {} UTC  plan {}", result.started_at.format("%Y-%m-%d %H:%M:%S"), result.plan_hash);
    if let Some(previous) = result.rerun_of {
        let _ = writeln!(out, "relanzamiento de {previous}");
    }
    for job in &result.jobs {
        let duration = job.duration_ms.map(|ms| format!("{ms} ms")).unwrap_or_else(|| "-".into());
        let log = job.log_path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".into());
        let _ = writeln!(out, "  {:<16} {:<36} {:>10}  {}", status_cell(&job.status), job.spec.label(), duration, log);
    }
    let skipped = result.planned.len() - result.jobs.len().min(result.planned.len());
    if skipped > 0 {
        let _ = writeln!(out, "  ({skipped} jobs no lanzados)");
    }
    let failed = result.failed_index_tables();
    if !failed.is_empty() {
        let _ = writeln!(out, "índices fallidos: {}", failed.join(", "));
        let _ = writeln!(out, "relanzar con: fink-archival rerun --run-id {} -c {} --ledger <FICHERO>",
                         result.run_id,
                         result.config_path.display());
    }
    out
}

fn status_cell(status: &JobStatus) -> String {
    match status {
        JobStatus::Failed { exit_code: Some(code) } => format!("FAILED({code})"),
        JobStatus::Failed { exit_code: None } => "FAILED(señal)".to_string(),
        JobStatus::TimedOut { after_ms } => format!("TIMED_OUT({}s)", after_ms / 1000),
        other => other.label().to_string(),
    }
}

/// Imprime el resultado en stdout (texto o JSON) y devuelve el código de salida.
pub fn print(result: &RunResult, json: bool) -> Result<i32, CoreError> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render_text(result));
    }
    Ok(exit_code(result.verdict))
}

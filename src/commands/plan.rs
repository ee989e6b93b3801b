use std::path::PathBuf;

use archival_core::{JobRunner, RunPlan};
use archival_domain::{Night, ResolvedConfig};
use serde::Serialize;

use super::{night_or_today, process_runner};
use crate::cli::PlanArgs;
use crate::config::AppConfig;
use crate::errors::CoreError;

#[derive(Debug, Serialize)]
pub struct PlannedCommand {
    pub label: String,
    pub command: String,
    pub log_path: Option<PathBuf>,
}

/// Comandos que lanzaría `run` para la noche, en orden.
pub fn planned_commands(args: &PlanArgs, app: &AppConfig) -> Result<(RunPlan, Vec<PlannedCommand>), CoreError> {
    let night = Night::parse(&night_or_today(args.night.as_deref()))?;
    let index_tables = app.index_table_set(&args.index.index_tables, args.index.with_tns)?;
    let config = ResolvedConfig::load(&args.job.config, &app.env_snapshot, &app.required_keys)?;
    let plan = RunPlan::full(&night, &config, &index_tables);
    let runner = process_runner(&args.job, app);
    let commands = plan.jobs()
                       .iter()
                       .map(|job| PlannedCommand { label: job.label(),
                                                   command: runner.command_line(job),
                                                   log_path: runner.log_path(job) })
                       .collect();
    Ok((plan, commands))
}

/// Orden `plan`: no lanza nada ni escribe en el ledger.
pub fn execute(args: &PlanArgs, app: &AppConfig) -> Result<i32, CoreError> {
    let (plan, commands) = planned_commands(args, app)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&commands)?);
    } else {
        println!("noche {}  plan {}  ({} jobs)", plan.night(), plan.plan_hash(), plan.len());
        for (i, c) in commands.iter().enumerate() {
            let log = c.log_path.as_deref().map(|p| p.display().to_string()).unwrap_or_default();
            println!("{:>3}. {}  > {}", i + 1, c.command, log);
        }
    }
    Ok(crate::report::EXIT_SUCCESS)
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "fink-archival", version, about = "Orquestador nocturno de archivado: primario, índices y estadísticas")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Nivel de log (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Archiva una noche completa
    Run(RunArgs),
    /// Relanza los jobs fallidos de una ejecución registrada en el ledger
    Rerun(RerunArgs),
    /// Muestra el resultado de una ejecución registrada en el ledger
    Status(StatusArgs),
    /// Muestra los comandos y logs de una noche sin ejecutar nada
    Plan(PlanArgs),
}

/// Opciones comunes a las órdenes que lanzan (o planifican) jobs.
#[derive(Debug, Clone, Args)]
pub struct RunnerArgs {
    /// Fichero de configuración que se pasa a cada job
    #[arg(short, long)]
    pub config: PathBuf,
    /// Directorio de los RunLogs
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Ejecutable del job runner
    #[arg(long)]
    pub runner: Option<PathBuf>,
}

/// Selección de tablas de índice de un plan completo.
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Tabla de índice a archivar (repetible); por defecto el conjunto de referencia
    #[arg(long = "index-table", value_name = "NAME")]
    pub index_tables: Vec<String>,
    /// Añade `tns_jd` al conjunto de referencia
    #[arg(long)]
    pub with_tns: bool,
}

/// Opciones de ejecución.
#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// Jobs de índice simultáneos (1 = secuencial)
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,
    /// Timeout por job, en segundos
    #[arg(long, value_name = "S")]
    pub timeout_secs: Option<u64>,
    /// Ledger JSONL donde se registran los eventos
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Anuncia los comandos sin lanzarlos
    #[arg(long)]
    pub dry_run: bool,
    /// Salida en JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Noche YYYYMMDD; por defecto la fecha UTC actual
    #[arg(long)]
    pub night: Option<String>,
    #[command(flatten)]
    pub job: RunnerArgs,
    #[command(flatten)]
    pub index: IndexArgs,
    #[command(flatten)]
    pub exec: ExecArgs,
}

// El plan de un relanzamiento sale de la ejecución previa: sin selección de índices.
#[derive(Debug, Clone, Args)]
pub struct RerunArgs {
    /// Noche cuya última ejecución se relanza
    #[arg(long, conflicts_with = "run_id")]
    pub night: Option<String>,
    /// Ejecución concreta a relanzar
    #[arg(long)]
    pub run_id: Option<Uuid>,
    #[command(flatten)]
    pub job: RunnerArgs,
    #[command(flatten)]
    pub exec: ExecArgs,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    #[arg(long)]
    pub night: Option<String>,
    #[arg(long)]
    pub run_id: Option<Uuid>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[arg(long)]
    pub night: Option<String>,
    #[command(flatten)]
    pub job: RunnerArgs,
    #[command(flatten)]
    pub index: IndexArgs,
    #[arg(long)]
    pub json: bool,
}

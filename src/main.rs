use std::process::ExitCode;

use clap::Parser;
use fink_archival::cli::{Cli, Commands};
use fink_archival::{commands, logging, AppConfig, CoreError};

async fn dispatch(cli: &Cli) -> Result<i32, CoreError> {
    let app = AppConfig::from_env()?;
    match &cli.command {
        Commands::Run(args) => commands::run::execute(args, &app).await,
        Commands::Rerun(args) => commands::rerun::execute(args, &app).await,
        Commands::Status(args) => commands::status::execute(args, &app),
        Commands::Plan(args) => commands::plan::execute(args, &app),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let code = match dispatch(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

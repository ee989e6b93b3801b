use tracing_subscriber::EnvFilter;

/// Inicializa el subscriber de `tracing` (también recoge los registros `log`
/// de los crates de librería).
///
/// `RUST_LOG` tiene prioridad; si no está definido se usa `log_level`.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .init();
}

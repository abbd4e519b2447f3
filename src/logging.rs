use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COHORTD_LOG";
const DEFAULT_FILTER: &str = "cohortd=info";

/// Logs go to stderr; stdout carries the IPC channel.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

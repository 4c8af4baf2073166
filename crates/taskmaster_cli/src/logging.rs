use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKMASTER_LOG";

/// Structured logging to stderr so stdout stays clean for `--json` output.
///
/// The filter comes from `TASKMASTER_LOG` (e.g. `debug`,
/// `taskmaster_core=debug`) and defaults to warnings only.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

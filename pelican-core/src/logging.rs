use tracing_subscriber::{EnvFilter, fmt};

/// Structured JSON logs for long-running processes.
///
/// Level filtering comes from `RUST_LOG` and defaults to `info`.
pub fn init_normal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .init();
}

pub fn init_logging() {
    // tokio-console replaces the normal subscriber entirely
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        init_console_logging();
    } else {
        init_normal_logging();
    }
}

fn init_console_logging() {
    console_subscriber::init();
}

/// Compact stderr output for interactive commands; stdout is left to command output.
pub fn init_cli_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

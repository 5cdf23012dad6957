use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level`. Calling this twice is harmless.
pub fn init_logging(default_level: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

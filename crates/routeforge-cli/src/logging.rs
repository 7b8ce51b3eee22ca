//! Subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber on stderr
///
/// `--verbose` forces `debug`. Otherwise `RUST_LOG` wins over the
/// configured level. Installing twice is a no-op.
pub fn init_logging(verbose: bool, configured_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

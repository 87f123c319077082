// Goalpatch - one-shot patcher for the weekly goal card source file

pub mod error;
pub mod patch;
pub mod utils;

use anyhow::Result;
use tracing::info;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize the logger for CLI usage
///
/// Logs go to stderr so the patched-file completion message stays alone on
/// stdout.
pub fn init() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    fmt::Subscriber::builder()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();

    info!("Initializing goalpatch v{}", version());

    Ok(())
}

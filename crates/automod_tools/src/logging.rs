#![forbid(unsafe_code)]

use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Overrides the default filter, e.g. `AUTOMOD_LOG=automod_os=debug`.
pub const LOG_ENV: &str = "AUTOMOD_LOG";

/// `-v` count from the command line.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Installs the global stderr subscriber. Stdout stays reserved for command output.
/// A second call is a no-op.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if Registry::default().with(filter).with(layer).try_init().is_err() {
        tracing::debug!("logging already initialised");
    }
}

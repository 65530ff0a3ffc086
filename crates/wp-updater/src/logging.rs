//! Log output for hosts that do not install their own subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Output format of [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Install a global fmt subscriber.
///
/// The level comes from `RUST_LOG` when set, otherwise from `debug`. Returns
/// `false` when a subscriber was already installed; calling this more than
/// once is harmless.
pub fn init_logging(debug: bool, format: LogFormat) -> bool {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false, LogFormat::Compact);
        assert!(!init_logging(true, LogFormat::Json));
    }
}

//! Logging setup, using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `JOBGRAPH_LOG` environment variable (eg: "info", "jobgraph=debug")
//! 3. default to `info`

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV_VAR: &str = "JOBGRAPH_LOG";

/// Build the filter used by the subscriber.
pub fn build_filter(cli_level: Option<&str>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Initialise the global logging subscriber,
/// does nothing if one is already set.
pub fn init_logging(cli_level: Option<&str>) {
    let result = fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .try_init();
    if result.is_err() {
        tracing::debug!("global tracing subscriber already set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_wins() {
        let filter = build_filter(Some("debug"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some("warn"));
        init_logging(Some("warn"));
    }
}

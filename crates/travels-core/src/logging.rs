//! Logging setup: a `tracing-subscriber` fmt layer filtered by `TRAVELS_LOG`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive (e.g. `travels_analysis=debug`).
pub const LOG_ENV_VAR: &str = "TRAVELS_LOG";

/// Install the global subscriber.
///
/// `TRAVELS_LOG` wins over `default_level` when set. Safe to call more than
/// once; returns `true` only for the call that installed the subscriber.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging("debug");
        assert!(!init_logging("debug"));
    }
}

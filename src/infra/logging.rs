//! Structured logging setup.
//!
//! Library code only emits `tracing` events; the binary decides where
//! they go. `ATPOINT_LOG` takes the usual `EnvFilter` syntax and wins
//! over the `-v` count.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "ATPOINT_LOG";

/// Map a `-v` count onto a default filter directive
pub fn level_for(verbosity: u8) -> &'static str
{
    match verbosity
    {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(
    verbosity: u8,
    no_color: bool,
)
{
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(verbosity > 1)
        .try_init();
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn verbosity_maps_to_levels()
    {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn init_is_idempotent()
    {
        init(0, true);
        init(3, true);
    }
}

//! Tracing subscriber setup for the `pick` binary.
//!
//! The terminal belongs to the picker while it runs, so logs only go to the
//! file given with `--log`.
//!
//! # Filter priority (highest to lowest)
//!
//! 1. `PICK_LOG` env var (directives such as `pick=trace,warn`)
//! 2. `RUST_LOG` env var
//! 3. `-v` count: none → `warn`, one → `info`, two → `debug`, more → `trace`

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PICK_LOG";

/// Default level for a number of `-v` flags.
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(verbose: u8) -> EnvFilter {
    // an unparseable PICK_LOG falls through instead of failing
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = level_for(verbose);
    EnvFilter::try_new(level.to_string()).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber, appending to `path`.
pub fn init_file(path: &Path, verbose: u8) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);
    tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;
    tracing::debug!(path = %path.display(), "logging to file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(7), Level::TRACE);
    }

    #[test]
    fn unwritable_log_path_is_io_error() {
        let err = init_file(Path::new("/definitely/not/here/pick.log"), 0).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}

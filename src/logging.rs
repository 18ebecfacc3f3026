//! Tracing subscriber setup for hosts embedding the mod manager

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Paths;

/// Default filter directive for a verbosity level (0 = warn .. 3+ = trace)
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "modshelf=warn",
        1 => "modshelf=info",
        2 => "modshelf=debug",
        _ => "modshelf=trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the verbosity-derived filter. When `log_file` is
/// given, events are appended there; `also_stderr` mirrors them to stderr.
pub fn init(verbose: u8, log_file: Option<&Path>, also_stderr: bool) -> Result<()> {
    let filter = filter_for_verbosity(verbose);
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = if also_stderr || log_file.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Log to the per-user log file only
pub fn init_default(verbose: u8) -> Result<()> {
    let paths = Paths::new()?;
    init(verbose, Some(&paths.log_file()), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(filter_for_verbosity(0), "modshelf=warn");
        assert_eq!(filter_for_verbosity(2), "modshelf=debug");
        assert_eq!(filter_for_verbosity(7), "modshelf=trace");
    }
}

//! # Logging
//!
//! One `tracing` subscriber per process, writing to stderr. Stdout belongs
//! to the report a command prints, so nothing else may go there.
//!
//! Verbosity comes from the CLI (`-v`, `-vv`, `-q`) unless `RUST_LOG` is
//! set, in which case `RUST_LOG` wins outright:
//!
//! | flags  | filter                                                     |
//! |--------|------------------------------------------------------------|
//! | `-q`   | `warn`                                                     |
//! | none   | `etw_node=info,etw_contracts=info,etw_protocol=warn`       |
//! | `-v`   | `etw_node=debug,etw_contracts=debug,etw_protocol=debug`    |
//! | `-vv`  | `etw_node=trace,etw_contracts=trace,etw_protocol=trace`    |
//!
//! At `debug` every ledger transition and every rejected authorization is
//! logged, which is usually what you want when a scenario step fails
//! unexpectedly.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: [&str; 3] = ["etw_node", "etw_contracts", "etw_protocol"];

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event, for CI log collection.
    Json,
}

/// What the CLI asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Number of `-v` flags.
    pub verbosity: u8,
    pub quiet: bool,
}

impl LogSettings {
    /// Filter directives used when `RUST_LOG` is unset.
    pub fn directives(&self) -> String {
        if self.quiet {
            return "warn".to_string();
        }
        match self.verbosity {
            0 => "etw_node=info,etw_contracts=info,etw_protocol=warn".to_string(),
            1 => per_crate("debug"),
            _ => per_crate("trace"),
        }
    }

    fn filter(&self) -> Result<EnvFilter> {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return EnvFilter::try_from_default_env()
                .map_err(|err| anyhow!("invalid {}: {err}", EnvFilter::DEFAULT_ENV));
        }
        EnvFilter::try_new(self.directives()).map_err(|err| anyhow!("invalid log filter: {err}"))
    }
}

fn per_crate(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Fails if one is already installed or
/// `RUST_LOG` does not parse.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = settings.filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(settings.verbosity > 0)
                    .without_time(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    tracing::debug!(format = ?settings.format, verbosity = settings.verbosity, "logging ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbosity() {
        let settings = LogSettings {
            verbosity: 2,
            quiet: true,
            ..LogSettings::default()
        };
        assert_eq!(settings.directives(), "warn");
    }

    #[test]
    fn each_v_raises_every_crate() {
        let mut settings = LogSettings::default();
        assert_eq!(
            settings.directives(),
            "etw_node=info,etw_contracts=info,etw_protocol=warn"
        );

        settings.verbosity = 1;
        assert_eq!(
            settings.directives(),
            "etw_node=debug,etw_contracts=debug,etw_protocol=debug"
        );

        settings.verbosity = 7;
        assert!(settings.directives().split(',').all(|d| d.ends_with("=trace")));
    }

    #[test]
    fn every_level_is_a_valid_filter() {
        for (verbosity, quiet) in [(0, false), (1, false), (2, false), (0, true)] {
            let settings = LogSettings {
                verbosity,
                quiet,
                ..LogSettings::default()
            };
            assert!(EnvFilter::try_new(settings.directives()).is_ok());
        }
    }
}

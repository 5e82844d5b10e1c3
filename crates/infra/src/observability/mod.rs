//! Logging and tracing setup
//!
//! Installs the global `tracing` subscriber. The filter comes from
//! `RUST_LOG` when set, otherwise from the level passed in.

use std::str::FromStr;

use sessiongate_domain::SessionGateError;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = SessionGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(SessionGateError::Config(format!("Unknown log format: {other}"))),
        }
    }
}

/// Initialize tracing/logging.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests);
/// returns `false` when a global subscriber was already installed.
pub fn init_tracing(format: LogFormat, default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => fmt::fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt::fmt().with_env_filter(filter).try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(LogFormat::Pretty, "debug");
        assert!(!init_tracing(LogFormat::Json, "info"));
    }
}

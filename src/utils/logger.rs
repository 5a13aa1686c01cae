//! Logging setup
//!
//! Runner diagnostics go through `tracing`; the human-readable test report is
//! printed separately by the output sinks.

use std::fmt;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// First parseable level of the command line and the config file
    pub fn resolve(cli: Option<&str>, configured: &str) -> Self {
        cli.and_then(Self::from_str)
            .or_else(|| Self::from_str(configured))
            .unwrap_or_default()
    }

    /// A verbose run shows per-attempt retry diagnostics
    pub fn with_verbose(self, verbose: bool) -> Self {
        if verbose {
            self.min(LogLevel::Debug)
        } else {
            self
        }
    }

    fn directive(self) -> String {
        format!("trialrun={}", self)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("verbose"), None);
    }

    #[test]
    fn test_resolve_prefers_cli() {
        assert_eq!(LogLevel::resolve(Some("debug"), "warn"), LogLevel::Debug);
        assert_eq!(LogLevel::resolve(Some("nonsense"), "warn"), LogLevel::Warn);
        assert_eq!(LogLevel::resolve(None, "nonsense"), LogLevel::Info);
    }

    #[test]
    fn test_verbose_lowers_level() {
        assert_eq!(LogLevel::Info.with_verbose(true), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.with_verbose(true), LogLevel::Trace);
        assert_eq!(LogLevel::Warn.with_verbose(false), LogLevel::Warn);
        assert_eq!(LogLevel::Error.directive(), "trialrun=error");
    }
}

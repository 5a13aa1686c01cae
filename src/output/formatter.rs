//! Output formatters for run results
//!
//! Provides table, JSON and summary renderings of a `RunResult`.

use crate::models::{LogState, RunResult, TestLog};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
    verbose: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
            verbose: false,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Include passed cases and info entries in the log listing
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single log entry
    pub fn format_log(&self, log: &TestLog) -> String {
        let plain = log.to_string();
        if !self.colorize {
            return plain;
        }

        let color = match log.state {
            LogState::Passed => "32",
            LogState::Failed | LogState::Error => "31",
            LogState::Ignored | LogState::Warning => "33",
            LogState::Info => "90",
        };
        format!("\x1b[{color}m{plain}\x1b[0m")
    }

    /// Non-verbose output only lists entries that need attention
    fn is_listed(&self, log: &TestLog) -> bool {
        self.verbose || !matches!(log.state, LogState::Passed | LogState::Info)
    }

    /// Format a whole run
    pub fn format_run(&self, result: &RunResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_run_table(result),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Summary => result.to_string(),
        }
    }

    fn format_run_table(&self, result: &RunResult) -> String {
        let mut output = String::new();

        output.push_str("\n══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Test Run: {} classes, {} tests\n",
            result.total_classes,
            result.total_tests()
        ));
        output.push_str("══════════════════════════════════════════════════════════════\n");

        for log in result.logs.iter().filter(|l| self.is_listed(l)) {
            output.push_str(&format!(" {}\n", self.format_log(log)));
        }

        output.push_str("──────────────────────────────────────────────────────────────\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", result.counters.passed)
        } else {
            result.counters.passed.to_string()
        };
        let fail_str = if self.colorize && result.counters.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", result.counters.failed)
        } else {
            result.counters.failed.to_string()
        };

        output.push_str(&format!(
            " Pass: {} | Fail: {} | Ignored: {} | Warnings: {} | Leaks: {}\n",
            pass_str,
            fail_str,
            result.counters.ignored,
            result.counters.warnings,
            result.total_leaks
        ));
        output.push_str(&format!(" Duration: {:.3}s\n", result.total_time));

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counters;

    fn sample() -> RunResult {
        let mut run = RunResult::new();
        run.counters = Counters {
            passed: 1,
            failed: 1,
            ignored: 0,
            warnings: 0,
        };
        run.total_classes = 1;
        run.push_log(TestLog::method("adds", LogState::Passed, "1, 2", None));
        run.push_log(TestLog::method(
            "divides",
            LogState::Failed,
            "1, 0",
            Some("Assertion ConfirmEqual failed: Expected 1, but got 0.".into()),
        ));
        run
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_table_hides_passed_unless_verbose() {
        let run = sample();

        let quiet = ResultFormatter::new(OutputFormat::Table).no_color().format_run(&run);
        assert!(!quiet.contains("adds(1, 2)"));
        assert!(quiet.contains("✗ divides(1, 0) FAILED"));
        assert!(quiet.contains("Pass: 1 | Fail: 1"));

        let loud = ResultFormatter::new(OutputFormat::Table)
            .no_color()
            .verbose(true)
            .format_run(&run);
        assert!(loud.contains("✓ adds(1, 2) PASSED"));
    }

    #[test]
    fn test_json_output() {
        let json = ResultFormatter::new(OutputFormat::Json).format_run(&sample());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["logs"][1]["state"], "failed");
    }

    #[test]
    fn test_summary_output() {
        let summary = ResultFormatter::new(OutputFormat::Summary).format_run(&sample());
        assert!(summary.starts_with("Ran 2 tests in 1 test classes."));
    }
}

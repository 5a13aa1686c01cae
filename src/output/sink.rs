//! Result sinks
//!
//! Consumers of the final `RunResult`: the console summary and the JSON dump.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{OutputMode, RunConfig};
use crate::models::RunResult;

use super::formatter::{OutputFormat, ResultFormatter};

/// Destination for a finished run
pub trait ResultSink {
    fn name(&self) -> &str;

    fn emit(&self, result: &RunResult) -> Result<()>;
}

/// Prints the run to stdout
pub struct ConsoleSink {
    formatter: ResultFormatter,
}

impl ConsoleSink {
    pub fn new(formatter: ResultFormatter) -> Self {
        Self { formatter }
    }
}

impl ResultSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn emit(&self, result: &RunResult) -> Result<()> {
        println!("{}", self.formatter.format_run(result));
        Ok(())
    }
}

/// JSON dump of a run, stamped with its generation time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: RunResult,
}

/// Writes the run as pretty JSON to a file
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a previously written dump
    pub fn load(path: impl AsRef<Path>) -> Result<StoredRun> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse results file: {}", path.display()))
    }
}

impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        "json"
    }

    fn emit(&self, result: &RunResult) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create results directory: {}", parent.display())
            })?;
        }

        let stored = StoredRun {
            generated_at: Utc::now(),
            result: result.clone(),
        };

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create results file: {}", self.path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &stored)
            .context("Failed to write results")?;

        info!("Results written to {}", self.path.display());
        Ok(())
    }
}

/// Sinks selected by the output mode bitmask
pub fn sinks_for(config: &RunConfig, format: OutputFormat, color: bool) -> Vec<Box<dyn ResultSink>> {
    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();

    if config.output.contains(OutputMode::LOG) {
        let mut formatter = ResultFormatter::new(format).verbose(config.verbose);
        if !color {
            formatter = formatter.no_color();
        }
        sinks.push(Box::new(ConsoleSink::new(formatter)));
    }

    if config.output.contains(OutputMode::JSON) {
        sinks.push(Box::new(JsonFileSink::new(&config.output_path)));
    }

    sinks
}

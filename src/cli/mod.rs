//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, OutputMode, RunConfig};
use crate::metadata::RuntimeTarget;

/// Declarative unit-test runner
#[derive(Parser, Debug)]
#[command(name = "trialrun")]
#[command(version = "0.1.0")]
#[command(about = "Discover and run declarative test classes")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to the standard search locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run test classes
    Run(RunArgs),

    /// List discovered test classes and methods
    List(ListArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Only run the class with this exact name
    #[arg(long)]
    pub class: Option<String>,

    /// Only run methods with this name (display or raw)
    #[arg(short, long)]
    pub method: Option<String>,

    /// Only run methods tagged with this category
    #[arg(long)]
    pub category: Option<String>,

    /// Run every class sequentially
    #[arg(short, long)]
    pub sequential: bool,

    /// Maximum classes running at once, 0 for unbounded
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// List every case and lifecycle call
    #[arg(short, long)]
    pub verbose: bool,

    /// Abort the run on the first failed case
    #[arg(short, long)]
    pub exit_on_failure: bool,

    /// Report resources leaked by test methods
    #[arg(long)]
    pub monitor_leaks: bool,

    /// Runtime target for ignore policies (headless, editor)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output modes, comma-separated (log, json, none)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path of the JSON results dump
    #[arg(long)]
    pub output_path: Option<PathBuf>,

    /// Retry flaky cases without waiting for their backoff
    #[arg(long)]
    pub no_backoff: bool,

    /// Skip the native backend
    #[arg(long)]
    pub no_native: bool,

    /// Skip the script backend
    #[arg(long)]
    pub no_script: bool,

    /// Console format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl RunArgs {
    /// Layer the command-line flags over the file and environment config
    pub fn to_run_config(&self, app: &AppConfig) -> anyhow::Result<RunConfig> {
        let mut config = app.to_run_config();

        config.class_name = self.class.clone();
        config.method_name = self.method.clone();
        config.category = self.category.clone();

        if self.sequential {
            config.parallelize = false;
        }
        if let Some(max) = self.max_concurrent {
            config.max_concurrent = max;
        }
        config.verbose |= self.verbose;
        config.exit_on_failure |= self.exit_on_failure;
        config.monitor_leaks |= self.monitor_leaks;
        if self.no_backoff {
            config.honor_backoff = false;
        }
        config.disable_native |= self.no_native;
        config.disable_script |= self.no_script;

        if let Some(target) = &self.target {
            config.target = RuntimeTarget::from_str(target)
                .ok_or_else(|| anyhow::anyhow!("Unknown runtime target: {}", target))?;
        }
        if let Some(output) = &self.output {
            config.output = OutputMode::from_str(output)
                .ok_or_else(|| anyhow::anyhow!("Unknown output mode: {}", output))?;
        }
        if let Some(path) = &self.output_path {
            config.output_path = path.clone();
        }

        Ok(config)
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show cases and lifecycle hooks of every class
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(default_value = "trialrun.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List supported environment variables
    Env,
}

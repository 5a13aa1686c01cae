//! Configuration module
//!
//! Handles loading application settings from a config file, applying
//! environment overrides and deriving the per-run configuration.

mod env;
mod run;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};
pub use run::{OutputMode, RunConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metadata::RuntimeTarget;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./trialrun.yaml",
    "./trialrun.yml",
    "./.trialrun.yaml",
    "~/.config/trialrun/config.yaml",
    "~/.trialrun.yaml",
];

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Run parallelizable classes concurrently
    pub parallel: bool,

    /// Maximum concurrent classes, 0 for unbounded
    pub max_concurrent: usize,

    pub verbose: bool,

    pub exit_on_failure: bool,

    pub monitor_leaks: bool,

    /// Honor backoff delays between flaky retries
    pub backoff: bool,

    /// Runtime target (headless, editor)
    pub target: RuntimeTarget,

    /// Run the native backend
    pub native: bool,

    /// Run the script backend
    pub script: bool,

    /// Output modes, comma-separated (log, json)
    pub output: String,

    /// JSON dump path
    pub output_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_concurrent: 0,
            verbose: false,
            exit_on_failure: false,
            monitor_leaks: false,
            backoff: true,
            target: RuntimeTarget::Headless,
            native: true,
            script: true,
            output: "log".to_string(),
            output_path: PathBuf::from("test_results.json"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if OutputMode::from_str(&self.output).is_none() {
            anyhow::bail!("Invalid output mode '{}'. Valid: log, json", self.output);
        }
        if crate::utils::LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!("Invalid log level '{}'", self.log_level);
        }
        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(parallel) = env.parallel {
            self.parallel = parallel;
        }
        if let Some(max) = env.max_concurrent {
            self.max_concurrent = max;
        }
        if let Some(verbose) = env.verbose {
            self.verbose = verbose;
        }
        if let Some(exit) = env.exit_on_failure {
            self.exit_on_failure = exit;
        }
        if let Some(monitor) = env.monitor_leaks {
            self.monitor_leaks = monitor;
        }
        if let Some(target) = env.target.as_deref().and_then(RuntimeTarget::from_str) {
            self.target = target;
        }
        if let Some(native) = env.native {
            self.native = native;
        }
        if let Some(script) = env.script {
            self.script = script;
        }
        if let Some(output) = &env.output {
            self.output = output.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        self
    }

    /// Derive the run configuration
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            parallelize: self.parallel,
            max_concurrent: self.max_concurrent,
            verbose: self.verbose,
            exit_on_failure: self.exit_on_failure,
            monitor_leaks: self.monitor_leaks,
            honor_backoff: self.backoff,
            output: OutputMode::from_str(&self.output).unwrap_or_default(),
            output_path: self.output_path.clone(),
            target: self.target,
            disable_native: !self.native,
            disable_script: !self.script,
            ..RunConfig::default()
        }
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Expand a leading `~` to the home directory
fn expand_path(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

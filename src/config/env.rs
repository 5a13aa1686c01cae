//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TRIALRUN";

/// Configuration read from `TRIALRUN_*` environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Parallel from TRIALRUN_PARALLEL
    pub parallel: Option<bool>,
    /// Concurrency limit from TRIALRUN_MAX_CONCURRENT
    pub max_concurrent: Option<usize>,
    /// Verbose from TRIALRUN_VERBOSE
    pub verbose: Option<bool>,
    /// Exit on first failure from TRIALRUN_EXIT_ON_FAILURE
    pub exit_on_failure: Option<bool>,
    /// Leak monitoring from TRIALRUN_MONITOR_LEAKS
    pub monitor_leaks: Option<bool>,
    /// Runtime target from TRIALRUN_TARGET
    pub target: Option<String>,
    /// Native backend switch from TRIALRUN_NATIVE
    pub native: Option<bool>,
    /// Script backend switch from TRIALRUN_SCRIPT
    pub script: Option<bool>,
    /// Output modes from TRIALRUN_OUTPUT
    pub output: Option<String>,
    /// Log level from TRIALRUN_LOG
    pub log_level: Option<String>,
    /// Config file from TRIALRUN_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            parallel: get_env_bool("PARALLEL"),
            max_concurrent: get_env_parse("MAX_CONCURRENT"),
            verbose: get_env_bool("VERBOSE"),
            exit_on_failure: get_env_bool("EXIT_ON_FAILURE"),
            monitor_leaks: get_env_bool("MONITOR_LEAKS"),
            target: get_env("TARGET"),
            native: get_env_bool("NATIVE"),
            script: get_env_bool("SCRIPT"),
            output: get_env("OUTPUT"),
            log_level: get_env("LOG"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.parallel.is_some()
            || self.max_concurrent.is_some()
            || self.verbose.is_some()
            || self.exit_on_failure.is_some()
            || self.monitor_leaks.is_some()
            || self.target.is_some()
            || self.native.is_some()
            || self.script.is_some()
            || self.output.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn var(mut self, name: &str, value: impl ToString) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_{name}"), value.to_string()));
        self
    }

    pub fn parallel(self, parallel: bool) -> Self {
        self.var("PARALLEL", parallel)
    }

    pub fn max_concurrent(self, max: usize) -> Self {
        self.var("MAX_CONCURRENT", max)
    }

    pub fn target(self, target: &str) -> Self {
        self.var("TARGET", target)
    }

    pub fn native(self, enabled: bool) -> Self {
        self.var("NATIVE", enabled)
    }

    pub fn script(self, enabled: bool) -> Self {
        self.var("SCRIPT", enabled)
    }

    pub fn output(self, output: &str) -> Self {
        self.var("OUTPUT", output)
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all TRIALRUN environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_PARALLEL         Run parallelizable classes concurrently (true/false)");
    println!("  {ENV_PREFIX}_MAX_CONCURRENT   Maximum classes in flight, 0 for unbounded");
    println!("  {ENV_PREFIX}_VERBOSE          Log lifecycle hooks and passing cases (true/false)");
    println!("  {ENV_PREFIX}_EXIT_ON_FAILURE  Abort the run on the first failed case (true/false)");
    println!("  {ENV_PREFIX}_MONITOR_LEAKS    Sample the leak probe around methods (true/false)");
    println!("  {ENV_PREFIX}_TARGET           Runtime target (headless, editor)");
    println!("  {ENV_PREFIX}_NATIVE           Run the native backend (true/false)");
    println!("  {ENV_PREFIX}_SCRIPT           Run the script backend (true/false)");
    println!("  {ENV_PREFIX}_OUTPUT           Output modes, comma-separated (log, json)");
    println!("  {ENV_PREFIX}_LOG              Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG           Path to configuration file");
}

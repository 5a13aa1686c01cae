//! trialrun - declarative unit-test runner
//!
//! Runs the built-in demo module through the same pipeline a host
//! application uses for its own test modules.
//!
//! ## Usage
//!
//! ```bash
//! # Run everything
//! trialrun run
//!
//! # Run one class sequentially and dump JSON results
//! trialrun run --class ArithmeticTests --sequential --output log,json
//!
//! # List discovered classes
//! trialrun list --detailed
//!
//! # Write an example config file
//! trialrun config init
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use trialrun::backend::{NativeBackend, TestManager};
use trialrun::cli::{self, Args, Command};
use trialrun::config::{print_env_help, AppConfig, EnvConfig};
use trialrun::demo::demo_module;
use trialrun::discovery::discover_test_classes;
use trialrun::metadata::LifecycleRole;
use trialrun::output::{sinks_for, OutputFormat};
use trialrun::utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let config_path = args
        .config
        .clone()
        .or_else(|| env.config_file.clone().map(Into::into));
    let app = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    }
    .merge_env(&env);
    app.validate()?;

    let verbose = matches!(&args.command, Command::Run(run) if run.verbose) || app.verbose;
    init_logger(LogLevel::resolve(args.log_level.as_deref(), &app.log_level).with_verbose(verbose));

    match args.command {
        Command::Run(run_args) => {
            let passed = run_tests(&app, run_args).await?;
            if !passed {
                std::process::exit(1);
            }
        }
        Command::List(list_args) => {
            list_tests(list_args);
        }
        Command::Config(config_args) => {
            manage_config(&app, config_args)?;
        }
    }

    Ok(())
}

async fn run_tests(app: &AppConfig, args: cli::RunArgs) -> Result<bool> {
    let config = args.to_run_config(app)?;
    let format = OutputFormat::from_str(&args.format).unwrap_or_else(|| {
        warn!("Unknown format '{}', using table", args.format);
        OutputFormat::Table
    });

    info!(
        "Running tests ({}, target {})",
        if config.parallelize { "parallel" } else { "sequential" },
        config.target
    );

    let sinks = sinks_for(&config, format, !args.no_color);
    let mut manager = TestManager::new(config).with_native(NativeBackend::new(demo_module()));
    let result = manager.run().await?;

    for sink in &sinks {
        sink.emit(result)?;
    }

    Ok(result.is_success())
}

fn list_tests(args: cli::ListArgs) {
    let module = demo_module();
    let classes = discover_test_classes(&module);

    println!("\nTest classes in '{}' ({} total)\n", module.name, classes.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for class in &classes {
        let mode = if class.parallelizable { "parallel" } else { "sequential" };
        println!(
            "\n{} [{}] - {} cases",
            class.name,
            mode,
            class.scheduled_cases()
        );
        println!("──────────────────────────────────────────────────────────────────────");

        for method in &class.methods {
            if args.detailed {
                println!("  {} ({} cases)", method.name, method.scheduled_cases());
                for unit in &method.units {
                    println!("      ({}) x{}", unit.rendered, unit.iterations());
                }
            } else {
                println!("  {}", method.name);
            }
        }

        if args.detailed {
            for role in LifecycleRole::all() {
                if let Some(hook) = class.hook(role) {
                    println!("  [{}] {}", role, hook.method_name);
                }
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

fn manage_config(app: &AppConfig, args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            AppConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
        }

        cli::ConfigAction::Show => {
            if let Some(found) = AppConfig::find() {
                println!("# Loaded from {}", found.display());
            }
            println!("{}", serde_yaml::to_string(app)?);
        }

        cli::ConfigAction::Env => {
            print_env_help();
        }
    }

    Ok(())
}

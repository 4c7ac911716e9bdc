//! # Dispatcher Configuration Validator
//!
//! Command-line tool that loads a dispatcher configuration file, applies
//! environment overrides, validates it and prints the resolved retry
//! strategy and cache settings.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use taskflow_core::config::loader::detect_environment;
use taskflow_core::config::{ConfigManager, DispatcherConfig};
use taskflow_core::logging::duration_ms;
use taskflow_core::strategy::{RetryStrategy, StrategyRegistry};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate taskflow dispatcher configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (YAML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip TASKFLOW_* environment overrides
    #[arg(long)]
    no_env: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    match validate(&cli) {
        Ok(()) => {
            info!("Configuration validation completed successfully");
        }
        Err(e) => {
            error!("Configuration validation failed: {e:#}");
            eprintln!("❌ Configuration invalid: {e:#}");
            process::exit(1);
        }
    }
}

fn validate(cli: &Cli) -> anyhow::Result<()> {
    let manager = if cli.no_env {
        let config = match &cli.config {
            Some(path) => DispatcherConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DispatcherConfig::default(),
        };
        ConfigManager::from_config(config, detect_environment(), cli.config.clone())?
    } else {
        ConfigManager::load_from(cli.config.clone()).context("loading configuration")?
    };

    let strategy = StrategyRegistry::with_builtins()
        .resolve(&manager.config().strategy)
        .context("resolving retry strategy")?;

    match cli.format {
        OutputFormat::Table => print_table(&manager, &strategy),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "environment": manager.environment(),
                "source": manager.source().map(|p| p.display().to_string()),
                "config": manager.config(),
                "strategy": {
                    "kind": strategy.kind(),
                    "start_ms": duration_ms(strategy.params().start()),
                    "max_ms": duration_ms(strategy.params().max()),
                    "step_ms": strategy.params().has_step().then(|| duration_ms(strategy.params().step())),
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_table(manager: &ConfigManager, strategy: &RetryStrategy) {
    let config = manager.config();
    let params = strategy.params();

    println!("🔧 Dispatcher Configuration");
    println!("Environment: {}", manager.environment());
    match manager.source() {
        Some(path) => println!("Source:      {}", path.display()),
        None => println!("Source:      defaults"),
    }
    println!();
    println!("Predicates module: {}", config.predicates_module);
    println!("Tracing:           {}", if config.trace.enabled { "enabled" } else { "disabled" });
    println!();
    println!("Retry strategy:    {}", strategy.kind());
    println!("  start:           {:?}", params.start());
    println!("  max:             {:?}", params.max());
    if params.has_step() {
        println!("  step:            {:?}", params.step());
    }
    println!();
    println!("Result cache:      {}", if config.cache.enabled { "enabled" } else { "disabled" });
    println!("  policy:          {}", config.cache.policy);
    println!("  max size:        {}", config.cache.max_cache_size);
    println!("  scope:           {}", config.cache.scope);
    println!();
    println!("✅ Configuration valid");
}

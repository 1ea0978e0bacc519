//! Upwatch CLI
//!
//! Command-line entry point, meant to be invoked periodically by an external
//! scheduler.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use upwatch::alerting::{LogNotifier, MatrixNotifier, Notifier};
use upwatch::checker::{Checker, HttpChecker};
use upwatch::clock::SystemClock;
use upwatch::config::LoggingConfig;
use upwatch::store::StatusStore;
use upwatch::{Config, Monitor};

/// Upwatch - uptime monitoring with chat alerts
#[derive(Parser)]
#[command(name = "upwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "UPWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check all endpoints once, update state, and send notifications
    Run {
        /// Log notifications instead of delivering them
        #[arg(long)]
        dry_run: bool,

        /// Override the status file location
        #[arg(long, env = "MONITOR_STATUS_FILE")]
        status_file: Option<PathBuf>,
    },

    /// Check all endpoints and print the results without touching state
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Credentials usually live in a .env next to the deployment
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    init_logging(&config.logging, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Run {
            dry_run,
            status_file,
        } => run_monitor(config, dry_run, status_file, cli.format).await,
        Commands::Check => run_check(config, cli.format).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_monitor(
    config: Config,
    dry_run: bool,
    status_file: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if config.monitor.endpoints.is_empty() {
        warn!("No endpoints configured, nothing to monitor");
    }

    let status_file = status_file.unwrap_or_else(|| config.monitor.status_file.clone());
    let checker = HttpChecker::new(&config.checker)?;

    if dry_run {
        info!("Dry run, notifications will only be logged");
        run_pass(&config, checker, LogNotifier, &status_file, format).await
    } else {
        let notifier = MatrixNotifier::new(&config.notifier)?;
        if !notifier.is_configured() {
            warn!("Matrix credentials not configured, alerts will not be delivered");
        }
        run_pass(&config, checker, notifier, &status_file, format).await
    }
}

async fn run_pass<C: Checker, N: Notifier>(
    config: &Config,
    checker: C,
    notifier: N,
    status_file: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    info!(
        endpoints = config.monitor.endpoints.len(),
        status_file = %status_file.display(),
        "Starting monitoring run"
    );

    let mut store = StatusStore::load(status_file);
    let monitor = Monitor::new(
        config.monitor.endpoints.clone(),
        checker,
        notifier,
        SystemClock,
        config.alerting.max_realert_interval.as_secs_f64(),
    );

    let summary = monitor.run(&mut store).await;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

async fn run_check(config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let checker = HttpChecker::new(&config.checker)?;
    let mut results = Vec::with_capacity(config.monitor.endpoints.len());

    for endpoint in &config.monitor.endpoints {
        let outcome = checker.check(endpoint).await;
        results.push(serde_json::json!({
            "name": endpoint.name,
            "url": endpoint.url,
            "success": outcome.success,
            "error": outcome.error,
        }));

        if let OutputFormat::Text = format {
            match &outcome.error {
                None => println!("✓ {}: OK", endpoint.name),
                Some(error) => println!("✗ {}: {}", endpoint.name, error),
            }
        }
    }

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

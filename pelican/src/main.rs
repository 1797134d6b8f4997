use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pelican_core::cli::{self, FilterCmd, RegistryArgs};
use pelican_core::conf::{SupervisorConfig, WorkerConfig};
use pelican_core::logging::{init_cli_logging, init_logging};
use pelican_core::server;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pelican",
    version,
    about = "Pelican: log filter registry with per-minute result aggregation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the registry supervisor
    Supervisor {
        /// Path to the supervisor config file
        #[arg(long, default_value = "config/supervisor.toml")]
        config: PathBuf,
    },

    /// Match log lines from stdin and flush counts to the supervisor
    Worker {
        /// Path to the worker config file
        #[arg(long, default_value = "config/worker.toml")]
        config: PathBuf,

        /// Log flushed batches instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage filters on a running supervisor
    Filter {
        #[command(flatten)]
        registry: RegistryArgs,

        #[command(subcommand)]
        cmd: FilterCmd,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Supervisor { config } => {
            init_logging();

            let cfg = SupervisorConfig::from_file(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;

            server::run(cfg).context("failed to start supervisor")
        }

        Command::Worker { config, dry_run } => {
            init_logging();

            let cfg = WorkerConfig::from_file(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;

            cli::run_worker(cfg, dry_run)
        }

        Command::Filter { registry, cmd } => {
            init_cli_logging();

            if let Err(e) = cli::filter::run(&registry, cmd) {
                eprintln!("filter error: {e:#}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

mod keys;
mod ssh;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use devpod_oci::{MachineSpec, OciProvider, Options};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// DevPod machine provider for Oracle Cloud Infrastructure.
///
/// All options are read from the environment DevPod sets up.
#[derive(Parser)]
#[command(name = "devpod-provider-oci")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the provider configuration
    Init,
    /// Create the machine, or start it if it already exists
    Create,
    /// Terminate the machine and its boot volume
    Delete,
    /// Start a stopped machine
    Start,
    /// Stop a running machine
    Stop,
    /// Print the machine status
    Status,
    /// Run $COMMAND on the machine over SSH
    Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    let options = Options::from_env(matches!(command, Commands::Init))?;
    let provider = OciProvider::from_options(&options)?;

    match command {
        Commands::Init => {
            info!(compartment_id = %provider.compartment_id(), "configuration ok");
        }
        Commands::Create => {
            let public_key = keys::ensure_key_pair(&options.machine_folder, keys::KEY_BITS)?;
            let spec = MachineSpec::from_options(&options, public_key);
            provider.create(&spec).await?;
        }
        Commands::Delete => provider.delete(&options.machine_id).await?,
        Commands::Start => provider.start(&options.machine_id).await?,
        Commands::Stop => provider.stop(&options.machine_id).await?,
        Commands::Status => {
            let status = provider.status(&options.machine_id).await?;
            print!("{status}");
        }
        Commands::Command => {
            let ip = provider.ip(&options.machine_id).await?;
            return ssh::run_remote(&ip, &keys::private_key_path(&options.machine_folder)).await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

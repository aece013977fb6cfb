//! # secretsyncctl
//!
//! Command-line interface for the Secret Sync Controller.
//!
//! Runs sync cycles outside the controller and inspects `SecretSync` bindings.
//! Store settings come from the same environment variables as the controller
//! (`SYNC_STORE_REGION`/`AWS_REGION`, `SYNC_TARGET_NAMESPACE`, ...).
//!
//! ## Usage
//!
//! ```bash
//! # Sync one secret into the target namespace once
//! secretsyncctl sync eks-sync-database
//!
//! # Re-check secrets every reconcile interval until interrupted
//! secretsyncctl watch eks-sync-database eks-sync-api-keys
//!
//! # Handle a secret-change event (file or stdin)
//! secretsyncctl handle-event --file event.json
//! cat event.json | secretsyncctl handle-event
//!
//! # List SecretSync bindings
//! secretsyncctl list --namespace payments
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use secret_sync_controller::config::{ControllerConfig, LogFormat};
use secret_sync_controller::observability;
use secret_sync_controller::runtime::initialization::install_crypto_provider;
use std::path::PathBuf;

mod event;
mod list;
mod sync;

/// Secret Sync Controller CLI
#[derive(Parser)]
#[command(name = "secretsyncctl")]
#[command(about = "Secret Sync Controller CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace (defaults to SYNC_TARGET_NAMESPACE for syncs, all namespaces for list)
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle for a secret
    Sync {
        /// Name or ARN of the secret in the cloud store
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Name of the Kubernetes Secret (defaults to the source secret name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Re-check secrets at a fixed interval until interrupted
    Watch {
        /// Names or ARNs of the secrets in the cloud store
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,

        /// Re-check interval (defaults to SYNC_RECONCILE_INTERVAL)
        #[arg(long)]
        interval: Option<String>,
    },
    /// Handle a secret-change event envelope
    #[command(name = "handle-event")]
    HandleEvent {
        /// Path to the event JSON (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List SecretSync resources
    List,
    /// Print build information
    Version,
}

fn load_config() -> Result<ControllerConfig> {
    ControllerConfig::from_env().context("Invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    install_crypto_provider();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!(
            "secretsyncctl {} (git {}, built {})",
            env!("CARGO_PKG_VERSION"),
            env!("BUILD_GIT_HASH"),
            env!("BUILD_DATETIME")
        );
        return Ok(());
    }

    observability::init_tracing(LogFormat::Text)?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;

    match cli.command {
        Commands::Sync { source, name } => {
            sync::sync_command(client, load_config()?, source, name, cli.namespace).await
        }
        Commands::Watch { sources, interval } => {
            sync::watch_command(client, load_config()?, sources, interval, cli.namespace).await
        }
        Commands::HandleEvent { file } => {
            event::handle_event_command(client, load_config()?, file, cli.namespace).await
        }
        Commands::List => list::list_command(client, cli.namespace).await,
        Commands::Version => Ok(()),
    }
}

//! # Handle-Event Command
//!
//! Runs the event trigger for one secret-change notification. A non-zero exit
//! lets the event system redeliver.

use anyhow::{Context, Result};
use kube::Client;
use secret_sync_controller::config::ControllerConfig;
use secret_sync_controller::runtime::build_policy;
use secret_sync_controller::trigger::{EventOutcome, EventTrigger, SecretChangeEvent};
use std::io::Read;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

pub async fn handle_event_command(
    client: Client,
    mut config: ControllerConfig,
    file: Option<PathBuf>,
    namespace: Option<String>,
) -> Result<()> {
    let json = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };
    let event = SecretChangeEvent::from_json(&json)?;

    if let Some(namespace) = namespace {
        config.target_namespace = namespace;
    }
    let policy = build_policy(&config, client).await;
    let trigger = EventTrigger::from_config(policy, &config);

    match trigger.handle(&event, &CancellationToken::new()).await? {
        EventOutcome::Skipped { secret_name } => {
            println!(
                "Skipped {secret_name}: name does not start with '{}'",
                config.name_prefix_filter
            );
        }
        EventOutcome::Synced(outcome) => {
            println!(
                "{}: {} ({} keys)",
                outcome.identity, outcome.decision, outcome.keys
            );
        }
    }
    Ok(())
}

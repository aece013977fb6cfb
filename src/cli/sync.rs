//! # Sync and Watch Commands
//!
//! One-shot and fixed-interval syncs of secrets into a namespace, without a
//! `SecretSync` binding object.

use anyhow::{Context, Result};
use kube::Client;
use secret_sync_controller::config::{
    parse_kubernetes_duration, validation::validate_object_name, ControllerConfig,
};
use secret_sync_controller::runtime::build_policy;
use secret_sync_controller::sync::{SecretIdentity, SyncBinding};
use secret_sync_controller::trigger::{resolve_secret_name, Scheduler};
use tokio_util::sync::CancellationToken;

fn binding(source: &str, name: Option<&str>, namespace: &str) -> Result<SyncBinding> {
    let name = name.unwrap_or_else(|| resolve_secret_name(source));
    validate_object_name(name)
        .map_err(|reason| anyhow::anyhow!("Invalid Secret name: {reason}"))?;
    Ok(SyncBinding::unowned(SecretIdentity::new(
        namespace,
        name,
        source.trim(),
    )))
}

/// Cancel `token` on Ctrl-C
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        token.cancel();
    });
}

/// Run one cycle and print the decision
pub async fn sync_command(
    client: Client,
    config: ControllerConfig,
    source: String,
    name: Option<String>,
    namespace: Option<String>,
) -> Result<()> {
    let namespace = namespace.unwrap_or_else(|| config.target_namespace.clone());
    let binding = binding(&source, name.as_deref(), &namespace)?;
    let policy = build_policy(&config, client).await;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let outcome = policy
        .run(&binding, &cancel)
        .await
        .with_context(|| format!("Failed to sync {}", binding.identity))?;

    println!(
        "{}: {} ({} keys)",
        outcome.identity, outcome.decision, outcome.keys
    );
    Ok(())
}

/// Re-check secrets at a fixed interval until Ctrl-C
pub async fn watch_command(
    client: Client,
    config: ControllerConfig,
    sources: Vec<String>,
    interval: Option<String>,
    namespace: Option<String>,
) -> Result<()> {
    let namespace = namespace.unwrap_or_else(|| config.target_namespace.clone());
    let interval = match interval {
        Some(value) => parse_kubernetes_duration(&value)
            .with_context(|| format!("Invalid interval '{value}'"))?,
        None => config.reconcile_interval,
    };
    let bindings = sources
        .iter()
        .map(|source| binding(source, None, &namespace))
        .collect::<Result<Vec<_>>>()?;

    let policy = build_policy(&config, client).await;
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let cycles = Scheduler::new(policy, interval).run(bindings, cancel).await;
    println!("Stopped after {cycles} cycles");
    Ok(())
}

//! # List Command
//!
//! Command to list all SecretSync resources.

use anyhow::{Context, Result};
use kube::{api::Api, Client};
use secret_sync_controller::crd::SecretSync;

/// List all SecretSync resources
pub async fn list_command(client: Client, namespace: Option<String>) -> Result<()> {
    let api: Api<SecretSync> = if let Some(ns) = &namespace {
        println!("Listing SecretSync resources in namespace '{ns}'...");
        Api::namespaced(client, ns)
    } else {
        println!("Listing SecretSync resources in all namespaces...");
        Api::all(client)
    };

    let bindings = api
        .list(&kube::api::ListParams::default())
        .await
        .context("Failed to list SecretSync resources")?;

    if bindings.items.is_empty() {
        println!("No SecretSync resources found.");
        return Ok(());
    }

    println!(
        "\n{:<30} {:<20} {:<40} {:<10} {:<10} {:<8}",
        "NAME", "NAMESPACE", "SOURCE", "PHASE", "DECISION", "SUSPEND"
    );
    println!("{}", "-".repeat(123));

    for binding in bindings.items {
        let name = binding.metadata.name.as_deref().unwrap_or("<unknown>");
        let ns = binding.metadata.namespace.as_deref().unwrap_or("<unknown>");
        let source = binding.spec.source_secret_name.as_str();
        let suspend = if binding.spec.suspend { "Yes" } else { "No" };
        let status = binding.status.as_ref();
        let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or("Pending");
        let decision = status
            .and_then(|s| s.last_decision.as_deref())
            .unwrap_or("-");

        println!("{name:<30} {ns:<20} {source:<40} {phase:<10} {decision:<10} {suspend:<8}");
    }

    Ok(())
}

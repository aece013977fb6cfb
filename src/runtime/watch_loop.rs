//! # Watch Loop
//!
//! Controller watch loop that monitors `SecretSync` resources and the Secrets
//! they own, and triggers reconciliation when changes are detected or a
//! requeue is due.

use crate::constants::{MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::controller::reconcile;
use crate::crd::SecretSync;
use crate::runtime::error_policy::handle_reconciliation_error;
use crate::runtime::InitializationResult;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// Run the controller until a shutdown signal arrives
///
/// On SIGINT/SIGTERM the readiness probe turns unhealthy, the shutdown token is
/// cancelled so in-flight cycles stop at their next step boundary, and the
/// controller drains.
pub async fn run_watch_loop(init: InitializationResult) -> Result<(), anyhow::Error> {
    let InitializationResult {
        client,
        reconciler,
        server_state,
        shutdown,
        config,
    } = init;

    let signal_state = server_state;
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
        signal_state.mark_not_ready();
        signal_shutdown.cancel();
    });

    let bindings: Api<SecretSync> = Api::all(client.clone());
    let secrets: Api<Secret> = Api::all(client);
    let owned_selector = format!("{MANAGED_BY_LABEL}={MANAGED_BY_VALUE}");

    let watch_span = tracing::span!(
        tracing::Level::INFO,
        "controller.watch",
        operation = "watch_loop"
    );
    info!("Starting controller watch loop...");

    // No generation predicate: an edit to an owned Secret must re-run its binding
    // so drift is restored. Our own writes re-trigger once; that cycle is a NoOp
    // and status is only patched on change, so the loop settles.
    Controller::new(bindings, watcher::Config::default().any_semantic())
        .owns(secrets, watcher::Config::default().labels(&owned_selector))
        .with_config(controller::Config::default().concurrency(config.max_concurrent_reconciles))
        .graceful_shutdown_on(cancelled(shutdown))
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((obj, _)) => debug!(
                    "Reconciled {}/{}",
                    obj.namespace.as_deref().unwrap_or_default(),
                    obj.name
                ),
                Err(e) => warn!("Controller event error: {}", e),
            }
        })
        .instrument(watch_span)
        .await;

    info!("Controller stopped gracefully");
    Ok(())
}

async fn cancelled(token: CancellationToken) {
    token.cancelled().await;
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

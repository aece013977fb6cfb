//! # Initialization
//!
//! Controller initialization logic including rustls setup, configuration,
//! tracing, metrics, server startup, and Kubernetes client setup.

use crate::config::ControllerConfig;
use crate::controller::Reconciler;
use crate::observability;
use crate::provider::aws::AwsSecretsManagerSource;
use crate::provider::kubernetes::KubernetesSecretSink;
use crate::server::{start_server, ServerState};
use crate::sync::SyncPolicy;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
    /// Cancelled when a shutdown signal arrives
    pub shutdown: CancellationToken,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Install the ring crypto provider for rustls 0.23+
///
/// Must run before any TLS client is created. A provider installed earlier is kept.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Build the sync policy: AWS Secrets Manager source, Kubernetes Secret sink
pub async fn build_policy(config: &ControllerConfig, client: Client) -> SyncPolicy {
    let source =
        AwsSecretsManagerSource::new(&config.store_region, config.store_endpoint.as_deref()).await;
    let sink = KubernetesSecretSink::new(client);
    SyncPolicy::new(Arc::new(source), Arc::new(sink), config.call_timeout)
}

/// Initialize the controller runtime
///
/// Configuration is loaded and validated before anything else so an invalid
/// setting stops the process before any cycle runs.
pub async fn initialize() -> Result<InitializationResult> {
    install_crypto_provider();

    let config = ControllerConfig::from_env().context("Invalid controller configuration")?;
    observability::init_tracing(config.log_format)?;

    info!("Starting Secret Sync Controller");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        region = config.store_region.as_str(),
        reconcile_interval_secs = config.reconcile_interval.as_secs(),
        call_timeout_secs = config.call_timeout.as_secs(),
        max_concurrent_reconciles = config.max_concurrent_reconciles,
        "Loaded controller configuration"
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let shutdown = CancellationToken::new();

    let server_port = config.metrics_port;
    let server_state_clone = Arc::clone(&server_state);
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone, server_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let policy = build_policy(&config, client.clone()).await;
    let reconciler = Arc::new(Reconciler::new(
        client.clone(),
        policy,
        config.clone(),
        shutdown.clone(),
    ));

    server_state.mark_ready();
    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        server_state,
        shutdown,
        config,
    })
}

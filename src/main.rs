//! # Secret Sync Controller
//!
//! A Kubernetes controller that keeps Kubernetes Secrets in sync with secrets
//! stored in AWS Secrets Manager.
//!
//! ## Overview
//!
//! Each `SecretSync` resource binds one cloud secret to one Kubernetes Secret in
//! the same namespace. On every reconcile the controller:
//!
//! 1. **Fetches the desired value** from AWS Secrets Manager
//! 2. **Reads the current Secret**, treating a missing Secret as absent
//! 3. **Decides** whether to do nothing, create the Secret, or replace its data
//! 4. **Applies** the decision and requeues after the re-check interval
//!
//! Created Secrets carry the `app.kubernetes.io/managed-by` label and an owner
//! reference to their `SecretSync`, so deleting the binding deletes the Secret.
//!
//! Configuration is read from environment variables (see `config::ControllerConfig`).

use anyhow::Result;
use secret_sync_controller::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;
    run_watch_loop(init).await
}

//! # SecretSync Spec
//!
//! The declarative binding between a cloud secret and a Kubernetes Secret.

use serde::{Deserialize, Serialize};

/// SecretSync Custom Resource Definition
///
/// Binds one secret in the cloud secret store to one Kubernetes Secret in the
/// same namespace as the `SecretSync` object. The generated Secret is owned by
/// the binding and is garbage-collected when the binding is deleted.
///
/// # Example
///
/// ```yaml
/// apiVersion: secret-sync.io/v1
/// kind: SecretSync
/// metadata:
///   name: database-credentials
///   namespace: payments
/// spec:
///   sourceSecretName: eks-sync-database-credentials
///   reconcileInterval: 30s
/// ```
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "SecretSync",
    group = "secret-sync.io",
    version = "v1",
    namespaced,
    status = "crate::crd::SecretSyncStatus",
    shortname = "ssync",
    printcolumn = r#"{"name":"Source", "type":"string", "jsonPath":".spec.sourceSecretName"}, {"name":"Phase", "type":"string", "jsonPath":".status.phase"}, {"name":"Decision", "type":"string", "jsonPath":".status.lastDecision"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SecretSyncSpec {
    /// Name or ARN of the secret in the cloud secret store
    pub source_secret_name: String,
    /// Name of the Kubernetes Secret to materialise
    /// Defaults to the name of the SecretSync object
    #[serde(default)]
    pub name: Option<String>,
    /// Re-check interval override
    /// Format: Kubernetes duration string (e.g., "10s", "1m")
    /// Default: the controller-wide SYNC_RECONCILE_INTERVAL
    #[serde(default)]
    pub reconcile_interval: Option<String>,
    /// Suspend reconciliation
    /// When true, the controller will skip cycles for this binding
    /// Default: false (reconciliation enabled)
    #[serde(default = "default_false")]
    pub suspend: bool,
}

/// Default value for boolean false
pub fn default_false() -> bool {
    false
}

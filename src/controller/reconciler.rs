//! # Reconciler
//!
//! Runs one sync cycle per `SecretSync` object and requeues it after the
//! binding's re-check interval.
//!
//! kube-runtime never runs two reconciles for the same object concurrently,
//! so cycles for one identity are serialised here.

use crate::config::{parse_kubernetes_duration, validation::validate_object_name, ControllerConfig};
use crate::controller::status;
use crate::crd::SecretSync;
use crate::observability::metrics;
use crate::sync::{BindingOwner, SecretIdentity, SyncBinding, SyncError, SyncPolicy};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Invalid SecretSync {resource}: {reason}")]
    InvalidBinding { resource: String, reason: String },
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("Failed to update status of SecretSync {resource}: {source}")]
    Status {
        resource: String,
        #[source]
        source: kube::Error,
    },
}

/// Shared reconcile context
#[derive(Clone)]
pub struct Reconciler {
    pub client: Client,
    pub policy: SyncPolicy,
    pub config: ControllerConfig,
    /// Cancelled on shutdown; in-flight cycles stop at their next step boundary
    pub shutdown: CancellationToken,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("policy", &self.policy)
            .field("reconcile_interval", &self.config.reconcile_interval)
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        client: Client,
        policy: SyncPolicy,
        config: ControllerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            policy,
            config,
            shutdown,
        }
    }
}

fn resource_key(obj: &SecretSync) -> String {
    format!(
        "{}/{}",
        obj.namespace().unwrap_or_default(),
        obj.name_any()
    )
}

/// Build the sync binding declared by a `SecretSync` object
///
/// The sink namespace is the object's namespace, the sink name is `spec.name`
/// or the object's own name, and the object becomes the controller owner.
pub fn binding_for(obj: &SecretSync) -> Result<SyncBinding, ReconcilerError> {
    let resource = resource_key(obj);
    let invalid = |reason: String| ReconcilerError::InvalidBinding {
        resource: resource.clone(),
        reason,
    };

    let namespace = obj
        .namespace()
        .ok_or_else(|| invalid("object has no namespace".to_string()))?;

    let source_name = obj.spec.source_secret_name.trim();
    if source_name.is_empty() {
        return Err(invalid("sourceSecretName cannot be empty".to_string()));
    }

    let name = obj
        .spec
        .name
        .clone()
        .unwrap_or_else(|| obj.name_any());
    validate_object_name(&name).map_err(invalid)?;

    let identity = SecretIdentity::new(namespace, name, source_name);
    let owner = BindingOwner {
        key: resource.clone(),
        reference: obj.controller_owner_ref(&()),
    };
    Ok(SyncBinding::owned_by(identity, owner))
}

/// Re-check interval for a binding: `spec.reconcileInterval` or the controller default
pub fn effective_interval(obj: &SecretSync, default: Duration) -> Result<Duration, ReconcilerError> {
    match obj.spec.reconcile_interval.as_deref() {
        None => Ok(default),
        Some(value) => {
            parse_kubernetes_duration(value).map_err(|e| ReconcilerError::InvalidBinding {
                resource: resource_key(obj),
                reason: format!("reconcileInterval: {e}"),
            })
        }
    }
}

/// Reconcile one `SecretSync` object
pub async fn reconcile(obj: Arc<SecretSync>, ctx: Arc<Reconciler>) -> Result<Action, ReconcilerError> {
    let span = info_span!(
        "controller.reconcile",
        resource.name = obj.name_any().as_str(),
        resource.namespace = obj.namespace().unwrap_or_default().as_str(),
    );
    reconcile_inner(obj, ctx).instrument(span).await
}

async fn reconcile_inner(
    obj: Arc<SecretSync>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    metrics::increment_reconciliations();
    let api: Api<SecretSync> = Api::namespaced(
        ctx.client.clone(),
        &obj.namespace().unwrap_or_default(),
    );

    if obj.spec.suspend {
        info!("SecretSync {} is suspended, skipping sync", resource_key(&obj));
        let desired = status::suspended_status(obj.status.as_ref(), obj.metadata.generation);
        write_status(&api, &obj, desired).await?;
        return Ok(Action::await_change());
    }

    let result = match effective_interval(&obj, ctx.config.reconcile_interval)
        .and_then(|interval| Ok((interval, binding_for(&obj)?)))
    {
        Ok((interval, binding)) => ctx
            .policy
            .run(&binding, &ctx.shutdown)
            .await
            .map(|outcome| (interval, outcome))
            .map_err(ReconcilerError::from),
        Err(e) => Err(e),
    };

    if matches!(result, Err(ReconcilerError::Sync(SyncError::Cancelled))) {
        debug!("Cycle for {} cancelled by shutdown", resource_key(&obj));
        return Ok(Action::await_change());
    }

    let desired = status::cycle_status(
        obj.status.as_ref(),
        obj.metadata.generation,
        result.as_ref().map(|(_, outcome)| outcome),
    );
    write_status(&api, &obj, desired).await?;

    result.map(|(interval, _)| Action::requeue(interval))
}

async fn write_status(
    api: &Api<SecretSync>,
    obj: &SecretSync,
    desired: crate::crd::SecretSyncStatus,
) -> Result<(), ReconcilerError> {
    if !status::needs_update(obj.status.as_ref(), &desired) {
        return Ok(());
    }
    status::patch_status(api, &obj.name_any(), &desired)
        .await
        .map_err(|source| ReconcilerError::Status {
            resource: resource_key(obj),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::SecretSyncSpec;

    fn binding_object(name: Option<&str>, interval: Option<&str>) -> SecretSync {
        let mut obj = SecretSync::new(
            "db-credentials",
            SecretSyncSpec {
                source_secret_name: "eks-sync-db".to_string(),
                name: name.map(str::to_string),
                reconcile_interval: interval.map(str::to_string),
                suspend: false,
            },
        );
        obj.metadata.namespace = Some("payments".to_string());
        obj.metadata.uid = Some("7f0e3c1a-0000-4000-8000-000000000001".to_string());
        obj
    }

    #[test]
    fn test_binding_defaults_to_object_name() {
        let binding = binding_for(&binding_object(None, None)).unwrap();
        assert_eq!(
            binding.identity,
            SecretIdentity::new("payments", "db-credentials", "eks-sync-db")
        );
        let owner = binding.owner.unwrap();
        assert_eq!(owner.key, "payments/db-credentials");
        let reference = owner.reference.unwrap();
        assert_eq!(reference.kind, "SecretSync");
        assert_eq!(reference.name, "db-credentials");
        assert_eq!(reference.controller, Some(true));
    }

    #[test]
    fn test_binding_uses_spec_name() {
        let binding = binding_for(&binding_object(Some("db"), None)).unwrap();
        assert_eq!(binding.identity.name, "db");
        assert_eq!(binding.identity.namespace, "payments");
    }

    #[test]
    fn test_binding_rejects_invalid_secret_name() {
        let result = binding_for(&binding_object(Some("Not_Valid"), None));
        assert!(matches!(result, Err(ReconcilerError::InvalidBinding { .. })));
    }

    #[test]
    fn test_binding_requires_namespace() {
        let mut obj = binding_object(None, None);
        obj.metadata.namespace = None;
        assert!(matches!(
            binding_for(&obj),
            Err(ReconcilerError::InvalidBinding { .. })
        ));
    }

    #[test]
    fn test_effective_interval() {
        let default = Duration::from_secs(10);
        assert_eq!(
            effective_interval(&binding_object(None, None), default).unwrap(),
            default
        );
        assert_eq!(
            effective_interval(&binding_object(None, Some("2m")), default).unwrap(),
            Duration::from_secs(120)
        );
        assert!(effective_interval(&binding_object(None, Some("soon")), default).is_err());
    }
}

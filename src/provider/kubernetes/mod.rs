//! # Kubernetes Secret Sink
//!
//! Materializes synced payloads as `Opaque` Secrets.
//!
//! Created secrets carry the managed-by label, the source/binding annotations
//! and, when the binding is a `SecretSync` object, a controller owner reference
//! so deleting the binding garbage-collects the secret.
//! Updates replace only `data` and `type`; every other field is preserved.
//! A payload the API server rejects as invalid (422) is a malformed payload,
//! not a transient failure.

use crate::constants::{
    BINDING_ANNOTATION, MANAGED_BY_LABEL, MANAGED_BY_VALUE, SECRET_TYPE_OPAQUE, SOURCE_ANNOTATION,
};
use crate::observability::metrics;
use crate::provider::SecretSink;
use crate::sync::{SecretIdentity, SecretPayload, Store, SyncBinding, SyncDecision, SyncError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ObjectMeta, PostParams};
use kube::Client;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Kubernetes implementation of [`SecretSink`]
#[derive(Clone)]
pub struct KubernetesSecretSink {
    client: Client,
}

impl std::fmt::Debug for KubernetesSecretSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesSecretSink").finish_non_exhaustive()
    }
}

impl KubernetesSecretSink {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn create(&self, binding: &SyncBinding, desired: &SecretPayload) -> Result<(), SyncError> {
        let identity = &binding.identity;
        let secret = build_secret(binding, desired);
        self.api(&identity.namespace)
            .create(&PostParams::default(), &secret)
            .await
            .map_err(|e| classify_kube_error(&identity.name, e))?;
        info!(
            secret.namespace = identity.namespace.as_str(),
            secret.name = identity.name.as_str(),
            "Created Kubernetes secret {}",
            identity.name
        );
        Ok(())
    }

    async fn update(&self, identity: &SecretIdentity, desired: &SecretPayload) -> Result<(), SyncError> {
        let api = self.api(&identity.namespace);
        let existing = api
            .get(&identity.name)
            .await
            .map_err(|e| classify_kube_error(&identity.name, e))?;
        let updated = replace_payload(existing, desired);
        // replace() carries the resourceVersion we read; a concurrent writer yields 409.
        api.replace(&identity.name, &PostParams::default(), &updated)
            .await
            .map_err(|e| classify_kube_error(&identity.name, e))?;
        info!(
            secret.namespace = identity.namespace.as_str(),
            secret.name = identity.name.as_str(),
            "Updated Kubernetes secret {}",
            identity.name
        );
        Ok(())
    }
}

#[async_trait]
impl SecretSink for KubernetesSecretSink {
    async fn fetch(&self, identity: &SecretIdentity) -> Result<SecretPayload, SyncError> {
        let start = Instant::now();
        let secret = self
            .api(&identity.namespace)
            .get(&identity.name)
            .await
            .map_err(|e| {
                let err = classify_kube_error(&identity.name, e);
                if !err.is_sink_not_found() {
                    metrics::increment_store_operation_errors(Store::Sink);
                }
                err
            })?;
        metrics::record_store_operation(Store::Sink, "get", start.elapsed().as_secs_f64());
        Ok(SecretPayload::from_secret_data(secret.data.as_ref()))
    }

    async fn apply(
        &self,
        binding: &SyncBinding,
        desired: &SecretPayload,
        decision: SyncDecision,
    ) -> Result<(), SyncError> {
        let start = Instant::now();
        let result = match decision {
            SyncDecision::NoOp => return Ok(()),
            SyncDecision::Create => self.create(binding, desired).await,
            SyncDecision::Update => self.update(&binding.identity, desired).await,
        };
        match &result {
            Ok(()) => metrics::record_store_operation(
                Store::Sink,
                &decision.as_str().to_lowercase(),
                start.elapsed().as_secs_f64(),
            ),
            Err(_) => metrics::increment_store_operation_errors(Store::Sink),
        }
        result
    }
}

/// Build the Secret created for a binding that has no sink secret yet
#[must_use]
pub fn build_secret(binding: &SyncBinding, desired: &SecretPayload) -> Secret {
    let identity = &binding.identity;

    let mut labels = BTreeMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

    let mut annotations = BTreeMap::new();
    annotations.insert(SOURCE_ANNOTATION.to_string(), identity.source_name.clone());

    let mut owner_references = None;
    if let Some(owner) = &binding.owner {
        annotations.insert(BINDING_ANNOTATION.to_string(), owner.key.clone());
        owner_references = owner.reference.clone().map(|reference| vec![reference]);
    }

    Secret {
        metadata: ObjectMeta {
            name: Some(identity.name.clone()),
            namespace: Some(identity.namespace.clone()),
            labels: Some(labels),
            annotations: Some(annotations),
            owner_references,
            ..ObjectMeta::default()
        },
        data: Some(desired.to_secret_data()),
        type_: Some(SECRET_TYPE_OPAQUE.to_string()),
        ..Secret::default()
    }
}

/// Overwrite the payload and type of an existing Secret, keeping everything else
#[must_use]
pub fn replace_payload(mut existing: Secret, desired: &SecretPayload) -> Secret {
    existing.data = Some(desired.to_secret_data());
    existing.string_data = None;
    existing.type_ = Some(SECRET_TYPE_OPAQUE.to_string());
    existing
}

/// Map a Kubernetes API failure onto the sync error taxonomy
fn classify_kube_error(name: &str, err: kube::Error) -> SyncError {
    match err {
        kube::Error::Api(api_err) => match api_err.code {
            404 => SyncError::not_found(Store::Sink, name),
            401 | 403 => SyncError::unauthorized(Store::Sink, name, api_err.message),
            // Rejected by API validation; retrying the same payload cannot succeed
            422 => SyncError::malformed(name, api_err.message),
            _ => SyncError::unavailable(
                Store::Sink,
                name,
                format!("{} ({})", api_err.message, api_err.code),
            ),
        },
        other => SyncError::unavailable(Store::Sink, name, other.to_string()),
    }
}

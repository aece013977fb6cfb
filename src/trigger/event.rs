//! # Event Trigger
//!
//! Handles secret-change notifications delivered by the cloud event bus.
//!
//! The secret named by `detail.requestParameters.secretId` is synced into the
//! configured target namespace when its name carries the configured prefix.
//! Errors are returned to the caller so the event system can redeliver.

use crate::config::{validation::validate_object_name, ControllerConfig};
use crate::observability::metrics;
use crate::sync::{SecretIdentity, SyncBinding, SyncError, SyncOutcome, SyncPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

/// Secret-change notification envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecretChangeEvent {
    #[serde(rename = "detail-type", default)]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub detail: EventDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(default)]
    pub event_source: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    #[serde(default)]
    pub secret_id: Option<String>,
}

impl SecretChangeEvent {
    /// Parse an event envelope from JSON
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        serde_json::from_str(json).map_err(|e| EventError::Malformed(e.to_string()))
    }

    /// The raw `secretId` (name or ARN), if present and non-empty
    pub fn secret_id(&self) -> Option<&str> {
        self.detail
            .request_parameters
            .as_ref()
            .and_then(|params| params.secret_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed event: {0}")]
    Malformed(String),
    #[error("Secret name '{name}' is not a valid Kubernetes object name: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The secret does not carry the configured prefix
    Skipped { secret_name: String },
    Synced(SyncOutcome),
}

/// Resolve a `secretId` to a secret name
///
/// ARNs (`arn:<partition>:secretsmanager:<region>:<account>:secret:<name>-<suffix>`)
/// resolve to `<name>`, dropping the six-character suffix the store appends.
/// Plain names are returned unchanged.
pub fn resolve_secret_name(secret_id: &str) -> &str {
    let id = secret_id.trim();
    if !id.starts_with("arn:") {
        return id;
    }
    match id.split_once(":secret:") {
        Some((_, resource)) => strip_random_suffix(resource),
        None => id,
    }
}

fn strip_random_suffix(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() == 6
                && suffix.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            base
        }
        _ => name,
    }
}

/// Syncs the secret named by a change event into the target namespace
#[derive(Debug, Clone)]
pub struct EventTrigger {
    policy: SyncPolicy,
    name_prefix_filter: String,
    target_namespace: String,
}

impl EventTrigger {
    pub fn new(
        policy: SyncPolicy,
        name_prefix_filter: impl Into<String>,
        target_namespace: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            name_prefix_filter: name_prefix_filter.into(),
            target_namespace: target_namespace.into(),
        }
    }

    pub fn from_config(policy: SyncPolicy, config: &ControllerConfig) -> Self {
        Self::new(
            policy,
            config.name_prefix_filter.clone(),
            config.target_namespace.clone(),
        )
    }

    /// Binding for an event, or `None` when the secret is filtered out
    pub fn binding_for(&self, event: &SecretChangeEvent) -> Result<Option<SyncBinding>, EventError> {
        let secret_id = event.secret_id().ok_or_else(|| {
            EventError::Malformed("detail.requestParameters.secretId is missing".to_string())
        })?;
        let name = resolve_secret_name(secret_id);

        if !name.starts_with(&self.name_prefix_filter) {
            return Ok(None);
        }
        validate_object_name(name).map_err(|reason| EventError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        Ok(Some(SyncBinding::unowned(SecretIdentity::new(
            self.target_namespace.clone(),
            name,
            name,
        ))))
    }

    /// Handle one event: resolve, filter, and run a single cycle
    pub async fn handle(
        &self,
        event: &SecretChangeEvent,
        cancel: &CancellationToken,
    ) -> Result<EventOutcome, EventError> {
        let span = info_span!(
            "event.handle",
            event.name = event.detail.event_name.as_deref().unwrap_or("unknown"),
        );
        let result = self.handle_inner(event, cancel).instrument(span).await;
        match &result {
            Ok(EventOutcome::Skipped { .. }) => metrics::record_event("skipped"),
            Ok(EventOutcome::Synced(_)) => metrics::record_event("synced"),
            Err(e) => {
                warn!(error = %e, "Failed to handle secret change event");
                metrics::record_event("failed");
            }
        }
        result
    }

    async fn handle_inner(
        &self,
        event: &SecretChangeEvent,
        cancel: &CancellationToken,
    ) -> Result<EventOutcome, EventError> {
        let Some(binding) = self.binding_for(event)? else {
            let secret_name = event
                .secret_id()
                .map(resolve_secret_name)
                .unwrap_or_default()
                .to_string();
            info!(
                "Skipping secret {}: name does not start with '{}'",
                secret_name, self.name_prefix_filter
            );
            return Ok(EventOutcome::Skipped { secret_name });
        };

        let outcome = self.policy.run(&binding, cancel).await?;
        Ok(EventOutcome::Synced(outcome))
    }
}

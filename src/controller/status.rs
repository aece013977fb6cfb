//! # Status
//!
//! Computes and writes `SecretSync` status. Status is only patched when the
//! phase, decision, error or observed generation changes, so a steady-state
//! `NoOp` cycle causes no write and no extra watch event.

use crate::constants::CONTROLLER_NAME;
use crate::controller::ReconcilerError;
use crate::crd::{
    Condition, SecretSync, SecretSyncStatus, PHASE_FAILED, PHASE_SUSPENDED, PHASE_SYNCED,
};
use crate::sync::SyncOutcome;
use kube::api::{Patch, PatchParams};
use kube::Api;
use tracing::debug;

const CONDITION_READY: &str = "Ready";

/// Status after a completed (or failed) cycle
pub fn cycle_status(
    existing: Option<&SecretSyncStatus>,
    generation: Option<i64>,
    result: Result<&SyncOutcome, &ReconcilerError>,
) -> SecretSyncStatus {
    match result {
        Ok(outcome) => build(
            existing,
            generation,
            PHASE_SYNCED,
            ReadyState {
                status: "True",
                reason: "Synced",
                message: format!(
                    "{} ({} keys): {}",
                    outcome.identity, outcome.keys, outcome.decision
                ),
            },
            Some(outcome.decision.as_str().to_string()),
            None,
        ),
        Err(error) => build(
            existing,
            generation,
            PHASE_FAILED,
            ReadyState {
                status: "False",
                reason: failure_reason(error),
                message: error.to_string(),
            },
            existing.and_then(|s| s.last_decision.clone()),
            Some(error.to_string()),
        ),
    }
}

/// Status of a suspended binding
pub fn suspended_status(
    existing: Option<&SecretSyncStatus>,
    generation: Option<i64>,
) -> SecretSyncStatus {
    build(
        existing,
        generation,
        PHASE_SUSPENDED,
        ReadyState {
            status: "False",
            reason: "Suspended",
            message: "Reconciliation is suspended".to_string(),
        },
        existing.and_then(|s| s.last_decision.clone()),
        None,
    )
}

/// Whether `desired` differs from `existing` in a field worth a write
pub fn needs_update(existing: Option<&SecretSyncStatus>, desired: &SecretSyncStatus) -> bool {
    let Some(existing) = existing else {
        return true;
    };
    existing.phase != desired.phase
        || existing.last_decision != desired.last_decision
        || existing.last_error != desired.last_error
        || existing.observed_generation != desired.observed_generation
}

/// Merge-patch the status subresource. A binding deleted mid-cycle is not an error.
pub async fn patch_status(
    api: &Api<SecretSync>,
    name: &str,
    status: &SecretSyncStatus,
) -> Result<(), kube::Error> {
    let patch = serde_json::json!({ "status": status });
    match api
        .patch_status(name, &PatchParams::apply(CONTROLLER_NAME), &Patch::Merge(patch))
        .await
    {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
            debug!("SecretSync {} was deleted during reconciliation, skipping status update", name);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

struct ReadyState {
    status: &'static str,
    reason: &'static str,
    message: String,
}

fn failure_reason(error: &ReconcilerError) -> &'static str {
    match error {
        ReconcilerError::InvalidBinding { .. } => "InvalidBinding",
        ReconcilerError::Sync(e) => match e.kind() {
            crate::sync::ErrorKind::NotFound => "NotFound",
            crate::sync::ErrorKind::Unauthorized => "Unauthorized",
            crate::sync::ErrorKind::Unavailable => "Unavailable",
            crate::sync::ErrorKind::MalformedPayload => "MalformedPayload",
            crate::sync::ErrorKind::Cancelled => "Cancelled",
        },
        ReconcilerError::Status { .. } => "StatusUpdateFailed",
    }
}

fn build(
    existing: Option<&SecretSyncStatus>,
    generation: Option<i64>,
    phase: &str,
    ready: ReadyState,
    last_decision: Option<String>,
    last_error: Option<String>,
) -> SecretSyncStatus {
    // Keep the transition time while the phase is unchanged
    let last_transition_time = existing
        .filter(|s| s.phase.as_deref() == Some(phase))
        .and_then(|s| s.last_transition_time.clone())
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    SecretSyncStatus {
        phase: Some(phase.to_string()),
        conditions: vec![Condition {
            r#type: CONDITION_READY.to_string(),
            status: ready.status.to_string(),
            last_transition_time: Some(last_transition_time.clone()),
            reason: Some(ready.reason.to_string()),
            message: Some(ready.message),
        }],
        observed_generation: generation,
        last_decision,
        last_error,
        last_transition_time: Some(last_transition_time),
    }
}

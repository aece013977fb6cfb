//! # Error Policy
//!
//! Failed reconciles are requeued after the binding's normal re-check
//! interval. There is no backoff and no circuit breaker.

use crate::controller::{effective_interval, Reconciler, ReconcilerError};
use crate::crd::SecretSync;
use crate::observability;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Handle a reconciliation error by requeueing after the fixed interval
pub fn handle_reconciliation_error(
    obj: Arc<SecretSync>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str(),
        error = %error
    );
    let _error_guard = error_span.enter();

    let retry_in = retry_interval(&obj, ctx.config.reconcile_interval);
    error!(
        retry_in_secs = retry_in.as_secs(),
        "Reconciliation error for {}/{}: {}", namespace, name, error
    );
    observability::metrics::increment_reconciliation_errors();

    Action::requeue(retry_in)
}

/// Interval before the next attempt; an unparsable override falls back to the default
pub fn retry_interval(obj: &SecretSync, default: Duration) -> Duration {
    effective_interval(obj, default).unwrap_or(default)
}

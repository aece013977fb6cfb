//! # Metrics
//!
//! Prometheus metrics for monitoring the sync process.
//!
//! ## Metrics Exposed
//!
//! - `secret_sync_cycles_total` - Completed sync cycles by decision (`NoOp`, `Create`, `Update`)
//! - `secret_sync_cycle_errors_total` - Failed sync cycles by error kind
//! - `secret_sync_cycle_duration_seconds` - Duration of sync cycles
//! - `secret_sync_reconciliations_total` - Total number of binding reconciliations
//! - `secret_sync_reconciliation_errors_total` - Total number of failed binding reconciliations
//! - `secret_sync_events_total` - Change events handled by outcome
//! - `secret_sync_store_operations_total` - Source/sink calls by store and operation
//! - `secret_sync_store_operation_duration_seconds` - Duration of source/sink calls
//! - `secret_sync_store_operation_errors_total` - Failed source/sink calls by store

use crate::sync::{ErrorKind, Store, SyncDecision};
use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static CYCLES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_sync_cycles_total",
            "Total number of completed sync cycles by decision",
        ),
        &["decision"],
    )
    .expect("Failed to create CYCLES_TOTAL metric - this should never happen")
});

static CYCLE_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_sync_cycle_errors_total",
            "Total number of failed sync cycles by error kind",
        ),
        &["kind"],
    )
    .expect("Failed to create CYCLE_ERRORS_TOTAL metric - this should never happen")
});

static CYCLE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "secret_sync_cycle_duration_seconds",
            "Duration of sync cycles in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create CYCLE_DURATION metric - this should never happen")
});

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_sync_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_sync_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static EVENTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_sync_events_total",
            "Total number of change events handled by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create EVENTS_TOTAL metric - this should never happen")
});

static STORE_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_sync_store_operations_total",
            "Total number of store operations by store and operation",
        ),
        &["store", "operation"],
    )
    .expect("Failed to create STORE_OPERATIONS_TOTAL metric - this should never happen")
});

static STORE_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "secret_sync_store_operation_duration_seconds",
            "Duration of store operations in seconds by store",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["store"],
    )
    .expect("Failed to create STORE_OPERATION_DURATION metric - this should never happen")
});

static STORE_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_sync_store_operation_errors_total",
            "Total number of store operation errors by store",
        ),
        &["store"],
    )
    .expect("Failed to create STORE_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
/// Register every metric with [`REGISTRY`]. Fails if called twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CYCLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_DURATION.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(EVENTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(STORE_OPERATION_ERRORS_TOTAL.clone()))?;
    Ok(())
}

pub fn record_cycle(decision: SyncDecision, duration: f64) {
    CYCLES_TOTAL.with_label_values(&[decision.as_str()]).inc();
    CYCLE_DURATION.observe(duration);
}

pub fn record_cycle_error(kind: ErrorKind, duration: f64) {
    CYCLE_ERRORS_TOTAL.with_label_values(&[kind.as_str()]).inc();
    CYCLE_DURATION.observe(duration);
}

/// Current value of `secret_sync_cycle_errors_total` for one error kind
#[cfg(test)]
pub(crate) fn cycle_error_count(kind: ErrorKind) -> u64 {
    CYCLE_ERRORS_TOTAL.with_label_values(&[kind.as_str()]).get()
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

/// Record a handled change event (`synced`, `skipped` or `failed`)
pub fn record_event(outcome: &str) {
    EVENTS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a successful source/sink call
pub fn record_store_operation(store: Store, operation: &str, duration: f64) {
    STORE_OPERATIONS_TOTAL
        .with_label_values(&[store.as_str(), operation])
        .inc();
    STORE_OPERATION_DURATION
        .with_label_values(&[store.as_str()])
        .observe(duration);
}

pub fn increment_store_operation_errors(store: Store) {
    STORE_OPERATION_ERRORS_TOTAL
        .with_label_values(&[store.as_str()])
        .inc();
}

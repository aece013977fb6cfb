//! # Sync Policy
//!
//! Runs one fetch-diff-apply cycle for one binding:
//!
//! 1. Fetch the desired payload from the source
//! 2. Fetch the observed payload from the sink (missing is "absent")
//! 3. Decide NoOp / Create / Update
//! 4. Apply the decision to the sink
//!
//! Any error before step 4 aborts the cycle without touching the sink.
//! Nothing is retried here; triggers schedule the next cycle.

use crate::observability::metrics;
use crate::provider::{SecretSink, SecretSource};
use crate::sync::diff::{decide, SyncDecision};
use crate::sync::error::{Store, SyncError};
use crate::sync::payload::{SecretIdentity, SecretPayload, SyncBinding};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Outcome of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub identity: SecretIdentity,
    pub decision: SyncDecision,
    /// Number of keys in the desired payload
    pub keys: usize,
}

/// Result of one cycle, either the decision taken or a classified failure
pub type SyncResult = Result<SyncOutcome, SyncError>;

/// Orchestrates SecretSource -> decide -> SecretSink for one binding per call
///
/// Stateless between calls; callers must not run two cycles for the same identity at once.
#[derive(Clone)]
pub struct SyncPolicy {
    source: Arc<dyn SecretSource>,
    sink: Arc<dyn SecretSink>,
    call_timeout: Duration,
}

impl std::fmt::Debug for SyncPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncPolicy")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl SyncPolicy {
    pub fn new(
        source: Arc<dyn SecretSource>,
        sink: Arc<dyn SecretSink>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            call_timeout,
        }
    }

    /// Run one cycle for `binding`
    ///
    /// Cancellation is honoured before each fetch and before apply. Once the
    /// write has started it runs to completion.
    pub async fn run(&self, binding: &SyncBinding, cancel: &CancellationToken) -> SyncResult {
        let identity = &binding.identity;
        let span = info_span!(
            "sync.cycle",
            secret.source = identity.source_name.as_str(),
            secret.namespace = identity.namespace.as_str(),
            secret.name = identity.name.as_str(),
        );
        let start = Instant::now();

        let result = self.run_steps(binding, cancel).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(outcome) => {
                metrics::record_cycle(outcome.decision, start.elapsed().as_secs_f64());
                if outcome.decision.is_write() {
                    info!(
                        decision = outcome.decision.as_str(),
                        keys = outcome.keys,
                        "Synced secret {}",
                        identity
                    );
                } else {
                    debug!(decision = outcome.decision.as_str(), "Secret {} is up to date", identity);
                }
            }
            // Shutdown, not a failure
            Err(SyncError::Cancelled) => debug!("Sync cycle cancelled for {}", identity),
            Err(e) => {
                metrics::record_cycle_error(e.kind(), start.elapsed().as_secs_f64());
                warn!(error.kind = e.kind().as_str(), error = %e, "Sync cycle failed for {}", identity);
            }
        }
        result
    }

    async fn run_steps(&self, binding: &SyncBinding, cancel: &CancellationToken) -> SyncResult {
        let identity = &binding.identity;

        let desired = self
            .bounded(Store::Source, &identity.source_name, cancel, async {
                self.source.fetch(&identity.source_name).await
            })
            .await?;

        let observed = match self
            .bounded(Store::Sink, &identity.name, cancel, async {
                self.sink.fetch(identity).await
            })
            .await
        {
            Ok(payload) => Some(payload),
            Err(e) if e.is_sink_not_found() => None,
            Err(e) => return Err(e),
        };

        let decision = decide(&desired, observed.as_ref());
        debug!(decision = decision.as_str(), "Computed sync decision");

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        if decision.is_write() {
            self.sink.apply(binding, &desired, decision).await?;
        }

        Ok(SyncOutcome {
            identity: identity.clone(),
            decision,
            keys: desired.len(),
        })
    }

    /// Run a read call under the per-call timeout, abandoning it on cancellation
    async fn bounded<F>(
        &self,
        store: Store,
        name: &str,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<SecretPayload, SyncError>
    where
        F: Future<Output = Result<SecretPayload, SyncError>>,
    {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        tokio::select! {
            () = cancel.cancelled() => Err(SyncError::Cancelled),
            result = tokio::time::timeout(self.call_timeout, call) => match result {
                Ok(inner) => inner,
                Err(_) => Err(SyncError::TimedOut {
                    store,
                    name: name.to_string(),
                    after: self.call_timeout,
                }),
            },
        }
    }
}

//! # Scheduler
//!
//! Fixed-interval re-check of a static set of bindings.
//!
//! Each binding gets its own task that runs a cycle, waits the interval and
//! repeats, whatever the cycle's outcome. Cycles for one binding never overlap.
//! Cancelling the token stops every task at its next wait or step boundary.

use crate::sync::{SyncBinding, SyncError, SyncPolicy};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: SyncPolicy,
    interval: Duration,
}

impl Scheduler {
    pub fn new(policy: SyncPolicy, interval: Duration) -> Self {
        Self { policy, interval }
    }

    /// Run every binding until `cancel` fires. Returns the number of cycles run;
    /// a cycle cut short by cancellation is not counted.
    pub async fn run(&self, bindings: Vec<SyncBinding>, cancel: CancellationToken) -> u64 {
        info!(
            bindings = bindings.len(),
            interval_secs = self.interval.as_secs(),
            "Starting fixed-interval scheduler"
        );

        let mut tasks = JoinSet::new();
        for binding in bindings {
            let policy = self.policy.clone();
            let interval = self.interval;
            let cancel = cancel.clone();
            tasks.spawn(async move { run_binding(policy, binding, interval, cancel).await });
        }

        let mut cycles = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(count) => cycles += count,
                Err(e) => debug!("Scheduler task ended abnormally: {}", e),
            }
        }
        info!(cycles, "Scheduler stopped");
        cycles
    }
}

/// Run cycles for one binding until cancelled
pub async fn run_binding(
    policy: SyncPolicy,
    binding: SyncBinding,
    interval: Duration,
    cancel: CancellationToken,
) -> u64 {
    let mut cycles = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }
        // Outcome is logged and counted by the policy; the schedule is the same either way
        if let Err(SyncError::Cancelled) = policy.run(&binding, &cancel).await {
            break;
        }
        cycles += 1;

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }
    debug!("Stopped re-checking {}", binding.identity);
    cycles
}

//! # Diff Policy
//!
//! Decides whether the sink needs a write for the current cycle.

use crate::sync::payload::SecretPayload;
use std::fmt;

/// Action chosen for one cycle. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDecision {
    NoOp,
    Create,
    Update,
}

impl SyncDecision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDecision::NoOp => "NoOp",
            SyncDecision::Create => "Create",
            SyncDecision::Update => "Update",
        }
    }

    /// Whether applying this decision writes to the sink
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, SyncDecision::NoOp)
    }
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare the desired payload against what the sink currently holds.
///
/// An update always replaces the whole payload, so a size mismatch alone
/// forces an update even though only the desired keys are walked below.
#[must_use]
pub fn decide(desired: &SecretPayload, observed: Option<&SecretPayload>) -> SyncDecision {
    let Some(observed) = observed else {
        return SyncDecision::Create;
    };

    if desired.len() != observed.len() {
        return SyncDecision::Update;
    }

    let differs = desired
        .iter()
        .any(|(key, value)| observed.get(key) != Some(value));

    if differs {
        SyncDecision::Update
    } else {
        SyncDecision::NoOp
    }
}

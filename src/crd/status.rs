//! # SecretSync Status
//!
//! Status types for tracking the outcome of the latest sync cycle.

use serde::{Deserialize, Serialize};

pub const PHASE_PENDING: &str = "Pending";
pub const PHASE_SYNCED: &str = "Synced";
pub const PHASE_FAILED: &str = "Failed";
pub const PHASE_SUSPENDED: &str = "Suspended";

/// Status of the SecretSync resource
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSyncStatus {
    /// Current phase
    /// Values: Pending, Synced, Failed, Suspended
    #[serde(default)]
    pub phase: Option<String>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Observed generation
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Decision taken by the latest successful cycle (NoOp, Create, Update)
    #[serde(default)]
    pub last_decision: Option<String>,
    /// Error reported by the latest failed cycle
    #[serde(default)]
    pub last_error: Option<String>,
    /// Time of the latest phase transition (RFC3339)
    #[serde(default)]
    pub last_transition_time: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

//! # Provider Modules
//!
//! Contracts for the two external stores a sync cycle talks to, and their implementations.
//!
//! - `SecretSource` reads the desired secret from the cloud secret store
//! - `SecretSink` reads and writes the materialized secret in the cluster
//!
//! Implementations are stateless request issuers and are shared across
//! concurrent cycles for different identities.

use crate::sync::{SecretIdentity, SecretPayload, SyncBinding, SyncDecision, SyncError};
use async_trait::async_trait;

/// Provider trait for the store holding the desired secret values
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the current value of the named secret
    ///
    /// Fails with `NotFound`, `Unauthorized`, `Unavailable` or `MalformedPayload`.
    async fn fetch(&self, source_name: &str) -> Result<SecretPayload, SyncError>;
}

/// Provider trait for the runtime where secrets are materialized
#[async_trait]
pub trait SecretSink: Send + Sync {
    /// Read the materialized secret; a missing secret is `SyncError::NotFound` with `Store::Sink`
    async fn fetch(&self, identity: &SecretIdentity) -> Result<SecretPayload, SyncError>;

    /// Execute the decision: create, fully replace payload and type, or do nothing
    async fn apply(
        &self,
        binding: &SyncBinding,
        desired: &SecretPayload,
        decision: SyncDecision,
    ) -> Result<(), SyncError>;
}

pub mod aws;
pub mod kubernetes;

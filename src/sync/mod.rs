//! # Secret Synchronization
//!
//! The reconciliation policy shared by every trigger: payload types, the diff
//! decision, the cycle orchestration and the error taxonomy.

pub mod diff;
pub mod error;
pub mod payload;
pub mod policy;

pub use diff::{decide, SyncDecision};
pub use error::{ErrorKind, Store, SyncError};
pub use payload::{BindingOwner, SecretIdentity, SecretPayload, SyncBinding, BINARY_SECRET_KEY};
pub use policy::{SyncOutcome, SyncPolicy, SyncResult};

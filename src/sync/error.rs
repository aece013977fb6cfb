//! # Sync Errors
//!
//! Error taxonomy shared by the source, the sink and the sync policy.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which external store an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    Source,
    Sink,
}

impl Store {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::Source => "source",
            Store::Sink => "sink",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure class, used for log fields and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Unavailable,
    MalformedPayload,
    Cancelled,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Error returned by one step of a sync cycle.
///
/// None of these are retried by the policy; the trigger decides when to run again.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{store} secret '{name}' not found")]
    NotFound { store: Store, name: String },

    #[error("not authorized to access {store} secret '{name}': {message}")]
    Unauthorized {
        store: Store,
        name: String,
        message: String,
    },

    #[error("{store} unavailable while accessing '{name}': {message}")]
    Unavailable {
        store: Store,
        name: String,
        message: String,
    },

    #[error("secret '{name}' has a malformed payload: {reason}")]
    MalformedPayload { name: String, reason: String },

    #[error("{store} call for '{name}' timed out after {after:?}")]
    TimedOut {
        store: Store,
        name: String,
        after: Duration,
    },

    #[error("sync cycle cancelled")]
    Cancelled,
}

impl SyncError {
    pub fn not_found(store: Store, name: impl Into<String>) -> Self {
        SyncError::NotFound {
            store,
            name: name.into(),
        }
    }

    pub fn unauthorized(store: Store, name: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Unauthorized {
            store,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(store: Store, name: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Unavailable {
            store,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::MalformedPayload {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Failure class of this error; timeouts count as unavailability
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NotFound { .. } => ErrorKind::NotFound,
            SyncError::Unauthorized { .. } => ErrorKind::Unauthorized,
            SyncError::Unavailable { .. } | SyncError::TimedOut { .. } => ErrorKind::Unavailable,
            SyncError::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            SyncError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// True only for a missing secret in the sink, which the policy treats as "absent"
    #[must_use]
    pub fn is_sink_not_found(&self) -> bool {
        matches!(
            self,
            SyncError::NotFound {
                store: Store::Sink,
                ..
            }
        )
    }
}

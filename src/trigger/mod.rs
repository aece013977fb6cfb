//! # Triggers
//!
//! Drivers that invoke the sync policy outside the Kubernetes controller:
//!
//! - `event`: one cycle per secret-change notification
//! - `scheduler`: fixed-interval cycles for a static set of bindings

pub mod event;
pub mod scheduler;

pub use event::{resolve_secret_name, EventError, EventOutcome, EventTrigger, SecretChangeEvent};
pub use scheduler::Scheduler;

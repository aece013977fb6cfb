//! # Controller
//!
//! Timer-driven trigger: reconciles `SecretSync` bindings and reports their status.

pub mod reconciler;
pub mod status;

pub use reconciler::{
    binding_for, effective_interval, reconcile, Reconciler, ReconcilerError,
};

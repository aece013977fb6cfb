//! Secret Sync Controller Library
//!
//! Keeps Kubernetes Secrets in sync with secrets held in a cloud secret store.
//!
//! The reconciliation policy lives in [`sync`]: fetch the desired payload from a
//! [`provider::SecretSource`], read the observed payload from a
//! [`provider::SecretSink`], decide NoOp/Create/Update and apply. Triggers call
//! into it: the Kubernetes [`controller`] for `SecretSync` bindings, and the
//! event handler and fixed-interval scheduler in [`trigger`].

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod provider;
pub mod runtime;
pub mod server;
pub mod sync;
pub mod trigger;

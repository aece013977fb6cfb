//! # Runtime
//!
//! Controller start-up and the watch loop that drives reconciliation.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use initialization::{build_policy, initialize, InitializationResult};
pub use watch_loop::run_watch_loop;

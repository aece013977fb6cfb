//! # Configuration
//!
//! Controller configuration, duration parsing and Kubernetes name validation.

pub mod controller;
pub mod duration;
pub mod validation;

pub use controller::{ConfigError, ControllerConfig, LogFormat};
pub use duration::{parse_kubernetes_duration, DurationError};

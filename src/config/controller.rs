//! # Controller Configuration
//!
//! Start-up settings loaded from environment variables and validated once.
//! Environment variables are populated from a ConfigMap using `envFrom` in the deployment.

use crate::config::duration::{parse_kubernetes_duration, DurationError};
use crate::config::validation::validate_namespace;
use crate::constants::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENT_RECONCILES, DEFAULT_METRICS_PORT,
    DEFAULT_NAME_PREFIX, DEFAULT_RECONCILE_INTERVAL, DEFAULT_TARGET_NAMESPACE,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("store region is required: set SYNC_STORE_REGION or AWS_REGION")]
    MissingRegion,
    #[error("{key} is invalid: {source}")]
    InvalidDuration {
        key: &'static str,
        #[source]
        source: DurationError,
    },
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("SYNC_TARGET_NAMESPACE is invalid: {0}")]
    InvalidNamespace(String),
    #[error("LOG_FORMAT must be 'json' or 'text', got '{0}'")]
    InvalidLogFormat(String),
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Controller-level configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Region of the cloud secret store
    pub store_region: String,
    /// Endpoint override for the secret store (local stacks, contract tests)
    pub store_endpoint: Option<String>,
    /// Prefix a secret name must start with for the event trigger to sync it
    pub name_prefix_filter: String,
    /// Namespace for secrets synced without a binding object
    pub target_namespace: String,
    /// Delay between cycles for the same identity
    pub reconcile_interval: Duration,
    /// Timeout applied to each source/sink read
    pub call_timeout: Duration,
    /// Maximum reconciles running at once across bindings
    pub max_concurrent_reconciles: u16,
    /// Port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    pub log_format: LogFormat,
}

impl ControllerConfig {
    /// Load configuration from environment variables, failing fast on invalid values
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store_region = get("SYNC_STORE_REGION")
            .or_else(|| get("AWS_REGION"))
            .ok_or(ConfigError::MissingRegion)?;

        let target_namespace =
            get("SYNC_TARGET_NAMESPACE").unwrap_or_else(|| DEFAULT_TARGET_NAMESPACE.to_string());
        validate_namespace(&target_namespace).map_err(ConfigError::InvalidNamespace)?;

        let log_format = get("LOG_FORMAT")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or(LogFormat::Json);

        Ok(Self {
            store_region: store_region.trim().to_string(),
            store_endpoint: get("SYNC_STORE_ENDPOINT"),
            name_prefix_filter: get("SYNC_NAME_PREFIX")
                .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string()),
            target_namespace,
            reconcile_interval: duration_or_default(
                "SYNC_RECONCILE_INTERVAL",
                get("SYNC_RECONCILE_INTERVAL"),
                DEFAULT_RECONCILE_INTERVAL,
            )?,
            call_timeout: duration_or_default(
                "SYNC_CALL_TIMEOUT",
                get("SYNC_CALL_TIMEOUT"),
                DEFAULT_CALL_TIMEOUT,
            )?,
            max_concurrent_reconciles: number_or_default(
                "SYNC_MAX_CONCURRENT_RECONCILES",
                get("SYNC_MAX_CONCURRENT_RECONCILES"),
                DEFAULT_MAX_CONCURRENT_RECONCILES,
            )?,
            metrics_port: number_or_default(
                "METRICS_PORT",
                get("METRICS_PORT"),
                DEFAULT_METRICS_PORT,
            )?,
            log_format,
        })
    }
}

fn duration_or_default(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<Duration, ConfigError> {
    parse_kubernetes_duration(value.as_deref().unwrap_or(default))
        .map_err(|source| ConfigError::InvalidDuration { key, source })
}

fn number_or_default<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

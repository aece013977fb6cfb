//! # Kubernetes Name Validation
//!
//! Validates Kubernetes object names and namespaces per RFC 1123, and Secret data keys.

use regex::Regex;
use std::sync::LazyLock;

static SUBDOMAIN_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").ok()
});

static LABEL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").ok());

static SECRET_KEY_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[-._a-zA-Z0-9]+$").ok());

/// Validate a Secret `data` key (`[-._a-zA-Z0-9]+`, at most 253 characters)
pub fn validate_secret_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }
    if key.len() > 253 {
        return Err(format!(
            "key exceeds maximum length of 253 characters (got {})",
            key.len()
        ));
    }
    if key == "." || key == ".." {
        return Err(format!("key '{key}' is not allowed"));
    }
    if !SECRET_KEY_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(key))
    {
        return Err(format!(
            "key '{key}' must consist of alphanumeric characters, '-', '_' or '.'"
        ));
    }
    Ok(())
}

/// Validate a Kubernetes object name (RFC 1123 subdomain, 1-253 characters)
pub fn validate_object_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if name.len() > 253 {
        return Err(format!(
            "name '{name}' exceeds maximum length of 253 characters (got {})",
            name.len()
        ));
    }
    if !SUBDOMAIN_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(name))
    {
        return Err(format!(
            "name '{name}' must be lowercase alphanumeric, hyphens or dots, and cannot start/end with hyphen or dot"
        ));
    }
    Ok(())
}

/// Validate a Kubernetes namespace (RFC 1123 label, 1-63 characters)
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("namespace cannot be empty".to_string());
    }
    if namespace.len() > 63 {
        return Err(format!(
            "namespace '{namespace}' exceeds maximum length of 63 characters (got {})",
            namespace.len()
        ));
    }
    if !LABEL_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(namespace))
    {
        return Err(format!(
            "namespace '{namespace}' must be lowercase alphanumeric or hyphens, and cannot start/end with hyphen"
        ));
    }
    Ok(())
}

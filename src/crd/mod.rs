//! # Custom Resource Definitions
//!
//! CRD types for the Secret Sync Controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - The `SecretSync` binding and its spec
//! - `status.rs` - Status types for tracking sync state

mod spec;
mod status;

// Re-export all public types
pub use spec::{default_false, SecretSync, SecretSyncSpec};
pub use status::{
    Condition, SecretSyncStatus, PHASE_FAILED, PHASE_PENDING, PHASE_SUSPENDED, PHASE_SYNCED,
};

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{CustomResourceExt, Resource};

    #[test]
    fn test_crd_metadata() {
        let crd = SecretSync::crd();
        assert_eq!(crd.spec.group, "secret-sync.io");
        assert_eq!(crd.spec.names.kind, "SecretSync");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(
            crd.spec.names.short_names,
            Some(vec!["ssync".to_string()])
        );
        assert_eq!(SecretSync::api_version(&()), "secret-sync.io/v1");
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: SecretSyncSpec =
            serde_json::from_str(r#"{"sourceSecretName": "eks-sync-db"}"#).unwrap();
        assert_eq!(spec.source_secret_name, "eks-sync-db");
        assert_eq!(spec.name, None);
        assert_eq!(spec.reconcile_interval, None);
        assert!(!spec.suspend);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = SecretSyncStatus {
            phase: Some(PHASE_SYNCED.to_string()),
            last_decision: Some("Create".to_string()),
            observed_generation: Some(2),
            ..Default::default()
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["phase"], "Synced");
        assert_eq!(value["lastDecision"], "Create");
        assert_eq!(value["observedGeneration"], 2);
    }
}

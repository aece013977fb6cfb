//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default re-check interval between cycles for the same identity
pub const DEFAULT_RECONCILE_INTERVAL: &str = "10s";

/// Default timeout for a single source or sink read
pub const DEFAULT_CALL_TIMEOUT: &str = "30s";

/// Default prefix a secret name must carry to be synced by the event trigger
pub const DEFAULT_NAME_PREFIX: &str = "eks-sync-";

/// Default namespace for secrets synced without a binding object
pub const DEFAULT_TARGET_NAMESPACE: &str = "default";

/// Default cap on reconciles running at once across all bindings
pub const DEFAULT_MAX_CONCURRENT_RECONCILES: u16 = 10;

/// Field manager / controller name reported to the API server
pub const CONTROLLER_NAME: &str = "secret-sync-controller";

/// Label marking secrets owned by the sync process
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`] on synced secrets
pub const MANAGED_BY_VALUE: &str = "secret-sync-controller";

/// Annotation recording the source secret name on a synced secret
pub const SOURCE_ANNOTATION: &str = "secret-sync.io/source";

/// Annotation recording the `namespace/name` of the owning binding object
pub const BINDING_ANNOTATION: &str = "secret-sync.io/binding";

/// Secret type written by the sink
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";

//! # AWS Secrets Manager Source
//!
//! Reads desired secret values from AWS Secrets Manager.
//!
//! Authentication uses the SDK default credential chain, which covers IRSA
//! (pod service account annotation `eks.amazonaws.com/role-arn`), instance
//! profiles and environment credentials.

pub mod decode;

use crate::observability::metrics;
use crate::provider::SecretSource;
use crate::sync::{ErrorKind, SecretPayload, Store, SyncError};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use std::time::Instant;
use tracing::{debug, info, Instrument};

/// Error codes that mean the caller's identity or permissions were rejected
const UNAUTHORIZED_CODES: &[&str] = &[
    "AccessDeniedException",
    "UnrecognizedClientException",
    "InvalidClientTokenId",
    "ExpiredTokenException",
    "InvalidSignatureException",
    "DecryptionFailure",
];

/// AWS Secrets Manager implementation of [`SecretSource`]
pub struct AwsSecretsManagerSource {
    client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretsManagerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManagerSource")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManagerSource {
    /// Create a client for `region`, optionally pointed at a custom endpoint
    pub async fn new(region: &str, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(endpoint) = endpoint {
            info!("Using custom Secrets Manager endpoint: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        Self {
            client: SecretsManagerClient::new(&sdk_config),
            region: region.to_string(),
        }
    }

    /// Wrap an already configured client
    #[must_use]
    pub fn from_client(client: SecretsManagerClient, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

#[async_trait]
impl SecretSource for AwsSecretsManagerSource {
    async fn fetch(&self, source_name: &str) -> Result<SecretPayload, SyncError> {
        let span = tracing::debug_span!(
            "aws.secret.get",
            secret.name = source_name,
            region = self.region.as_str()
        );
        let start = Instant::now();

        async move {
            let output = self
                .client
                .get_secret_value()
                .secret_id(source_name)
                .send()
                .await
                .map_err(|e| {
                    metrics::increment_store_operation_errors(Store::Source);
                    classify_sdk_error(source_name, &e)
                })?;

            metrics::record_store_operation(Store::Source, "get", start.elapsed().as_secs_f64());

            let payload = if let Some(text) = output.secret_string() {
                decode::decode_secret_string(source_name, text)?
            } else if let Some(blob) = output.secret_binary() {
                decode::decode_secret_binary(blob.as_ref())
            } else {
                return Err(SyncError::malformed(
                    source_name,
                    "secret has neither a string nor a binary value",
                ));
            };

            debug!(keys = payload.len(), "Retrieved secret with {} key(s)", payload.len());
            Ok(payload)
        }
        .instrument(span)
        .await
    }
}

/// Map an SDK failure onto the sync error taxonomy
fn classify_sdk_error<E>(name: &str, err: &SdkError<E>) -> SyncError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = DisplayErrorContext(err).to_string();
    let code = match err {
        SdkError::ServiceError(context) => context.err().code(),
        _ => None,
    };

    match classify_error_code(code) {
        ErrorKind::NotFound => SyncError::not_found(Store::Source, name),
        ErrorKind::Unauthorized => SyncError::unauthorized(Store::Source, name, message),
        _ => SyncError::unavailable(Store::Source, name, message),
    }
}

/// Failure class for a Secrets Manager error code; unknown codes and
/// transport failures (no code) are treated as transient
fn classify_error_code(code: Option<&str>) -> ErrorKind {
    match code {
        Some("ResourceNotFoundException") => ErrorKind::NotFound,
        Some(code) if UNAUTHORIZED_CODES.contains(&code) => ErrorKind::Unauthorized,
        _ => ErrorKind::Unavailable,
    }
}

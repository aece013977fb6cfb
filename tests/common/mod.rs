//! Common test utilities
//!
//! In-memory SecretSource/SecretSink fakes for exercising the sync policy and
//! triggers without a cluster or cloud account, plus rustls setup for the
//! contract tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use secret_sync_controller::constants::{MANAGED_BY_LABEL, MANAGED_BY_VALUE, SECRET_TYPE_OPAQUE};
use secret_sync_controller::provider::{SecretSink, SecretSource};
use secret_sync_controller::sync::{
    ErrorKind, SecretIdentity, SecretPayload, Store, SyncBinding, SyncDecision, SyncError,
    SyncPolicy,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

pub fn payload(entries: &[(&str, &str)]) -> SecretPayload {
    entries
        .iter()
        .map(|(key, value)| (*key, value.as_bytes().to_vec()))
        .collect()
}

fn error_for(kind: ErrorKind, store: Store, name: &str) -> SyncError {
    match kind {
        ErrorKind::NotFound => SyncError::not_found(store, name),
        ErrorKind::Unauthorized => SyncError::unauthorized(store, name, "AccessDenied"),
        ErrorKind::Unavailable => SyncError::unavailable(store, name, "connection reset"),
        ErrorKind::MalformedPayload => SyncError::malformed(name, "expected a JSON object"),
        ErrorKind::Cancelled => SyncError::Cancelled,
    }
}

/// Source backed by a map, with failure injection and an optional delay
#[derive(Debug, Default)]
pub struct MemorySource {
    secrets: Mutex<HashMap<String, SecretPayload>>,
    failure: Mutex<Option<ErrorKind>>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, name: &str, payload: SecretPayload) {
        self.secrets.lock().unwrap().insert(name.to_string(), payload);
    }

    pub fn fail_with(&self, kind: ErrorKind) {
        *self.failure.lock().unwrap() = Some(kind);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn delay_by(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for MemorySource {
    async fn fetch(&self, source_name: &str) -> Result<SecretPayload, SyncError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = *self.failure.lock().unwrap();
        if let Some(kind) = failure {
            return Err(error_for(kind, Store::Source, source_name));
        }
        self.secrets
            .lock()
            .unwrap()
            .get(source_name)
            .cloned()
            .ok_or_else(|| SyncError::not_found(Store::Source, source_name))
    }
}

/// A materialized secret as the spy sink stores it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSecret {
    pub payload: SecretPayload,
    pub secret_type: String,
    pub labels: BTreeMap<String, String>,
    pub owner: Option<String>,
}

/// Sink backed by a map that counts every read and write
#[derive(Debug, Default)]
pub struct SpySink {
    secrets: Mutex<HashMap<(String, String), StoredSecret>>,
    fetch_failure: Mutex<Option<ErrorKind>>,
    fetches: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl SpySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a secret, e.g. one that was not created by the sync process
    pub fn insert(&self, namespace: &str, name: &str, stored: StoredSecret) {
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), stored);
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<StoredSecret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn fail_fetch_with(&self, kind: ErrorKind) {
        *self.fetch_failure.lock().unwrap() = Some(kind);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }
}

#[async_trait]
impl SecretSink for SpySink {
    async fn fetch(&self, identity: &SecretIdentity) -> Result<SecretPayload, SyncError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failure = *self.fetch_failure.lock().unwrap();
        if let Some(kind) = failure {
            return Err(error_for(kind, Store::Sink, &identity.name));
        }
        self.stored(&identity.namespace, &identity.name)
            .map(|stored| stored.payload)
            .ok_or_else(|| SyncError::not_found(Store::Sink, &identity.name))
    }

    async fn apply(
        &self,
        binding: &SyncBinding,
        desired: &SecretPayload,
        decision: SyncDecision,
    ) -> Result<(), SyncError> {
        let identity = &binding.identity;
        let key = (identity.namespace.clone(), identity.name.clone());
        let mut secrets = self.secrets.lock().unwrap();
        match decision {
            SyncDecision::NoOp => Ok(()),
            SyncDecision::Create => {
                self.creates.fetch_add(1, Ordering::SeqCst);
                let mut labels = BTreeMap::new();
                labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
                secrets.insert(
                    key,
                    StoredSecret {
                        payload: desired.clone(),
                        secret_type: SECRET_TYPE_OPAQUE.to_string(),
                        labels,
                        owner: binding.owner.as_ref().map(|owner| owner.key.clone()),
                    },
                );
                Ok(())
            }
            SyncDecision::Update => {
                self.updates.fetch_add(1, Ordering::SeqCst);
                let stored = secrets
                    .get_mut(&key)
                    .ok_or_else(|| SyncError::not_found(Store::Sink, &identity.name))?;
                // Only payload and type are owned by the sync process
                stored.payload = desired.clone();
                stored.secret_type = SECRET_TYPE_OPAQUE.to_string();
                Ok(())
            }
        }
    }
}

pub fn policy(source: &Arc<MemorySource>, sink: &Arc<SpySink>) -> SyncPolicy {
    policy_with_timeout(source, sink, Duration::from_secs(5))
}

pub fn policy_with_timeout(
    source: &Arc<MemorySource>,
    sink: &Arc<SpySink>,
    call_timeout: Duration,
) -> SyncPolicy {
    SyncPolicy::new(
        Arc::clone(source) as Arc<dyn SecretSource>,
        Arc::clone(sink) as Arc<dyn SecretSink>,
        call_timeout,
    )
}

pub fn binding(namespace: &str, name: &str, source_name: &str) -> SyncBinding {
    SyncBinding::unowned(SecretIdentity::new(namespace, name, source_name))
}

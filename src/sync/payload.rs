//! # Secret Payloads and Identities
//!
//! Value types passed between the source, the diff policy and the sink.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::fmt;

/// Key used when the source holds a single opaque blob instead of key/value pairs
pub const BINARY_SECRET_KEY: &str = "secret";

/// Full content of one secret: unique string keys mapped to opaque bytes.
///
/// Payloads are built fresh on every cycle and never mutated afterwards.
/// Equality is byte-exact on every value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretPayload {
    entries: BTreeMap<String, Vec<u8>>,
}

impl SecretPayload {
    #[must_use]
    pub fn new(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self { entries }
    }

    /// Payload holding a single blob under [`BINARY_SECRET_KEY`]
    #[must_use]
    pub fn from_blob(blob: impl Into<Vec<u8>>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(BINARY_SECRET_KEY.to_string(), blob.into());
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_slice()))
    }

    /// Convert into the `data` map of a Kubernetes Secret
    #[must_use]
    pub fn to_secret_data(&self) -> BTreeMap<String, ByteString> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), ByteString(value.clone())))
            .collect()
    }

    /// Build a payload from the `data` map of a Kubernetes Secret
    #[must_use]
    pub fn from_secret_data(data: Option<&BTreeMap<String, ByteString>>) -> Self {
        let entries = data
            .map(|data| {
                data.iter()
                    .map(|(key, value)| (key.clone(), value.0.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for SecretPayload
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

// Values never reach logs.
impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Identifies one sync target: the sink secret (namespace, name) and the source secret name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretIdentity {
    pub namespace: String,
    pub name: String,
    pub source_name: String,
}

impl SecretIdentity {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            source_name: source_name.into(),
        }
    }
}

impl fmt::Display for SecretIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}/{}",
            self.source_name, self.namespace, self.name
        )
    }
}

/// Object that declared a sync binding, recorded on the secrets it creates
#[derive(Debug, Clone, PartialEq)]
pub struct BindingOwner {
    /// `namespace/name` of the binding object
    pub key: String,
    /// Owner reference enabling cascading deletion, when the runtime supports it
    pub reference: Option<OwnerReference>,
}

/// Identity plus the optional owning binding object
///
/// Bindings are supplied by the trigger and are immutable for the lifetime of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncBinding {
    pub identity: SecretIdentity,
    pub owner: Option<BindingOwner>,
}

impl SyncBinding {
    /// Binding without an owning object (event-driven and CLI syncs)
    #[must_use]
    pub fn unowned(identity: SecretIdentity) -> Self {
        Self {
            identity,
            owner: None,
        }
    }

    #[must_use]
    pub fn owned_by(identity: SecretIdentity, owner: BindingOwner) -> Self {
        Self {
            identity,
            owner: Some(owner),
        }
    }
}

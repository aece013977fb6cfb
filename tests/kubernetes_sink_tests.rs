//! Kubernetes Secret sink against a mock API server
//!
//! The mock serves the core/v1 Secret endpoints the sink uses (get, create,
//! replace), enforces `resourceVersion` on replace, and records every request.

mod common;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use common::{init_rustls, payload, MemorySource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use secret_sync_controller::provider::kubernetes::KubernetesSecretSink;
use secret_sync_controller::provider::{SecretSink, SecretSource};
use secret_sync_controller::sync::{
    BindingOwner, ErrorKind, SecretIdentity, Store, SyncBinding, SyncDecision, SyncError,
    SyncPolicy,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Namespace the mock answers with 403 for every request
const RESTRICTED_NAMESPACE: &str = "restricted";

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockApi {
    secrets: Mutex<HashMap<(String, String), Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    resource_version: AtomicU64,
    conflict_on_replace: AtomicBool,
}

impl MockApi {
    fn record(&self, method: Method, uri: &Uri, body: Option<Value>) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            body,
        });
    }

    fn next_version(&self) -> String {
        (self.resource_version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

fn status(code: StatusCode, reason: &str, message: &str) -> Response {
    (
        code,
        Json(json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code.as_u16()
        })),
    )
        .into_response()
}

fn forbidden(namespace: &str) -> Response {
    status(
        StatusCode::FORBIDDEN,
        "Forbidden",
        &format!("secrets is forbidden in namespace \"{namespace}\""),
    )
}

async fn get_secret(
    State(api): State<Arc<MockApi>>,
    method: Method,
    uri: Uri,
    Path((namespace, name)): Path<(String, String)>,
) -> Response {
    api.record(method, &uri, None);
    if namespace == RESTRICTED_NAMESPACE {
        return forbidden(&namespace);
    }
    match api.secrets.lock().unwrap().get(&(namespace, name.clone())) {
        Some(secret) => Json(secret.clone()).into_response(),
        None => status(
            StatusCode::NOT_FOUND,
            "NotFound",
            &format!("secrets \"{name}\" not found"),
        ),
    }
}

async fn create_secret(
    State(api): State<Arc<MockApi>>,
    method: Method,
    uri: Uri,
    Path(namespace): Path<String>,
    body: Bytes,
) -> Response {
    let mut secret: Value = serde_json::from_slice(&body).unwrap();
    api.record(method, &uri, Some(secret.clone()));
    if namespace == RESTRICTED_NAMESPACE {
        return forbidden(&namespace);
    }
    let name = secret["metadata"]["name"].as_str().unwrap().to_string();
    let mut secrets = api.secrets.lock().unwrap();
    let key = (namespace, name.clone());
    if secrets.contains_key(&key) {
        return status(
            StatusCode::CONFLICT,
            "AlreadyExists",
            &format!("secrets \"{name}\" already exists"),
        );
    }
    secret["metadata"]["resourceVersion"] = json!(api.next_version());
    secrets.insert(key, secret.clone());
    (StatusCode::CREATED, Json(secret)).into_response()
}

async fn replace_secret(
    State(api): State<Arc<MockApi>>,
    method: Method,
    uri: Uri,
    Path((namespace, name)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let mut secret: Value = serde_json::from_slice(&body).unwrap();
    api.record(method, &uri, Some(secret.clone()));
    let mut secrets = api.secrets.lock().unwrap();
    let key = (namespace, name.clone());
    let Some(current) = secrets.get(&key) else {
        return status(
            StatusCode::NOT_FOUND,
            "NotFound",
            &format!("secrets \"{name}\" not found"),
        );
    };
    if api.conflict_on_replace.load(Ordering::SeqCst)
        || current["metadata"]["resourceVersion"] != secret["metadata"]["resourceVersion"]
    {
        return status(
            StatusCode::CONFLICT,
            "Conflict",
            "the object has been modified; please apply your changes to the latest version and try again",
        );
    }
    secret["metadata"]["resourceVersion"] = json!(api.next_version());
    secrets.insert(key, secret.clone());
    Json(secret).into_response()
}

/// Mock API server bound to an ephemeral port, plus a sink pointed at it
struct MockCluster {
    api: Arc<MockApi>,
    sink: KubernetesSecretSink,
}

impl MockCluster {
    async fn start() -> Self {
        init_rustls();
        let api = Arc::new(MockApi::default());
        let app = Router::new()
            .route(
                "/api/v1/namespaces/{namespace}/secrets/{name}",
                get(get_secret).put(replace_secret),
            )
            .route("/api/v1/namespaces/{namespace}/secrets", post(create_secret))
            .with_state(Arc::clone(&api));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = kube::Config::new(format!("http://{addr}").parse().unwrap());
        let client = kube::Client::try_from(config).unwrap();
        Self {
            api,
            sink: KubernetesSecretSink::new(client),
        }
    }

    fn seed(&self, namespace: &str, name: &str, secret: Value) {
        self.api
            .secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), secret);
    }

    fn stored(&self, namespace: &str, name: &str) -> Option<Value> {
        self.api
            .secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.api.requests.lock().unwrap().clone()
    }
}

/// A basic-auth Secret written by someone else: `password=old`, `stale=x`
fn existing_secret() -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": "db",
            "namespace": "default",
            "resourceVersion": "7",
            "labels": { "team": "payments" }
        },
        "type": "kubernetes.io/basic-auth",
        "data": {
            "password": "b2xk",
            "stale": "eA=="
        }
    })
}

fn identity(namespace: &str, name: &str) -> SecretIdentity {
    SecretIdentity::new(namespace, name, "eks-sync-db")
}

#[tokio::test]
async fn test_fetch_missing_secret_is_sink_not_found() {
    let cluster = MockCluster::start().await;

    let err = cluster
        .sink
        .fetch(&identity("default", "db"))
        .await
        .unwrap_err();

    assert!(err.is_sink_not_found(), "{err:?}");
    let requests = cluster.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/api/v1/namespaces/default/secrets/db");
}

#[tokio::test]
async fn test_fetch_returns_decoded_data() {
    let cluster = MockCluster::start().await;
    cluster.seed("default", "db", existing_secret());

    let observed = cluster.sink.fetch(&identity("default", "db")).await.unwrap();

    assert_eq!(observed, payload(&[("password", "old"), ("stale", "x")]));
}

#[tokio::test]
async fn test_fetch_forbidden_is_unauthorized() {
    let cluster = MockCluster::start().await;

    let err = cluster
        .sink
        .fetch(&identity(RESTRICTED_NAMESPACE, "db"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Unauthorized { store: Store::Sink, .. }));
}

#[tokio::test]
async fn test_create_posts_owned_opaque_secret() {
    let cluster = MockCluster::start().await;
    let desired = payload(&[("username", "admin"), ("password", "s3cr3t")]);
    let binding = SyncBinding::owned_by(
        identity("default", "db"),
        BindingOwner {
            key: "default/db-binding".to_string(),
            reference: Some(OwnerReference {
                api_version: "secret-sync.io/v1".to_string(),
                kind: "SecretSync".to_string(),
                name: "db-binding".to_string(),
                uid: "5d1e7c0a-1111-4000-8000-000000000002".to_string(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            }),
        },
    );

    cluster
        .sink
        .apply(&binding, &desired, SyncDecision::Create)
        .await
        .unwrap();

    let requests = cluster.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/api/v1/namespaces/default/secrets");

    let created = cluster.stored("default", "db").unwrap();
    assert_eq!(created["type"], "Opaque");
    assert_eq!(
        created["metadata"]["labels"]["app.kubernetes.io/managed-by"],
        "secret-sync-controller"
    );
    assert_eq!(
        created["metadata"]["annotations"]["secret-sync.io/source"],
        "eks-sync-db"
    );
    assert_eq!(
        created["metadata"]["annotations"]["secret-sync.io/binding"],
        "default/db-binding"
    );
    assert_eq!(created["metadata"]["ownerReferences"][0]["kind"], "SecretSync");
    assert_eq!(created["metadata"]["ownerReferences"][0]["controller"], true);

    let observed = cluster.sink.fetch(&identity("default", "db")).await.unwrap();
    assert_eq!(observed, desired);
}

#[tokio::test]
async fn test_update_replaces_with_the_resource_version_it_read() {
    let cluster = MockCluster::start().await;
    cluster.seed("default", "db", existing_secret());
    let desired = payload(&[("password", "new-pass")]);
    let binding = SyncBinding::unowned(identity("default", "db"));

    cluster
        .sink
        .apply(&binding, &desired, SyncDecision::Update)
        .await
        .unwrap();

    let requests = cluster.requests();
    let methods: Vec<_> = requests.iter().map(|r| r.method.clone()).collect();
    assert_eq!(methods, vec![Method::GET, Method::PUT]);
    assert_eq!(requests[1].path, "/api/v1/namespaces/default/secrets/db");

    let body = requests[1].body.as_ref().unwrap();
    assert_eq!(body["metadata"]["resourceVersion"], "7");
    assert_eq!(body["metadata"]["labels"]["team"], "payments");
    assert_eq!(body["type"], "Opaque");
    assert!(body["data"].get("stale").is_none());

    let observed = cluster.sink.fetch(&identity("default", "db")).await.unwrap();
    assert_eq!(observed, desired);
}

#[tokio::test]
async fn test_update_conflict_is_unavailable() {
    let cluster = MockCluster::start().await;
    cluster.seed("default", "db", existing_secret());
    cluster.api.conflict_on_replace.store(true, Ordering::SeqCst);

    let err = cluster
        .sink
        .apply(
            &SyncBinding::unowned(identity("default", "db")),
            &payload(&[("password", "new-pass")]),
            SyncDecision::Update,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(
        cluster.stored("default", "db").unwrap()["data"]["password"],
        "b2xk"
    );
}

#[tokio::test]
async fn test_noop_makes_no_api_call() {
    let cluster = MockCluster::start().await;
    cluster.seed("default", "db", existing_secret());

    cluster
        .sink
        .apply(
            &SyncBinding::unowned(identity("default", "db")),
            &payload(&[("password", "old"), ("stale", "x")]),
            SyncDecision::NoOp,
        )
        .await
        .unwrap();

    assert!(cluster.requests().is_empty());
}

#[tokio::test]
async fn test_policy_creates_then_settles_against_the_api() {
    let cluster = MockCluster::start().await;
    let source = MemorySource::new();
    source.set("eks-sync-db", payload(&[("username", "admin"), ("password", "s3cr3t")]));
    let policy = SyncPolicy::new(
        Arc::clone(&source) as Arc<dyn SecretSource>,
        Arc::new(cluster.sink.clone()) as Arc<dyn SecretSink>,
        Duration::from_secs(5),
    );
    let binding = SyncBinding::unowned(identity("default", "db"));
    let cancel = CancellationToken::new();

    let first = policy.run(&binding, &cancel).await.unwrap();
    let second = policy.run(&binding, &cancel).await.unwrap();

    assert_eq!(first.decision, SyncDecision::Create);
    assert_eq!(second.decision, SyncDecision::NoOp);
    let writes = cluster
        .requests()
        .iter()
        .filter(|r| r.method != Method::GET)
        .count();
    assert_eq!(writes, 1);
}

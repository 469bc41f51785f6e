//! Remote and cached-remote store tests against a live authority instance
//! spawned on an ephemeral port.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use rsabac_domain::{Attribute, AttributeValueSet, Hierarchy};
use rsabac_server::{decision_router, AppState};
use rsabac_store::{AttributeStore, CachedAttributeStore, RemoteAttributeStore};

use common::{authority_app, eval_result, sample_store};

/// Wraps the sample dataset and counts lookups reaching the authority's
/// backing store.
#[derive(Default)]
struct CountingStore {
    inner: rsabac_store::LocalAttributeStore,
    attribute_calls: AtomicUsize,
    hierarchy_calls: AtomicUsize,
}

impl CountingStore {
    fn sample() -> Self {
        Self {
            inner: sample_store(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl AttributeStore for CountingStore {
    async fn attributes(&self, user: &str) -> Option<AttributeValueSet> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.attributes(user).await
    }

    async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy> {
        self.hierarchy_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_hierarchy(attribute).await
    }

    async fn users(&self) -> HashSet<String> {
        self.inner.users().await
    }
}

/// Spawns the authority router on an ephemeral port; returns its base URL.
async fn spawn_authority(store: Arc<dyn AttributeStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = authority_app(store);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn remote_store(base: &str) -> RemoteAttributeStore {
    RemoteAttributeStore::new(
        format!("{base}/users/lookup/{{user}}"),
        format!("{base}/hierarchies/lookup/{{name}}"),
    )
    .unwrap()
}

#[tokio::test]
async fn remote_store_resolves_against_live_authority() {
    let base = spawn_authority(Arc::new(sample_store())).await;
    let remote = remote_store(&base);

    let attrs = remote.attributes("employee1").await.unwrap();
    assert!(attrs.contains(&Attribute::new("employee"), "true"));
    assert!(attrs.contains(&Attribute::new("credentials"), "ordinary-degree"));

    let credentials = Attribute::new("credentials");
    assert!(remote.has_hierarchy(&credentials).await);
    let hierarchy = remote.get_hierarchy(&credentials).await.unwrap();
    assert_eq!(hierarchy.tiers().len(), 5);

    assert!(remote.get_hierarchy(&Attribute::new("clearance")).await.is_none());

    let users = remote.users().await;
    assert!(users.contains("employee1"));
    assert!(users.contains("contractor1"));
}

#[tokio::test]
async fn unknown_user_denies_without_touching_the_hierarchy_endpoint() {
    let authority = Arc::new(CountingStore::sample());
    let base = spawn_authority(Arc::clone(&authority) as Arc<dyn AttributeStore>).await;
    let app = common::decision_app(Arc::new(remote_store(&base)));

    let result = eval_result(&app, "user2", "credentials = hnd").await;
    assert_eq!(result, "false");
    assert_eq!(authority.attribute_calls.load(Ordering::SeqCst), 1);
    assert_eq!(authority.hierarchy_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transport_failure_denies_that_request_only() {
    // Grab a port with nothing listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let remote = remote_store(&base);
    assert!(remote.attributes("employee1").await.is_none());
    assert!(remote.get_hierarchy(&Attribute::new("credentials")).await.is_none());
    assert!(remote.users().await.is_empty());
}

#[tokio::test]
async fn cached_remote_coalesces_repeat_lookups() {
    let authority = Arc::new(CountingStore::sample());
    let base = spawn_authority(Arc::clone(&authority) as Arc<dyn AttributeStore>).await;
    let cached = CachedAttributeStore::new(Arc::new(remote_store(&base)), Duration::from_secs(60));

    for _ in 0..4 {
        assert!(cached.attributes("employee1").await.is_some());
    }
    assert_eq!(authority.attribute_calls.load(Ordering::SeqCst), 1);

    // Enumeration is never cached.
    cached.users().await;
    cached.users().await;
    // (Counted at the authority only indirectly; both calls must succeed.)
}

#[tokio::test]
async fn decision_over_cached_remote_end_to_end() {
    let base = spawn_authority(Arc::new(sample_store())).await;
    let cached: Arc<dyn AttributeStore> = Arc::new(CachedAttributeStore::new(
        Arc::new(remote_store(&base)),
        Duration::from_secs(60),
    ));

    // Serve the decision router over a real socket and drive it with an
    // HTTP client, config-to-response.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = decision_router(AppState::new(cached));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/eval"))
        .query(&[("user", "employee1"), ("label", "credentials = hnd")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["user"], "employee1");
    assert_eq!(json["result"], "true");
}

//! Shared helpers for the HTTP test suites.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use rsabac_domain::{Attribute, AttributeValueSet, Hierarchy};
use rsabac_server::{authority_router, decision_router, AppState};
use rsabac_store::{AttributeStore, LocalAttributeStore};

/// A small dataset: one employee with a ranked credential, one contractor,
/// and the credentials hierarchy.
pub fn sample_store() -> LocalAttributeStore {
    let store = LocalAttributeStore::new();
    store.insert_user(
        "employee1",
        AttributeValueSet::parse("credentials=ordinary-degree, employee").unwrap(),
    );
    store.insert_user("contractor1", AttributeValueSet::parse("contractor").unwrap());
    store.insert_hierarchy(Hierarchy::new(
        Attribute::new("credentials"),
        ["hnc", "hnd", "ordinary-degree", "honours-degree", "phd"],
    ));
    store
}

pub fn decision_app(store: Arc<dyn AttributeStore>) -> Router {
    decision_router(AppState::new(store))
}

pub fn authority_app(store: Arc<dyn AttributeStore>) -> Router {
    authority_router(AppState::new(store))
}

/// Percent-encodes a user/label pair into an `/eval` query string.
pub fn eval_query(user: &str, label: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("user", user)
        .append_pair("label", label)
        .finish()
}

pub async fn post_eval(app: &Router, query: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/eval?{query}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Runs one decision request and returns the `result` field, asserting a
/// 200 with well-formed JSON.
pub async fn eval_result(app: &Router, user: &str, label: &str) -> String {
    let (status, body) = post_eval(app, &eval_query(user, label)).await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"], user);
    json["result"].as_str().unwrap().to_string()
}

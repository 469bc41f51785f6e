//! The simulated attribute authority.
//!
//! A read-only lookup façade over an attribute store, exposing the same URL
//! conventions the remote store's endpoint derivation expects:
//! `/users/lookup/{user}`, `/hierarchies/lookup/{name}`, and the `/users`
//! enumeration. Not-founds are plain 404s.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use rsabac_domain::Attribute;
use rsabac_store::{HierarchyDoc, UserAttributesDoc, UsersDoc};

use super::state::AppState;

pub async fn lookup_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Response {
    match state.store().attributes(&user).await {
        Some(set) => Json(UserAttributesDoc {
            attributes: set.iter().map(ToString::to_string).collect(),
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, format!("User '{user}' not known")).into_response(),
    }
}

pub async fn lookup_hierarchy(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.store().get_hierarchy(&Attribute::new(&name)).await {
        Some(hierarchy) => Json(HierarchyDoc {
            tiers: hierarchy.tiers().to_vec(),
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("No hierarchy for attribute '{name}'"),
        )
            .into_response(),
    }
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<UsersDoc> {
    let mut users: Vec<String> = state.store().users().await.into_iter().collect();
    users.sort();
    Json(UsersDoc { users })
}

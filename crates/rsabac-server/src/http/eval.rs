//! The decision endpoint.
//!
//! `POST /eval?user=<id>&label=<expr>` answers whether the user's attributes
//! satisfy the label expression. Validation failures and label syntax errors
//! are 400s with a plain-text message; everything else is a 200 carrying
//! `{"user": ..., "result": "true"|"false"}`.
//!
//! Denial is the default on every ambiguity: an unknown user, an empty
//! expression list, and any false expression in the list all answer
//! `"false"`.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rsabac_domain::{parse_label_list, EvalContext};
use rsabac_store::HierarchyLookup;

use super::state::AppState;

/// The decision response body. `result` is the literal string `"true"` or
/// `"false"`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvalResponse {
    pub user: String,
    pub result: String,
}

impl EvalResponse {
    fn new(user: &str, allow: bool) -> Self {
        Self {
            user: user.to_string(),
            result: allow.to_string(),
        }
    }
}

pub async fn eval(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    let mut users: Vec<String> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "user" => users.push(value.into_owned()),
            "label" => labels.push(value.into_owned()),
            _ => {}
        }
    }

    if let Err(message) = validate(&users, &labels) {
        return (StatusCode::BAD_REQUEST, message).into_response();
    }
    let user = &users[0];
    let label = &labels[0];

    let Some(attributes) = state.store().attributes(user).await else {
        info!(user, "unknown user, denying");
        return Json(EvalResponse::new(user, false)).into_response();
    };

    let expressions = match parse_label_list(label) {
        Ok(expressions) => expressions,
        Err(error) => {
            debug!(user, label, %error, "rejecting unparsable label");
            return (StatusCode::BAD_REQUEST, format!("Bad syntax: {error}")).into_response();
        }
    };

    let hierarchies = HierarchyLookup::new(Arc::clone(state.store()));
    let ctx = EvalContext::new(&attributes, &hierarchies);

    // The list is a conjunction: stop at the first false expression. An
    // empty list stays at the deny default.
    let mut allow = false;
    for expression in &expressions {
        allow = expression.eval(&ctx).await;
        if !allow {
            break;
        }
    }

    debug!(user, label, result = allow, "evaluated");
    Json(EvalResponse::new(user, allow)).into_response()
}

fn validate(users: &[String], labels: &[String]) -> Result<(), String> {
    if users.is_empty() && labels.is_empty() {
        return Err("No 'label' and no 'user' query parameter".to_string());
    }
    if labels.is_empty() {
        return Err("No 'label' query parameter".to_string());
    }
    if users.is_empty() {
        return Err("No 'user' query parameter".to_string());
    }
    if users.len() > 1 {
        return Err("More than one 'user' query parameter".to_string());
    }
    if labels.len() > 1 {
        return Err("More than one 'label' query parameter".to_string());
    }
    Ok(())
}

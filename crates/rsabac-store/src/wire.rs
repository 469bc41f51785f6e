//! Wire shapes for the attribute-authority lookup protocol.
//!
//! Shared between the remote store (client side) and the simulated authority
//! (server side) so the two cannot drift apart.

use serde::{Deserialize, Serialize};

/// Body of `GET /users/lookup/{user}`: the user's attribute assignments as
/// `name=value` or bare-name strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributesDoc {
    pub attributes: Vec<String>,
}

/// Body of `GET /hierarchies/lookup/{name}`: tier values, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyDoc {
    pub tiers: Vec<String>,
}

/// Body of `GET /users`: the known user identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersDoc {
    pub users: Vec<String>,
}

//! Attribute store backed by a remote attribute authority over HTTP.
//!
//! Endpoints are configured as URL templates carrying a `{user}` or `{name}`
//! placeholder, e.g. `http://authority:64331/users/lookup/{user}`. Lookup
//! failures of any kind (transport errors, non-success statuses, unparsable
//! bodies) are logged and reported as `None`; the decision layer treats that
//! as "no data" and denies, so a flaky authority degrades to denials rather
//! than server errors.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;
use url::Url;

use rsabac_domain::{Attribute, AttributeValue, AttributeValueSet, Hierarchy};

use crate::error::{StoreError, StoreResult};
use crate::traits::AttributeStore;
use crate::wire::{HierarchyDoc, UserAttributesDoc, UsersDoc};

/// Placeholder in the user lookup endpoint template.
pub const USER_PLACEHOLDER: &str = "{user}";
/// Placeholder in the hierarchy lookup endpoint template.
pub const NAME_PLACEHOLDER: &str = "{name}";

const USER_LOOKUP_SUFFIX: &str = "/lookup/{user}";

/// Attribute store that resolves lookups against a remote authority.
#[derive(Debug)]
pub struct RemoteAttributeStore {
    http: reqwest::Client,
    user_endpoint: String,
    hierarchy_endpoint: String,
    users_url: Option<String>,
}

impl RemoteAttributeStore {
    /// Creates a remote store from endpoint templates.
    ///
    /// Both templates must expand to absolute URLs; this is checked here so a
    /// misconfigured endpoint fails at startup instead of on first lookup.
    pub fn new(
        user_endpoint: impl Into<String>,
        hierarchy_endpoint: impl Into<String>,
    ) -> StoreResult<Self> {
        let user_endpoint = user_endpoint.into();
        let hierarchy_endpoint = hierarchy_endpoint.into();
        validate_template(&user_endpoint, USER_PLACEHOLDER)?;
        validate_template(&hierarchy_endpoint, NAME_PLACEHOLDER)?;

        // The authority serves the user enumeration at the base of its user
        // lookup path; only derivable when the template has the usual shape.
        let users_url = user_endpoint
            .strip_suffix(USER_LOOKUP_SUFFIX)
            .map(str::to_string);

        Ok(Self {
            http: reqwest::Client::new(),
            user_endpoint,
            hierarchy_endpoint,
            users_url,
        })
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url, %error, "attribute authority request failed");
                return None;
            }
        };
        if response.status() == StatusCode::NOT_FOUND {
            return None;
        }
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "attribute authority returned an error");
            return None;
        }
        match response.json::<T>().await {
            Ok(doc) => Some(doc),
            Err(error) => {
                warn!(url, %error, "attribute authority returned an unreadable body");
                None
            }
        }
    }
}

#[async_trait]
impl AttributeStore for RemoteAttributeStore {
    async fn attributes(&self, user: &str) -> Option<AttributeValueSet> {
        let url = self.user_endpoint.replace(USER_PLACEHOLDER, user);
        let doc: UserAttributesDoc = self.fetch_json(&url).await?;
        let mut values = Vec::with_capacity(doc.attributes.len());
        for text in &doc.attributes {
            match AttributeValue::parse(text) {
                Ok(value) => values.push(value),
                Err(error) => {
                    warn!(url, user, %error, "discarding attribute record with a bad entry");
                    return None;
                }
            }
        }
        Some(AttributeValueSet::from_values(values))
    }

    async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy> {
        let url = self
            .hierarchy_endpoint
            .replace(NAME_PLACEHOLDER, attribute.name());
        let doc: HierarchyDoc = self.fetch_json(&url).await?;
        Some(Hierarchy::new(attribute.clone(), doc.tiers))
    }

    async fn users(&self) -> HashSet<String> {
        let Some(url) = &self.users_url else {
            warn!(
                endpoint = self.user_endpoint,
                "user enumeration unavailable: endpoint template has a non-standard shape"
            );
            return HashSet::new();
        };
        match self.fetch_json::<UsersDoc>(url).await {
            Some(doc) => doc.users.into_iter().collect(),
            None => HashSet::new(),
        }
    }
}

fn validate_template(template: &str, placeholder: &str) -> StoreResult<()> {
    let probe = template.replace(placeholder, "probe");
    Url::parse(&probe).map_err(|error| StoreError::BadEndpoint {
        url: template.to_string(),
        reason: error.to_string(),
    })?;
    Ok(())
}

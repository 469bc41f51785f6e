//! Attribute value types.
//!
//! An [`Attribute`] is a named axis of classification (`credentials`,
//! `clearance`). Users hold [`AttributeValue`] assignments, grouped into an
//! [`AttributeValueSet`]. A [`Hierarchy`] ranks the values of one attribute
//! from lowest tier to highest, enabling "at least tier X" comparisons.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The value assigned to a bare attribute name (`employee` is shorthand for
/// `employee=true`).
pub const BARE_VALUE: &str = "true";

/// A named classification axis. Equality and hashing are by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribute(String);

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One attribute-value assignment, e.g. `credentials=hnd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValue {
    attribute: Attribute,
    value: String,
}

impl AttributeValue {
    pub fn new(attribute: Attribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    /// Parses a `name=value` or bare `name` assignment string.
    ///
    /// A bare name is shorthand for `name=true`.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidAttributeValue {
            value: text.to_string(),
        };
        match text.split_once('=') {
            Some((name, value)) => {
                let name = name.trim();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::new(Attribute::new(name), value))
            }
            None => {
                let name = text.trim();
                if name.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::new(Attribute::new(name), BARE_VALUE))
            }
        }
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == BARE_VALUE {
            f.write_str(self.attribute.name())
        } else {
            write!(f, "{}={}", self.attribute, self.value)
        }
    }
}

/// The unordered set of attribute-value assignments held by one user.
///
/// Immutable once constructed. A user with no record at all is represented by
/// the absence of a set (`None` from a store), not by an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeValueSet {
    values: Vec<AttributeValue>,
}

impl AttributeValueSet {
    pub fn from_values(values: impl IntoIterator<Item = AttributeValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Parses a comma-separated list of assignment strings, e.g.
    /// `"credentials=hnd, employee"`.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let values = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(AttributeValue::parse)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self { values })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeValue> {
        self.values.iter()
    }

    /// All values the user holds for the given attribute.
    pub fn values_of<'a>(&'a self, attribute: &'a Attribute) -> impl Iterator<Item = &'a str> {
        self.values
            .iter()
            .filter(move |av| av.attribute() == attribute)
            .map(|av| av.value())
    }

    /// True iff the user holds exactly this attribute-value pair.
    pub fn contains(&self, attribute: &Attribute, value: &str) -> bool {
        self.values_of(attribute).any(|v| v == value)
    }

    /// The distinct attributes present in this set.
    pub fn attributes(&self) -> HashSet<&Attribute> {
        self.values.iter().map(AttributeValue::attribute).collect()
    }
}

/// An ordered ranking of the values of one attribute, lowest tier first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    attribute: Attribute,
    tiers: Vec<String>,
}

impl Hierarchy {
    pub fn new(attribute: Attribute, tiers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attribute,
            tiers: tiers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    /// Tier values, lowest first.
    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    /// A hierarchy with no tiers carries no ranking information and is
    /// treated the same as an absent hierarchy.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The rank of a tier value, 0 being the lowest. `None` if the value is
    /// not a tier of this hierarchy.
    pub fn rank(&self, value: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t == value)
    }
}

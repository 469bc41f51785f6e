//! Domain model for attribute-based access control decisions.
//!
//! This crate defines the attribute data model (attributes, attribute-value
//! sets, hierarchies) and the label-expression language that guards access to
//! resources. A label is a comma-separated list of boolean expressions over a
//! subject's attributes; the list evaluates as a conjunction with default-deny
//! semantics (an empty list denies).
//!
//! Hierarchy lookups during evaluation go through the [`HierarchySource`]
//! trait, which attribute stores implement, keeping this crate free of any
//! storage or transport concerns.

pub mod error;
pub mod label;
pub mod model;

pub use error::{DomainError, DomainResult};
pub use label::{parse_label_list, AttributeExpr, EvalContext, HierarchySource};
pub use model::{Attribute, AttributeValue, AttributeValueSet, Hierarchy};

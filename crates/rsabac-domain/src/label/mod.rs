//! The label-expression language.
//!
//! A label guarding a resource is a comma-separated list of boolean
//! expressions over attributes:
//!
//! ```text
//! credentials = hnd && employee, !contractor
//! ```
//!
//! [`parse_label_list`] turns label text into an ordered `Vec<AttributeExpr>`;
//! the protocol layer evaluates the list as a short-circuit conjunction.
//! Individual expressions support `&&`, `||`, `!`, parentheses, and atomic
//! terms (`name` or `name = value`). The single-character forms `&` and `|`
//! are accepted as aliases.

mod eval;
mod parser;

pub use eval::{EvalContext, HierarchySource};
pub use parser::parse_label_list;

use crate::model::Attribute;

/// A parsed boolean expression over a subject's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeExpr {
    /// An atomic term: the subject must hold `attribute=value`, either
    /// exactly or at-or-above `value` in the attribute's hierarchy.
    /// A bare `name` term parses as `name=true`.
    Term { attribute: Attribute, value: String },
    And(Box<AttributeExpr>, Box<AttributeExpr>),
    Or(Box<AttributeExpr>, Box<AttributeExpr>),
    Not(Box<AttributeExpr>),
}

impl AttributeExpr {
    /// Convenience constructor for an atomic term.
    pub fn term(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term {
            attribute: Attribute::new(attribute),
            value: value.into(),
        }
    }
}

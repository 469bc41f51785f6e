//! Expression evaluation against a subject's attributes.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use super::AttributeExpr;
use crate::model::{Attribute, AttributeValueSet, Hierarchy};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Supplies attribute hierarchies during evaluation.
///
/// Attribute stores implement this; the evaluator itself stays independent of
/// where hierarchy data lives (local dataset, remote authority, cache).
#[async_trait]
pub trait HierarchySource: Send + Sync {
    /// The hierarchy for an attribute, or `None` when no hierarchy is
    /// defined. Implementations report lookup failures as `None`.
    async fn hierarchy_for(&self, attribute: &Attribute) -> Option<Hierarchy>;
}

/// The working state for evaluating one request: the subject's attribute set
/// plus a hierarchy source. Constructed fresh per request, never persisted.
pub struct EvalContext<'a> {
    attributes: &'a AttributeValueSet,
    hierarchies: &'a dyn HierarchySource,
}

impl<'a> EvalContext<'a> {
    pub fn new(attributes: &'a AttributeValueSet, hierarchies: &'a dyn HierarchySource) -> Self {
        Self {
            attributes,
            hierarchies,
        }
    }

    pub fn attributes(&self) -> &AttributeValueSet {
        self.attributes
    }
}

impl AttributeExpr {
    /// Evaluates this expression against the context.
    ///
    /// Boxed recursion keeps the async call tree object-sized regardless of
    /// expression depth.
    pub fn eval<'a>(&'a self, ctx: &'a EvalContext<'a>) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            match self {
                AttributeExpr::Term { attribute, value } => eval_term(attribute, value, ctx).await,
                AttributeExpr::And(lhs, rhs) => lhs.eval(ctx).await && rhs.eval(ctx).await,
                AttributeExpr::Or(lhs, rhs) => lhs.eval(ctx).await || rhs.eval(ctx).await,
                AttributeExpr::Not(inner) => !inner.eval(ctx).await,
            }
        })
    }
}

/// A term `attribute=value` holds when the subject has the pair exactly, or
/// when the attribute has a non-empty hierarchy and some value the subject
/// holds ranks at or above the required tier. Values outside the hierarchy
/// contribute nothing.
async fn eval_term(attribute: &Attribute, value: &str, ctx: &EvalContext<'_>) -> bool {
    if ctx.attributes.contains(attribute, value) {
        return true;
    }
    let Some(hierarchy) = ctx.hierarchies.hierarchy_for(attribute).await else {
        return false;
    };
    if hierarchy.is_empty() {
        return false;
    }
    let Some(required) = hierarchy.rank(value) else {
        return false;
    };
    ctx.attributes
        .values_of(attribute)
        .any(|held| hierarchy.rank(held).is_some_and(|rank| rank >= required))
}

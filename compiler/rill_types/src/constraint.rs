//! Typing constraints emitted by collection and consumed by the solver.

use rill_ir::Span;
use rustc_hash::FxHashSet;

use crate::term::{Type, TypeScheme, TypeVar};

/// A single typing constraint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The two types must unify.
    Equality {
        left: Type,
        right: Type,
        span: Option<Span>,
    },
    /// `sub` must be a subtype of `sup` under the minimal relation.
    Subtype {
        sub: Type,
        sup: Type,
        span: Option<Span>,
    },
    /// `var` is an instance of `scheme` (let-polymorphism).
    Instance {
        var: TypeVar,
        scheme: TypeScheme,
        span: Option<Span>,
    },
}

impl Constraint {
    pub fn equality(left: Type, right: Type, span: Option<Span>) -> Self {
        Constraint::Equality { left, right, span }
    }

    pub fn subtype(sub: Type, sup: Type, span: Option<Span>) -> Self {
        Constraint::Subtype { sub, sup, span }
    }

    pub fn instance(var: TypeVar, scheme: TypeScheme, span: Option<Span>) -> Self {
        Constraint::Instance { var, scheme, span }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Constraint::Equality { span, .. }
            | Constraint::Subtype { span, .. }
            | Constraint::Instance { span, .. } => *span,
        }
    }
}

/// An ordered multiset of constraints.
///
/// Emission order is preserved; the solver is a deterministic function of
/// it. Exact duplicates may be removed without changing the solution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        ConstraintSet::default()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn extend(&mut self, other: ConstraintSet) {
        self.constraints.extend(other.constraints);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Drop exact duplicates, keeping the first occurrence of each.
    pub fn dedup(&mut self) {
        let mut seen = FxHashSet::default();
        self.constraints.retain(|c| seen.insert(c.clone()));
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        ConstraintSet {
            constraints: iter.into_iter().collect(),
        }
    }
}

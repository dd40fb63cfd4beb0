//! Unification failure modes.

use rill_ir::Span;
use thiserror::Error;

use crate::term::{Type, TypeVar};

/// An error produced by unification or constraint solving.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum UnifyError {
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Option<Span>,
    },

    /// The occurs-check rejected a self-referential binding.
    #[error("infinite type: `{var}` occurs in `{ty}`")]
    InfiniteType {
        var: TypeVar,
        ty: Type,
        span: Option<Span>,
    },

    #[error("arity mismatch: expected {expected}, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    /// The constraint set itself is inconsistent, e.g. an instance
    /// constraint whose quantified variables are already bound.
    #[error("constraint solving failed: {detail}")]
    ConstraintSolvingFailed { detail: String, span: Option<Span> },
}

impl UnifyError {
    /// The recorded source location, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            UnifyError::TypeMismatch { span, .. }
            | UnifyError::InfiniteType { span, .. }
            | UnifyError::ArityMismatch { span, .. }
            | UnifyError::ConstraintSolvingFailed { span, .. } => *span,
        }
    }

    /// Attach a location when none was recorded deeper in the recursion.
    pub(crate) fn with_span(self, span: Option<Span>) -> Self {
        if self.span().is_some() || span.is_none() {
            return self;
        }
        match self {
            UnifyError::TypeMismatch {
                expected, found, ..
            } => UnifyError::TypeMismatch {
                expected,
                found,
                span,
            },
            UnifyError::InfiniteType { var, ty, .. } => UnifyError::InfiniteType { var, ty, span },
            UnifyError::ArityMismatch {
                expected, found, ..
            } => UnifyError::ArityMismatch {
                expected,
                found,
                span,
            },
            UnifyError::ConstraintSolvingFailed { detail, .. } => {
                UnifyError::ConstraintSolvingFailed { detail, span }
            }
        }
    }
}

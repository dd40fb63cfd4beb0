//! The type error taxonomy.

use rill_ir::Span;
use thiserror::Error;

use crate::term::Type;
use crate::unify::UnifyError;

/// A type checking error with an optional source location.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TypeError {
    #[error("unresolved symbol `{name}`")]
    UnresolvedSymbol { name: String, span: Option<Span> },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Option<Span>,
    },

    #[error("undefined type `{name}`")]
    UndefinedType { name: String, span: Option<Span> },

    #[error("wrong number of arguments: expected {expected}, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    #[error("invalid operation: {message}")]
    InvalidOperation { message: String, span: Option<Span> },

    #[error("non-exhaustive match: missing {}", .missing.join(", "))]
    NonExhaustiveMatch {
        /// Uncovered variant names, in declaration order.
        missing: Vec<String>,
        span: Option<Span>,
    },

    #[error("duplicate definition of `{name}`")]
    DuplicateDefinition { name: String, span: Option<Span> },

    #[error("`try` is only allowed in a Result-returning context")]
    InvalidTryExpressionContext { span: Option<Span> },

    #[error("`try` target has type `{found}`, which is not a Result")]
    InvalidTryExpressionTarget { found: Type, span: Option<Span> },

    #[error("Result error type `{found}` is not Throwable or an Exception/Error type")]
    InvalidResultErrorType { found: Type, span: Option<Span> },

    #[error("incompatible error types `{first}` and `{second}`")]
    IncompatibleErrorTypes {
        first: Type,
        second: Type,
        span: Option<Span>,
    },

    #[error("{} type errors", .errors.len())]
    MultipleErrors {
        errors: Vec<TypeError>,
        span: Option<Span>,
    },
}

impl TypeError {
    /// The source location, when one was recorded.
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeError::UnresolvedSymbol { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::UndefinedType { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::InvalidOperation { span, .. }
            | TypeError::NonExhaustiveMatch { span, .. }
            | TypeError::DuplicateDefinition { span, .. }
            | TypeError::InvalidTryExpressionContext { span }
            | TypeError::InvalidTryExpressionTarget { span, .. }
            | TypeError::InvalidResultErrorType { span, .. }
            | TypeError::IncompatibleErrorTypes { span, .. }
            | TypeError::MultipleErrors { span, .. } => *span,
        }
    }

    /// Aggregate accumulated errors: a single error passes through, more
    /// than one becomes `MultipleErrors`.
    ///
    /// # Panics
    /// Panics if `errors` is empty; callers aggregate only after at least
    /// one failure.
    pub fn aggregate(mut errors: Vec<TypeError>, span: Option<Span>) -> TypeError {
        assert!(!errors.is_empty(), "aggregate called with no errors");
        if errors.len() == 1 {
            errors.pop().expect("length checked above")
        } else {
            TypeError::MultipleErrors { errors, span }
        }
    }

    /// Translate a unifier error, supplying `span` where the unifier did
    /// not record one.
    pub fn from_unify(err: UnifyError, span: Option<Span>) -> TypeError {
        match err {
            UnifyError::TypeMismatch {
                expected,
                found,
                span: err_span,
            } => TypeError::TypeMismatch {
                expected,
                found,
                span: err_span.or(span),
            },
            UnifyError::InfiniteType {
                var,
                ty,
                span: err_span,
            } => TypeError::TypeMismatch {
                expected: Type::Var(var),
                found: ty,
                span: err_span.or(span),
            },
            UnifyError::ArityMismatch {
                expected,
                found,
                span: err_span,
            } => TypeError::ArityMismatch {
                expected,
                found,
                span: err_span.or(span),
            },
            UnifyError::ConstraintSolvingFailed {
                detail,
                span: err_span,
            } => TypeError::InvalidOperation {
                message: format!("constraint solving failed: {detail}"),
                span: err_span.or(span),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::PrimitiveType;

    #[test]
    fn aggregate_unwraps_singletons() {
        let err = TypeError::UnresolvedSymbol {
            name: "x".into(),
            span: None,
        };
        assert_eq!(TypeError::aggregate(vec![err.clone()], None), err);
    }

    #[test]
    fn aggregate_wraps_multiple() {
        let a = TypeError::UnresolvedSymbol {
            name: "a".into(),
            span: None,
        };
        let b = TypeError::UnresolvedSymbol {
            name: "b".into(),
            span: None,
        };
        match TypeError::aggregate(vec![a, b], None) {
            TypeError::MultipleErrors { errors, .. } => assert_eq!(errors.len(), 2),
            other => panic!("expected MultipleErrors, got {other:?}"),
        }
    }

    #[test]
    fn display_mentions_the_types() {
        let err = TypeError::TypeMismatch {
            expected: Type::Primitive(PrimitiveType::Int),
            found: Type::Primitive(PrimitiveType::String),
            span: None,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: expected `Int`, found `String`"
        );
    }

    #[test]
    fn missing_variants_are_listed() {
        let err = TypeError::NonExhaustiveMatch {
            missing: vec!["None".into(), "Some".into()],
            span: None,
        };
        assert_eq!(err.to_string(), "non-exhaustive match: missing None, Some");
    }
}

//! Match patterns.

use crate::expr::{Expr, Literal};
use crate::span::Span;

/// A pattern with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }
}

/// Pattern variants.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// `_` - matches anything, binds nothing.
    Wildcard,
    /// Binds the whole scrutinee, unless the name is a nullary variant of
    /// the scrutinee's union, in which case it matches that variant.
    Identifier(String),
    Literal(Literal),
    /// `Some(x)` - decomposes a tagged-union variant.
    Constructor { name: String, args: Vec<Pattern> },
    /// `p if cond` - the guard is checked against `Boolean` with the
    /// inner pattern's bindings in scope.
    Guard {
        inner: Box<Pattern>,
        condition: Box<Expr>,
    },
}

impl Pattern {
    /// The innermost non-guard pattern.
    pub fn strip_guards(&self) -> &Pattern {
        match &self.kind {
            PatternKind::Guard { inner, .. } => inner.strip_guards(),
            _ => self,
        }
    }
}

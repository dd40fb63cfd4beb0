//! Statement nodes for block bodies.

use crate::expr::Expr;
use crate::span::Span;
use crate::ty_expr::TypeExpr;

/// A statement inside a block.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `let x = e` / `var x: T = e`
    Let {
        name: String,
        mutable: bool,
        annotation: Option<TypeExpr>,
        value: Expr,
        span: Span,
    },
    /// `x = e` - only valid for `var` bindings.
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    /// An expression evaluated for effect.
    Expr(Expr),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let { span, .. } | Statement::Assign { span, .. } => *span,
            Statement::Expr(e) => e.span,
        }
    }
}

//! The checker's output.

use rill_ir::Expr;
use rill_types::Type;

/// A successfully checked expression with its resolved type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedExpression {
    pub expr: Expr,
    pub ty: Type,
}

impl TypedExpression {
    pub fn new(expr: Expr, ty: Type) -> Self {
        TypedExpression { expr, ty }
    }
}

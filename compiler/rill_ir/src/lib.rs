//! Rill IR - the AST boundary of the type checker.
//!
//! This crate contains the tree shapes the parser hands to the checker:
//! - Spans for source locations
//! - Expressions, patterns, and statements
//! - Surface type annotations (`TypeExpr`), resolved by the checker
//!
//! Trees are immutable boxed values. The checker never mutates them; it
//! produces a typed view on the side.

mod expr;
mod operators;
mod pattern;
mod span;
mod stmt;
mod ty_expr;

pub use expr::{Expr, ExprKind, Literal, MatchCase, Param};
pub use operators::{BinaryOp, UnaryOp};
pub use pattern::{Pattern, PatternKind};
pub use span::Span;
pub use stmt::Statement;
pub use ty_expr::{TypeExpr, TypeExprKind};

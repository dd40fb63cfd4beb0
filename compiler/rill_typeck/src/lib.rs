//! Type checker for Rill.
//!
//! The checker turns an expression plus a caller-provided [`TypeContext`]
//! into a [`TypedExpression`] or a [`TypeError`]. Two strategies share
//! that contract:
//!
//! - [`ConstraintChecker`] walks the tree bidirectionally, emits
//!   constraints, solves them, and applies the resulting substitution.
//! - [`AlgorithmicChecker`] synthesizes types directly with a mutable
//!   scope stack and verifies expected types by structural compatibility.
//!
//! Both delegate equality, subtyping, and type construction to
//! `rill_types`, so they cannot drift apart on the core relations.

mod algorithmic;
mod collect;
mod driver;
mod pattern;
mod resolve;
mod shared;
mod typed;

pub use algorithmic::AlgorithmicChecker;
pub use collect::ConstraintCollector;
pub use driver::{type_check, type_check_with_expected, CheckStrategy, ConstraintChecker};
pub use pattern::{Coverage, PatternOutcome};
pub use resolve::resolve_type_expr;
pub use typed::TypedExpression;

pub use rill_types::{TypeContext, TypeError};

//! Type system for Rill.
//!
//! This crate owns everything the checker needs to talk about types:
//! - `Type`: the structural type term, with `TypeScheme` for polymorphism
//! - `TypeFactory`: interned construction and fresh inference variables
//! - `Substitution`: finite `TypeVar -> Type` maps with composition
//! - `Constraint`/`ConstraintSet`: the solver input emitted by collection
//! - `InferenceEnv`: persistent, parent-linked scoping for inference
//! - `ScopeManager`: the mutable scope stack used by the direct checker
//! - `Unifier`: Robinson unification and constraint solving
//! - `compare`/`validate`: the shared equality, subtype, and validity
//!   relations both checking strategies use
//!
//! Type terms are persistent values: interning deduplicates construction
//! but no algorithm depends on pointer identity.

pub mod builtins;
pub mod compare;
mod constraint;
mod context;
mod def;
mod env;
mod error;
mod factory;
mod scope;
mod subst;
mod term;
mod unify;
pub mod validate;

pub use constraint::{Constraint, ConstraintSet};
pub use context::TypeContext;
pub use def::{FunctionSignature, TypeDef, UnionDef, VariantDef};
pub use env::InferenceEnv;
pub use error::TypeError;
pub use factory::TypeFactory;
pub use scope::{ScopeManager, VariableBinding};
pub use subst::Substitution;
pub use term::{is_type_var_name, PrimitiveType, Type, TypeScheme, TypeVar};
pub use unify::{Unifier, UnifyError};

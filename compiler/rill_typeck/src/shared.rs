//! Helpers shared by both checking strategies.

use rill_ir::Literal;
use rill_types::{FunctionSignature, PrimitiveType, Type, TypeFactory};
use rustc_hash::FxHashMap;

/// The type of a literal.
///
/// Float literals type as `Double`; `null` types as `Unit?`.
pub(crate) fn literal_type(factory: &TypeFactory, literal: &Literal) -> Type {
    match literal {
        Literal::Int(_) => Type::Primitive(PrimitiveType::Int),
        Literal::Float(_) => Type::Primitive(PrimitiveType::Double),
        Literal::String(_) => Type::Primitive(PrimitiveType::String),
        Literal::Bool(_) => Type::Primitive(PrimitiveType::Boolean),
        Literal::Null => factory.nullable(Type::UNIT),
    }
}

/// Instantiate a function signature as a bare function type, replacing
/// declared type parameters with fresh inference variables.
pub(crate) fn instantiate_signature(factory: &TypeFactory, sig: &FunctionSignature) -> Type {
    if !sig.is_generic() {
        return sig.as_function_type();
    }
    let mapping: FxHashMap<String, Type> = sig
        .type_params
        .iter()
        .map(|p| (p.clone(), factory.fresh_var()))
        .collect();
    let params = sig
        .params
        .iter()
        .map(|p| p.substitute_named(&mapping))
        .collect();
    let ret = sig.ret.substitute_named(&mapping);
    factory.function(params, ret)
}

/// The union name a scrutinee refers to, if any.
pub(crate) fn union_name_of(ty: &Type) -> Option<&str> {
    match ty {
        Type::Union { name, .. } | Type::Generic { name, .. } => Some(name),
        _ => None,
    }
}

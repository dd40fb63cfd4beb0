//! Structural comparison and the subtype relation.
//!
//! Both checking strategies go through this module; there is exactly one
//! equality, one subtype relation, and one compatibility relation.

use crate::term::{is_type_var_name, Type};

/// Structural equality of two terms.
///
/// Terms carry no source locations, so this is the derived `Eq`; the
/// named function exists as the single spelling used across components.
pub fn structural_equals(a: &Type, b: &Type) -> bool {
    a == b
}

/// The subtype relation: reflexivity, numeric widening, function
/// contravariance/covariance, invariant generics, and nullability
/// lifting. Deliberately not a full lattice.
pub fn is_subtype(sub: &Type, sup: &Type) -> bool {
    // Reflexivity covers primitives, invariant generics, and everything
    // else that is structurally equal.
    if sub == sup {
        return true;
    }

    match (sub, sup) {
        // Int < Long < Float < Double.
        (Type::Primitive(a), Type::Primitive(b)) => match (a.numeric_rank(), b.numeric_rank()) {
            (Some(ra), Some(rb)) => ra <= rb,
            _ => false,
        },

        // Contravariant parameters, covariant return.
        (
            Type::Function {
                params: p1,
                ret: r1,
            },
            Type::Function {
                params: p2,
                ret: r2,
            },
        ) => {
            p1.len() == p2.len()
                && p1.iter().zip(p2).all(|(a, b)| is_subtype(b, a))
                && is_subtype(r1, r2)
        }

        // T? <: U? when T <: U.
        (Type::Nullable(a), Type::Nullable(b)) => is_subtype(a, b),

        // T <: T? (nullability lifting).
        (a, Type::Nullable(b)) => is_subtype(a, b),

        _ => false,
    }
}

/// Compatibility: structural equality loosened by two rules.
///
/// - inference variables and type-parameter references (`Named` terms of
///   type-variable shape) match anything;
/// - `Generic(name, args)` and `Union(name, args)` with matching names
///   and arities are interchangeable, componentwise.
///
/// Ordinary nominal names still require equality.
pub fn are_compatible(a: &Type, b: &Type) -> bool {
    if a == b {
        return true;
    }

    match (a, b) {
        (Type::Var(_), _) | (_, Type::Var(_)) => true,

        (Type::Named(n), _) | (_, Type::Named(n)) if is_type_var_name(n) => true,

        (
            Type::Generic { name: n1, args: a1 } | Type::Union { name: n1, args: a1 },
            Type::Generic { name: n2, args: a2 } | Type::Union { name: n2, args: a2 },
        ) => {
            n1 == n2
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(x, y)| are_compatible(x, y))
        }

        (Type::Tuple(e1), Type::Tuple(e2)) => {
            e1.len() == e2.len() && e1.iter().zip(e2).all(|(x, y)| are_compatible(x, y))
        }

        (
            Type::Function {
                params: p1,
                ret: r1,
            },
            Type::Function {
                params: p2,
                ret: r2,
            },
        ) => {
            p1.len() == p2.len()
                && p1.iter().zip(p2).all(|(x, y)| are_compatible(x, y))
                && are_compatible(r1, r2)
        }

        (Type::Nullable(x), Type::Nullable(y)) => are_compatible(x, y),

        _ => false,
    }
}

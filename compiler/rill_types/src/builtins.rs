//! The builtin type registry and the numeric widening chain.

use crate::term::{PrimitiveType, Type};

/// The numeric widening chain, narrowest first.
pub const NUMERIC_PRECEDENCE: [PrimitiveType; 4] = [
    PrimitiveType::Int,
    PrimitiveType::Long,
    PrimitiveType::Float,
    PrimitiveType::Double,
];

/// Resolve a builtin type by its source-level name.
pub fn lookup(name: &str) -> Option<Type> {
    PrimitiveType::from_name(name).map(Type::Primitive)
}

/// The wider of two numeric primitives, or `None` if either is outside
/// the chain. Commutative and idempotent.
pub fn wider_numeric(a: PrimitiveType, b: PrimitiveType) -> Option<PrimitiveType> {
    let ra = a.numeric_rank()?;
    let rb = b.numeric_rank()?;
    Some(if ra >= rb { a } else { b })
}

/// The wider of two numeric type terms.
pub fn wider_numeric_type(a: &Type, b: &Type) -> Option<Type> {
    match (a, b) {
        (Type::Primitive(pa), Type::Primitive(pb)) => {
            wider_numeric(*pa, *pb).map(Type::Primitive)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_resolves_only_builtins() {
        assert_eq!(lookup("Int"), Some(Type::Primitive(PrimitiveType::Int)));
        assert_eq!(
            lookup("Throwable"),
            Some(Type::Primitive(PrimitiveType::Throwable))
        );
        assert_eq!(lookup("Option"), None);
    }

    #[test]
    fn wider_is_commutative_and_idempotent() {
        for a in NUMERIC_PRECEDENCE {
            assert_eq!(wider_numeric(a, a), Some(a));
            for b in NUMERIC_PRECEDENCE {
                assert_eq!(wider_numeric(a, b), wider_numeric(b, a));
            }
        }
    }

    #[test]
    fn wider_follows_the_chain() {
        use PrimitiveType::*;
        assert_eq!(wider_numeric(Int, Long), Some(Long));
        assert_eq!(wider_numeric(Int, Double), Some(Double));
        assert_eq!(wider_numeric(Long, Float), Some(Float));
        assert_eq!(wider_numeric(Int, Boolean), None);
    }
}

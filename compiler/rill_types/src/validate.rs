//! Type validation.
//!
//! Checks a fully constructed term for well-formedness: composite types
//! are recursively valid, and `Result`'s error parameter is a Throwable
//! subtype (the primitive itself, or a nominal ending in `Exception` or
//! `Error`; unresolved variables pass).

use crate::error::TypeError;
use crate::term::{is_type_var_name, PrimitiveType, Type};

/// Validate a type term.
pub fn validate(ty: &Type) -> Result<(), TypeError> {
    match ty {
        // The primitive set is closed by construction.
        Type::Primitive(_) | Type::Var(_) => Ok(()),

        Type::Named(name) => {
            if name.is_empty() {
                return Err(TypeError::UndefinedType {
                    name: name.clone(),
                    span: None,
                });
            }
            Ok(())
        }

        Type::Generic { name, args } | Type::Union { name, args } => {
            if name.is_empty() {
                return Err(TypeError::UndefinedType {
                    name: name.clone(),
                    span: None,
                });
            }
            if name == "Result" && args.len() == 2 {
                check_error_parameter(&args[1])?;
            }
            args.iter().try_for_each(validate)
        }

        Type::Tuple(elems) => elems.iter().try_for_each(validate),

        Type::Function { params, ret } => {
            params.iter().try_for_each(validate)?;
            validate(ret)
        }

        Type::Nullable(base) => {
            if matches!(**base, Type::Nullable(_)) {
                return Err(TypeError::InvalidOperation {
                    message: "nullable of nullable is not a valid type".into(),
                    span: None,
                });
            }
            validate(base)
        }
    }
}

/// `Result<T, E>`: `E` must be `Throwable` or a nominal type whose name
/// marks it as an exception. Unresolved variables are accepted; they are
/// checked again once solved.
fn check_error_parameter(err: &Type) -> Result<(), TypeError> {
    let ok = match err {
        Type::Primitive(PrimitiveType::Throwable) | Type::Var(_) => true,
        Type::Named(name) => {
            is_type_var_name(name) || name.ends_with("Exception") || name.ends_with("Error")
        }
        Type::Generic { name, .. } | Type::Union { name, .. } => {
            name.ends_with("Exception") || name.ends_with("Error")
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(TypeError::InvalidResultErrorType {
            found: err.clone(),
            span: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TypeVar;

    fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    fn result_of(err: Type) -> Type {
        Type::Generic {
            name: "Result".into(),
            args: vec![int(), err],
        }
    }

    #[test]
    fn throwable_error_parameter_is_valid() {
        assert!(validate(&result_of(Type::Primitive(PrimitiveType::Throwable))).is_ok());
    }

    #[test]
    fn exception_suffixed_nominals_are_valid() {
        assert!(validate(&result_of(Type::Named("ParseException".into()))).is_ok());
        assert!(validate(&result_of(Type::Named("IoError".into()))).is_ok());
    }

    #[test]
    fn arbitrary_error_parameter_is_rejected() {
        let err = validate(&result_of(int())).unwrap_err();
        assert!(matches!(err, TypeError::InvalidResultErrorType { .. }));

        let err = validate(&result_of(Type::Named("Config".into()))).unwrap_err();
        assert!(matches!(err, TypeError::InvalidResultErrorType { .. }));
    }

    #[test]
    fn unresolved_error_parameter_passes() {
        assert!(validate(&result_of(Type::Var(TypeVar(0)))).is_ok());
        assert!(validate(&result_of(Type::Named("E".into()))).is_ok());
    }

    #[test]
    fn validation_recurses_into_composites() {
        let bad = Type::Tuple(vec![int(), result_of(int())]);
        assert!(validate(&bad).is_err());

        let bad_fn = Type::Function {
            params: vec![int()],
            ret: Box::new(result_of(Type::Named("Oops".into()))),
        };
        assert!(validate(&bad_fn).is_err());
    }

    #[test]
    fn nested_nullable_is_rejected() {
        // Built by hand; the factory collapses this at construction.
        let nested = Type::Nullable(Box::new(Type::Nullable(Box::new(int()))));
        assert!(validate(&nested).is_err());
    }
}

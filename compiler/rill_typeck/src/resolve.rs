//! Resolution of surface type annotations.

use rill_ir::{TypeExpr, TypeExprKind};
use rill_types::{builtins, InferenceEnv, Type, TypeError, TypeFactory};

/// Resolve a written annotation to a type term.
///
/// Builtins win first; names with a union definition in scope become
/// `Union` references with checked arity; other applied names become
/// `Generic`; bare unknown names are accepted only when they look like
/// type parameters, otherwise the name is undefined.
pub fn resolve_type_expr(
    annotation: &TypeExpr,
    env: &InferenceEnv,
    factory: &TypeFactory,
) -> Result<Type, TypeError> {
    let span = Some(annotation.span);
    match &annotation.kind {
        TypeExprKind::Named { name, args } => {
            if let Some(builtin) = builtins::lookup(name) {
                if !args.is_empty() {
                    return Err(TypeError::ArityMismatch {
                        expected: 0,
                        found: args.len(),
                        span,
                    });
                }
                return Ok(builtin);
            }

            let resolved_args = args
                .iter()
                .map(|a| resolve_type_expr(a, env, factory))
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(union) = env.lookup_union(name) {
                if union.type_params.len() != resolved_args.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: union.type_params.len(),
                        found: resolved_args.len(),
                        span,
                    });
                }
                return Ok(factory.union(name.clone(), resolved_args));
            }

            if !resolved_args.is_empty() {
                return Ok(factory.generic(name.clone(), resolved_args));
            }

            if rill_types::is_type_var_name(name) {
                return Ok(factory.named(name.clone()));
            }

            Err(TypeError::UndefinedType {
                name: name.clone(),
                span,
            })
        }

        TypeExprKind::Tuple(elems) => {
            let resolved = elems
                .iter()
                .map(|e| resolve_type_expr(e, env, factory))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(factory.tuple(resolved))
        }

        TypeExprKind::Function { params, ret } => {
            let resolved_params = params
                .iter()
                .map(|p| resolve_type_expr(p, env, factory))
                .collect::<Result<Vec<_>, _>>()?;
            let resolved_ret = resolve_type_expr(ret, env, factory)?;
            Ok(factory.function(resolved_params, resolved_ret))
        }

        TypeExprKind::Nullable(base) => {
            let resolved = resolve_type_expr(base, env, factory)?;
            Ok(factory.nullable(resolved))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::Span;
    use rill_types::{TypeDef, UnionDef, VariantDef};

    fn named(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::new(
            TypeExprKind::Named {
                name: name.into(),
                args,
            },
            Span::DUMMY,
        )
    }

    fn env_with_option() -> InferenceEnv {
        InferenceEnv::new().with_type_definition(
            "Option",
            TypeDef::Union(UnionDef::new(
                vec!["T".into()],
                vec![
                    VariantDef::new("Some", vec![Type::Named("T".into())]),
                    VariantDef::new("None", vec![]),
                ],
            )),
        )
    }

    #[test]
    fn builtins_resolve_to_primitives() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let ty = resolve_type_expr(&named("Int", vec![]), &env, &factory).unwrap();
        assert_eq!(ty.to_string(), "Int");
    }

    #[test]
    fn builtins_reject_type_arguments() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let err =
            resolve_type_expr(&named("Int", vec![named("Int", vec![])]), &env, &factory)
                .unwrap_err();
        assert!(matches!(err, TypeError::ArityMismatch { .. }));
    }

    #[test]
    fn union_names_resolve_to_union_references() {
        let factory = TypeFactory::new();
        let env = env_with_option();
        let ty =
            resolve_type_expr(&named("Option", vec![named("Int", vec![])]), &env, &factory)
                .unwrap();
        assert_eq!(ty.to_string(), "Option<Int>");
        assert!(matches!(ty, Type::Union { .. }));
    }

    #[test]
    fn union_arity_is_checked() {
        let factory = TypeFactory::new();
        let env = env_with_option();
        let err = resolve_type_expr(&named("Option", vec![]), &env, &factory).unwrap_err();
        assert!(matches!(
            err,
            TypeError::ArityMismatch {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn applied_unknown_names_become_generics() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let ty =
            resolve_type_expr(&named("List", vec![named("Int", vec![])]), &env, &factory)
                .unwrap();
        assert!(matches!(ty, Type::Generic { .. }));
    }

    #[test]
    fn bare_unknown_names_are_undefined() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let err = resolve_type_expr(&named("Widget", vec![]), &env, &factory).unwrap_err();
        assert!(matches!(err, TypeError::UndefinedType { .. }));
    }

    #[test]
    fn type_parameter_names_resolve_to_named() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let ty = resolve_type_expr(&named("T", vec![]), &env, &factory).unwrap();
        assert_eq!(ty, Type::Named("T".into()));
    }

    #[test]
    fn nullable_annotations_resolve() {
        let factory = TypeFactory::new();
        let env = InferenceEnv::new();
        let annotation = TypeExpr::new(
            TypeExprKind::Nullable(Box::new(named("Int", vec![]))),
            Span::DUMMY,
        );
        let ty = resolve_type_expr(&annotation, &env, &factory).unwrap();
        assert_eq!(ty.to_string(), "Int?");
    }
}

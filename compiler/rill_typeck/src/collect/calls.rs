//! Call and constructor constraint collection.

use rill_ir::{Expr, ExprKind, Span};
use rill_types::{InferenceEnv, Type, TypeError};
use rustc_hash::FxHashMap;

use super::ConstraintCollector;

impl ConstraintCollector<'_> {
    pub(super) fn collect_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        // A capitalized callee that names a variant is a constructor
        // application, not a function call.
        if let ExprKind::Identifier(name) = &callee.kind {
            if env.lookup_variable(name).is_none() && env.find_variant(name).is_some() {
                return self.collect_constructor(name, args, env, span);
            }
        }

        let callee_ty = self.synthesize(callee, env)?;
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(self.synthesize(arg, env)?);
        }

        match callee_ty {
            Type::Function { params, ret } => {
                if params.len() != args.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: params.len(),
                        found: args.len(),
                        span: Some(span),
                    });
                }
                for ((param, arg_ty), arg) in params.into_iter().zip(arg_types).zip(args) {
                    self.emit_equality(param, arg_ty, Some(arg.span));
                }
                Ok(*ret)
            }

            // An unknown callee is constrained to a function of the
            // argument types; solving recovers the return type.
            ty if ty.is_var() => {
                let ret = self.factory().fresh_var();
                let expected = self.factory().function(arg_types, ret.clone());
                self.emit_equality(expected, ty, Some(span));
                Ok(ret)
            }

            other => Err(TypeError::InvalidOperation {
                message: format!("cannot call a value of type `{other}`"),
                span: Some(span),
            }),
        }
    }

    /// Locate the variant, enforce arity, substitute fresh type arguments
    /// into the declared field types, and constrain each argument.
    pub(super) fn collect_constructor(
        &mut self,
        name: &str,
        args: &[Expr],
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        let Some((union_name, union_def, variant)) = env.find_variant(name) else {
            return Err(TypeError::UnresolvedSymbol {
                name: name.to_owned(),
                span: Some(span),
            });
        };
        if variant.arity() != args.len() {
            return Err(TypeError::ArityMismatch {
                expected: variant.arity(),
                found: args.len(),
                span: Some(span),
            });
        }
        let union_name = union_name.to_owned();
        let type_params = union_def.type_params.clone();
        let fields = variant.fields.clone();

        let mut mapping = FxHashMap::default();
        let mut fresh_args = Vec::with_capacity(type_params.len());
        for param in &type_params {
            let fresh = self.factory().fresh_var();
            mapping.insert(param.clone(), fresh.clone());
            fresh_args.push(fresh);
        }

        for (field, arg) in fields.iter().zip(args) {
            let field_ty = field.substitute_named(&mapping);
            let arg_ty = self.synthesize(arg, env)?;
            self.emit_equality(field_ty, arg_ty, Some(arg.span));
        }

        Ok(self.factory().union(union_name, fresh_args))
    }
}

//! Control flow, blocks, lambdas, and `try` collection.

use rill_ir::{Expr, MatchCase, Param, Span, Statement};
use rill_types::{compare, InferenceEnv, Type, TypeError};

use super::ConstraintCollector;
use crate::pattern::{self, Coverage};
use crate::resolve::resolve_type_expr;
use crate::shared::union_name_of;

impl ConstraintCollector<'_> {
    pub(super) fn collect_if(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        self.check_boolean_condition(condition, env)?;

        match else_branch {
            Some(else_branch) => {
                let then_ty = self.synthesize(then_branch, env)?;
                let else_ty = self.synthesize(else_branch, env)?;
                self.emit_equality(then_ty.clone(), else_ty, Some(span));
                Ok(then_ty)
            }
            // Without an else the expression cannot produce a value.
            None => {
                self.synthesize(then_branch, env)?;
                Ok(Type::UNIT)
            }
        }
    }

    pub(super) fn collect_while(
        &mut self,
        condition: &Expr,
        body: &Expr,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        self.check_boolean_condition(condition, env)?;
        // The body type is ignored.
        self.synthesize(body, env)?;
        Ok(Type::UNIT)
    }

    pub(super) fn collect_for(
        &mut self,
        binding: &str,
        iterable: &Expr,
        body: &Expr,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        let elem = self.factory().fresh_var();
        let iterable_ty = self.synthesize(iterable, env)?;
        let expected = self.factory().generic("List", vec![elem.clone()]);
        self.emit_equality(expected, iterable_ty, Some(iterable.span));

        let body_env = env.enter_scope_with([(binding.to_owned(), elem)]);
        self.synthesize(body, &body_env)?;
        Ok(Type::UNIT)
    }

    /// Blocks thread bindings through their statements and accumulate
    /// statement errors, binding best-effort types so later statements
    /// still check.
    pub(super) fn collect_block(
        &mut self,
        statements: &[Statement],
        value: Option<&Expr>,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        let mut env = env.enter_scope();

        for statement in statements {
            match statement {
                Statement::Let {
                    name,
                    mutable,
                    annotation,
                    value,
                    ..
                } => {
                    let declared = annotation.as_ref().and_then(|a| {
                        match resolve_type_expr(a, &env, self.factory()) {
                            Ok(ty) => Some(ty),
                            Err(err) => {
                                self.record_error(err);
                                None
                            }
                        }
                    });

                    let bound = match &declared {
                        Some(declared_ty) => {
                            if let Err(err) = self.check_expected(value, declared_ty, &env) {
                                self.record_error(err);
                            }
                            declared_ty.clone()
                        }
                        None => match self.synthesize(value, &env) {
                            Ok(ty) => ty,
                            Err(err) => {
                                self.record_error(err);
                                Type::UNIT
                            }
                        },
                    };
                    env = if *mutable {
                        env.with_mutable_variable(name.clone(), bound)
                    } else {
                        env.with_variable(name.clone(), bound)
                    };
                }

                Statement::Assign { name, value, span } => {
                    match env.lookup_variable(name).cloned() {
                        Some(scheme) => {
                            if env.lookup_mutability(name) != Some(true) {
                                self.record_error(TypeError::InvalidOperation {
                                    message: format!(
                                        "cannot assign to immutable variable `{name}`"
                                    ),
                                    span: Some(*span),
                                });
                                continue;
                            }
                            let target = scheme.ty;
                            match self.synthesize(value, &env) {
                                Ok(ty) => self.emit_equality(target, ty, Some(value.span)),
                                Err(err) => self.record_error(err),
                            }
                        }
                        None => self.record_error(TypeError::UnresolvedSymbol {
                            name: name.clone(),
                            span: Some(*span),
                        }),
                    }
                }

                Statement::Expr(expr) => {
                    if let Err(err) = self.synthesize(expr, &env) {
                        self.record_error(err);
                    }
                }
            }
        }

        match value {
            Some(value) => self.synthesize(value, &env),
            None => Ok(Type::UNIT),
        }
    }

    /// Match cases all check against the scrutinee; the overall type is
    /// the expected type in checking mode, the shared case type when the
    /// cases agree, or a fresh variable equated with every case.
    pub(super) fn collect_match(
        &mut self,
        scrutinee: &Expr,
        cases: &[MatchCase],
        expected: Option<&Type>,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        let scrutinee_ty = self.synthesize(scrutinee, env)?;

        let mut coverage = Coverage::default();
        let mut case_types = Vec::with_capacity(cases.len());

        for case in cases {
            let outcome = pattern::check_pattern(self, &case.pattern, &scrutinee_ty, env)?;
            coverage.merge(outcome.coverage);

            let case_env = env.enter_scope_with(outcome.bindings);
            let case_ty = match expected {
                Some(expected_ty) => match self.check_expected(&case.body, expected_ty, &case_env)
                {
                    Ok(ty) => ty,
                    Err(err) => {
                        self.record_error(err);
                        expected_ty.clone()
                    }
                },
                None => match self.synthesize(&case.body, &case_env) {
                    Ok(ty) => ty,
                    Err(err) => {
                        self.record_error(err);
                        self.factory().fresh_var()
                    }
                },
            };
            case_types.push(case_ty);
        }

        self.check_exhaustiveness(&scrutinee_ty, &coverage, env, span)?;

        if let Some(expected_ty) = expected {
            return Ok(expected_ty.clone());
        }
        match case_types.split_first() {
            None => Ok(self.factory().fresh_var()),
            Some((first, rest)) => {
                if rest.iter().all(|t| compare::structural_equals(first, t)) {
                    Ok(first.clone())
                } else {
                    let result = self.factory().fresh_var();
                    for (ty, case) in case_types.iter().zip(cases) {
                        self.emit_equality(result.clone(), ty.clone(), Some(case.span));
                    }
                    Ok(result)
                }
            }
        }
    }

    fn check_exhaustiveness(
        &mut self,
        scrutinee_ty: &Type,
        coverage: &Coverage,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<(), TypeError> {
        if coverage.wildcard {
            return Ok(());
        }
        // Exhaustiveness is defined over union scrutinees; anything else
        // (including a still-unresolved variable) passes through.
        let Some(union) = union_name_of(scrutinee_ty).and_then(|n| env.lookup_union(n)) else {
            return Ok(());
        };
        let missing = pattern::missing_variants(union, coverage);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TypeError::NonExhaustiveMatch {
                missing,
                span: Some(span),
            })
        }
    }

    /// Lambdas bind fresh (or annotated) parameter types; in checking
    /// mode the expected function type drives the parameters and return.
    pub(super) fn collect_lambda(
        &mut self,
        params: &[Param],
        body: &Expr,
        expected: Option<(&Vec<Type>, &Type)>,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        let mut param_types = Vec::with_capacity(params.len());
        let mut bindings = Vec::with_capacity(params.len());

        for (index, param) in params.iter().enumerate() {
            let annotated = param
                .annotation
                .as_ref()
                .map(|a| resolve_type_expr(a, env, self.factory()))
                .transpose()?;
            let ty = match (annotated, expected) {
                (Some(annotated_ty), Some((expected_params, _))) => {
                    self.emit_equality(
                        expected_params[index].clone(),
                        annotated_ty.clone(),
                        Some(param.span),
                    );
                    annotated_ty
                }
                (Some(annotated_ty), None) => annotated_ty,
                (None, Some((expected_params, _))) => expected_params[index].clone(),
                (None, None) => self.factory().fresh_var(),
            };
            bindings.push((param.name.clone(), ty.clone()));
            param_types.push(ty);
        }

        let body_env = env.enter_scope_with(bindings);
        let body_ty = match expected {
            Some((_, expected_ret)) => {
                let entered_result = expected_ret.as_result().is_some();
                if entered_result {
                    self.push_result_context(expected_ret.clone());
                }
                let result = self.check_expected(body, expected_ret, &body_env);
                if entered_result {
                    self.pop_result_context();
                }
                result?;
                expected_ret.clone()
            }
            None => self.synthesize(body, &body_env)?,
        };

        Ok(self.factory().function(param_types, body_ty))
    }

    /// `try` unwraps a `Result` inside a `Result`-returning context.
    pub(super) fn collect_try(
        &mut self,
        inner: &Expr,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        let Some(context_ty) = self.result_context().cloned() else {
            return Err(TypeError::InvalidTryExpressionContext { span: Some(span) });
        };
        let Some((_, context_err)) = context_ty.as_result() else {
            return Err(TypeError::InvalidTryExpressionContext { span: Some(span) });
        };
        let context_err = context_err.clone();

        let inner_ty = self.synthesize(inner, env)?;

        if let Some((ok, err)) = inner_ty.as_result() {
            // Two concrete, unrelated error types cannot flow into one
            // Result; report them as a pair rather than a bare mismatch.
            if !err.is_var() && !context_err.is_var() && !compare::are_compatible(err, &context_err)
            {
                return Err(TypeError::IncompatibleErrorTypes {
                    first: err.clone(),
                    second: context_err,
                    span: Some(span),
                });
            }
            let ok = ok.clone();
            let err = err.clone();
            self.emit_equality(context_err, err, Some(span));
            Ok(ok)
        } else if inner_ty.is_var() {
            let ok = self.factory().fresh_var();
            let expected = self
                .factory()
                .generic("Result", vec![ok.clone(), context_err]);
            self.emit_equality(expected, inner_ty, Some(inner.span));
            Ok(ok)
        } else {
            Err(TypeError::InvalidTryExpressionTarget {
                found: inner_ty,
                span: Some(span),
            })
        }
    }

    fn result_context(&self) -> Option<&Type> {
        self.result_contexts.last()
    }
}

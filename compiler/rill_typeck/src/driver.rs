//! Checking strategies and the public entry points.

use rill_ir::Expr;
use rill_types::{
    compare, validate, InferenceEnv, Type, TypeContext, TypeError, TypeFactory, Unifier,
};

use crate::collect::ConstraintCollector;
use crate::typed::TypedExpression;

/// The capability both checking strategies provide.
pub trait CheckStrategy {
    /// Synthesize the type of `expr` under `ctx`.
    fn check(&self, expr: &Expr, ctx: &TypeContext) -> Result<TypedExpression, TypeError>;

    /// Check `expr` against an expected type under `ctx`.
    fn check_with_expected(
        &self,
        expr: &Expr,
        expected: &Type,
        ctx: &TypeContext,
    ) -> Result<TypedExpression, TypeError>;
}

/// The constraint-based strategy: collect, solve, apply, compare.
pub struct ConstraintChecker {
    factory: TypeFactory,
}

impl ConstraintChecker {
    pub fn new() -> Self {
        ConstraintChecker {
            factory: TypeFactory::new(),
        }
    }

    /// Share a factory with other phases (keeps fresh variables unique
    /// across them).
    pub fn with_factory(factory: TypeFactory) -> Self {
        ConstraintChecker { factory }
    }

    fn drain_errors(
        collector: &mut ConstraintCollector<'_>,
        result: Result<Type, TypeError>,
        expr: &Expr,
    ) -> Result<Type, TypeError> {
        let mut errors = collector.take_errors();
        match result {
            Ok(ty) if errors.is_empty() => Ok(ty),
            Ok(_) => Err(TypeError::aggregate(errors, Some(expr.span))),
            Err(err) => {
                errors.push(err);
                Err(TypeError::aggregate(errors, Some(expr.span)))
            }
        }
    }
}

impl Default for ConstraintChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckStrategy for ConstraintChecker {
    fn check(&self, expr: &Expr, ctx: &TypeContext) -> Result<TypedExpression, TypeError> {
        tracing::debug!("constraint checking (synthesis)");
        let env = InferenceEnv::from_type_context(ctx);
        let mut collector = ConstraintCollector::new(&self.factory);

        let synthesized = collector.synthesize(expr, &env);
        let ty = Self::drain_errors(&mut collector, synthesized, expr)?;

        let constraints = collector.take_constraints();
        let unifier = Unifier::new(&self.factory);
        let subst = unifier
            .solve(&constraints)
            .map_err(|e| TypeError::from_unify(e, Some(expr.span)))?;

        let final_ty = subst.apply(&ty);
        validate::validate(&final_ty)?;
        Ok(TypedExpression::new(expr.clone(), final_ty))
    }

    fn check_with_expected(
        &self,
        expr: &Expr,
        expected: &Type,
        ctx: &TypeContext,
    ) -> Result<TypedExpression, TypeError> {
        tracing::debug!(%expected, "constraint checking (checking mode)");
        validate::validate(expected)?;

        let env = InferenceEnv::from_type_context(ctx);
        let mut collector = ConstraintCollector::new(&self.factory);
        if expected.as_result().is_some() {
            collector.push_result_context(expected.clone());
        }

        let checked = collector.check_expected(expr, expected, &env);
        let ty = Self::drain_errors(&mut collector, checked, expr)?;

        let constraints = collector.take_constraints();
        let unifier = Unifier::new(&self.factory);
        let subst = unifier
            .solve(&constraints)
            .map_err(|e| TypeError::from_unify(e, Some(expr.span)))?;

        let final_ty = subst.apply(&ty);
        let final_expected = subst.apply(expected);
        if !compare::is_subtype(&final_ty, &final_expected)
            && !compare::are_compatible(&final_ty, &final_expected)
        {
            return Err(TypeError::TypeMismatch {
                expected: final_expected,
                found: final_ty,
                span: Some(expr.span),
            });
        }
        validate::validate(&final_expected)?;
        Ok(TypedExpression::new(expr.clone(), final_expected))
    }
}

/// Type check an expression, synthesizing its type.
///
/// Uses the constraint-based strategy.
pub fn type_check(expr: &Expr, ctx: &TypeContext) -> Result<TypedExpression, TypeError> {
    ConstraintChecker::new().check(expr, ctx)
}

/// Type check an expression against an expected type.
///
/// Uses the constraint-based strategy.
pub fn type_check_with_expected(
    expr: &Expr,
    expected: &Type,
    ctx: &TypeContext,
) -> Result<TypedExpression, TypeError> {
    ConstraintChecker::new().check_with_expected(expr, expected, ctx)
}

//! The direct checking strategy.
//!
//! Synthesizes types eagerly with a mutable scope stack, unifying on the
//! spot where inference variables meet concrete types. Checking mode
//! post-verifies the synthesized type against the expectation using the
//! shared subtype and compatibility relations.

use rill_ir::{BinaryOp, Expr, ExprKind, MatchCase, Param, Pattern, PatternKind, Span, Statement, UnaryOp};
use rill_types::{
    builtins, compare, validate, InferenceEnv, PrimitiveType, ScopeManager, Substitution, Type,
    TypeContext, TypeError, TypeFactory, Unifier, VariableBinding,
};
use rustc_hash::FxHashMap;

use crate::driver::CheckStrategy;
use crate::pattern::{self, Coverage, PatternOutcome};
use crate::resolve::resolve_type_expr;
use crate::shared;
use crate::typed::TypedExpression;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Direct per-node synthesis with eager unification.
pub struct AlgorithmicChecker {
    factory: TypeFactory,
}

impl AlgorithmicChecker {
    pub fn new() -> Self {
        AlgorithmicChecker {
            factory: TypeFactory::new(),
        }
    }

    pub fn with_factory(factory: TypeFactory) -> Self {
        AlgorithmicChecker { factory }
    }
}

impl Default for AlgorithmicChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckStrategy for AlgorithmicChecker {
    fn check(&self, expr: &Expr, ctx: &TypeContext) -> Result<TypedExpression, TypeError> {
        tracing::debug!("algorithmic checking (synthesis)");
        let mut walker = Walker::new(&self.factory, ctx);
        let ty = walker.synth(expr)?;
        let ty = walker.resolve(&ty);
        validate::validate(&ty)?;
        Ok(TypedExpression::new(expr.clone(), ty))
    }

    fn check_with_expected(
        &self,
        expr: &Expr,
        expected: &Type,
        ctx: &TypeContext,
    ) -> Result<TypedExpression, TypeError> {
        tracing::debug!(%expected, "algorithmic checking (checking mode)");
        validate::validate(expected)?;

        let mut walker = Walker::new(&self.factory, ctx);
        if expected.as_result().is_some() {
            walker.result_contexts.push(expected.clone());
        }
        let ty = walker.synth(expr)?;

        // Post-verification by structural compatibility.
        let found = walker.resolve(&ty);
        if !compare::is_subtype(&found, expected) && !compare::are_compatible(&found, expected) {
            return Err(TypeError::TypeMismatch {
                expected: expected.clone(),
                found,
                span: Some(expr.span),
            });
        }
        Ok(TypedExpression::new(expr.clone(), expected.clone()))
    }
}

/// Walker state for one checking run.
struct Walker<'a> {
    factory: &'a TypeFactory,
    ctx: &'a TypeContext,
    /// Environment mirror of `ctx`, used for annotation resolution.
    env: InferenceEnv,
    scopes: ScopeManager,
    subst: Substitution,
    result_contexts: Vec<Type>,
}

impl<'a> Walker<'a> {
    fn new(factory: &'a TypeFactory, ctx: &'a TypeContext) -> Self {
        let mut scopes = ScopeManager::new();
        for (name, ty) in ctx.variables() {
            // Registry keys are unique, so seeding cannot collide.
            let _ = scopes.declare_variable(VariableBinding {
                name: name.to_owned(),
                ty: ty.clone(),
                mutable: false,
                span: None,
            });
        }
        Walker {
            factory,
            ctx,
            env: InferenceEnv::from_type_context(ctx),
            scopes,
            subst: Substitution::empty(),
            result_contexts: Vec::new(),
        }
    }

    fn resolve(&self, ty: &Type) -> Type {
        self.subst.apply(ty)
    }

    /// Unify immediately, folding the step into the running substitution.
    fn unify_now(&mut self, expected: &Type, found: &Type, span: Span) -> Result<(), TypeError> {
        let unifier = Unifier::new(self.factory);
        let step = unifier
            .unify(&self.subst.apply(expected), &self.subst.apply(found))
            .map_err(|e| TypeError::from_unify(e, Some(span)))?;
        self.subst = step.compose(&self.subst);
        Ok(())
    }

    /// Accept `found` where `expected` is wanted: unify when possible,
    /// otherwise fall back to the subtype relation.
    fn check_fits(&mut self, expected: &Type, found: &Type, span: Span) -> Result<(), TypeError> {
        match self.unify_now(expected, found, span) {
            Ok(()) => Ok(()),
            Err(err) => {
                let found = self.resolve(found);
                let expected = self.resolve(expected);
                if compare::is_subtype(&found, &expected) {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.scopes.push_scope();
        let result = f(self);
        let popped = self.scopes.pop_scope();
        let value = result?;
        popped?;
        Ok(value)
    }

    fn synth(&mut self, expr: &Expr) -> Result<Type, TypeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.synth_inner(expr))
    }

    fn synth_inner(&mut self, expr: &Expr) -> Result<Type, TypeError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(shared::literal_type(self.factory, literal)),

            ExprKind::Tuple(elems) => {
                let types = elems
                    .iter()
                    .map(|e| self.synth(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.factory.tuple(types))
            }

            ExprKind::List(elems) => {
                let Some((first, rest)) = elems.split_first() else {
                    return Ok(self.factory.generic("List", vec![Type::UNIT]));
                };
                let elem_ty = self.synth(first)?;
                for elem in rest {
                    let ty = self.synth(elem)?;
                    self.check_fits(&elem_ty, &ty, elem.span)?;
                }
                let elem_ty = self.resolve(&elem_ty);
                Ok(self.factory.generic("List", vec![elem_ty]))
            }

            ExprKind::Identifier(name) => self.synth_identifier(name, expr.span),

            ExprKind::Binary { op, lhs, rhs } => self.synth_binary(*op, lhs, rhs, expr.span),

            ExprKind::Unary { op, operand } => self.synth_unary(*op, operand, expr.span),

            ExprKind::Call { callee, args } => self.synth_call(callee, args, expr.span),

            ExprKind::Constructor { name, args } => {
                self.synth_constructor(name, args, expr.span)
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond_ty = self.synth(condition)?;
                self.expect_boolean(&cond_ty, condition.span)?;
                match else_branch {
                    Some(else_branch) => {
                        let then_ty = self.synth(then_branch)?;
                        let else_ty = self.synth(else_branch)?;
                        self.unify_now(&then_ty, &else_ty, expr.span)?;
                        Ok(self.resolve(&then_ty))
                    }
                    None => {
                        self.synth(then_branch)?;
                        Ok(Type::UNIT)
                    }
                }
            }

            ExprKind::While { condition, body } => {
                let cond_ty = self.synth(condition)?;
                self.expect_boolean(&cond_ty, condition.span)?;
                self.synth(body)?;
                Ok(Type::UNIT)
            }

            ExprKind::Match { scrutinee, cases } => self.synth_match(scrutinee, cases, expr.span),

            ExprKind::Block { statements, value } => {
                self.with_scope(|w| w.synth_block(statements, value.as_deref()))
            }

            ExprKind::Lambda { params, body } => self.synth_lambda(params, body),

            ExprKind::For {
                binding,
                iterable,
                body,
            } => self.synth_for(binding, iterable, body),

            ExprKind::Try(inner) => self.synth_try(inner, expr.span),
        }
    }

    fn synth_identifier(&mut self, name: &str, span: Span) -> Result<Type, TypeError> {
        if let Some(binding) = self.scopes.lookup(name) {
            let ty = binding.ty.clone();
            return Ok(self.resolve(&ty));
        }
        if self
            .ctx
            .find_variant(name)
            .is_some_and(|(_, _, v)| v.is_nullary())
        {
            return self.synth_constructor(name, &[], span);
        }
        if let Some(sig) = self.ctx.function(name) {
            return Ok(shared::instantiate_signature(self.factory, sig));
        }
        Err(TypeError::UnresolvedSymbol {
            name: name.to_owned(),
            span: Some(span),
        })
    }

    fn synth_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<Type, TypeError> {
        let lhs_ty = self.synth(lhs)?;
        let lhs_ty = self.resolve(&lhs_ty);
        let rhs_ty = self.synth(rhs)?;
        let rhs_ty = self.resolve(&rhs_ty);

        if op.is_arithmetic() {
            if let Some(wider) = builtins::wider_numeric_type(&lhs_ty, &rhs_ty) {
                return Ok(wider);
            }
            match (lhs_ty.is_var(), rhs_ty.is_var()) {
                (true, false) if rhs_ty.is_numeric() => {
                    self.unify_now(&rhs_ty, &lhs_ty, span)?;
                    Ok(rhs_ty)
                }
                (false, true) if lhs_ty.is_numeric() => {
                    self.unify_now(&lhs_ty, &rhs_ty, span)?;
                    Ok(lhs_ty)
                }
                (true, true) => {
                    self.unify_now(&lhs_ty, &rhs_ty, span)?;
                    Ok(self.resolve(&lhs_ty))
                }
                _ => Err(TypeError::InvalidOperation {
                    message: format!(
                        "operator `{}` requires numeric operands, found `{lhs_ty}` and `{rhs_ty}`",
                        op.as_symbol()
                    ),
                    span: Some(span),
                }),
            }
        } else if op.is_comparison() {
            let boolean = Type::Primitive(PrimitiveType::Boolean);
            if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
                return Ok(boolean);
            }
            if matches!((&lhs_ty, &rhs_ty), (Type::Primitive(a), Type::Primitive(b)) if a == b) {
                return Ok(boolean);
            }
            if lhs_ty.is_var() || rhs_ty.is_var() {
                self.unify_now(&lhs_ty, &rhs_ty, span)?;
                return Ok(boolean);
            }
            Err(TypeError::InvalidOperation {
                message: format!(
                    "operator `{}` cannot compare `{lhs_ty}` with `{rhs_ty}`",
                    op.as_symbol()
                ),
                span: Some(span),
            })
        } else {
            self.expect_boolean(&lhs_ty, lhs.span)?;
            self.expect_boolean(&rhs_ty, rhs.span)?;
            Ok(Type::Primitive(PrimitiveType::Boolean))
        }
    }

    fn synth_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Result<Type, TypeError> {
        let ty = self.synth(operand)?;
        let ty = self.resolve(&ty);
        match op {
            UnaryOp::Neg => {
                if ty.is_numeric() || ty.is_var() {
                    Ok(ty)
                } else {
                    Err(TypeError::InvalidOperation {
                        message: format!("operator `-` requires a numeric operand, found `{ty}`"),
                        span: Some(span),
                    })
                }
            }
            UnaryOp::Not => {
                self.expect_boolean(&ty, span)?;
                Ok(Type::Primitive(PrimitiveType::Boolean))
            }
        }
    }

    fn expect_boolean(&mut self, ty: &Type, span: Span) -> Result<(), TypeError> {
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        let resolved = self.resolve(ty);
        if resolved == boolean {
            return Ok(());
        }
        if resolved.is_var() {
            return self.unify_now(&boolean, &resolved, span);
        }
        Err(TypeError::InvalidOperation {
            message: format!("expected a Boolean condition, found `{resolved}`"),
            span: Some(span),
        })
    }

    fn synth_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<Type, TypeError> {
        if let ExprKind::Identifier(name) = &callee.kind {
            if self.scopes.lookup(name).is_none() && self.ctx.find_variant(name).is_some() {
                return self.synth_constructor(name, args, span);
            }
        }

        let callee_ty = self.synth(callee)?;
        let callee_ty = self.resolve(&callee_ty);
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(self.synth(arg)?);
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
                for ((param, arg_ty), arg) in params.iter().zip(&arg_types).zip(args) {
                    self.check_fits(param, arg_ty, arg.span)?;
                }
                Ok(self.resolve(&ret))
            }
            ty if ty.is_var() => {
                let ret = self.factory.fresh_var();
                let expected = self.factory.function(arg_types, ret.clone());
                self.unify_now(&expected, &ty, span)?;
                Ok(self.resolve(&ret))
            }
            other => Err(TypeError::InvalidOperation {
                message: format!("cannot call a value of type `{other}`"),
                span: Some(span),
            }),
        }
    }

    fn synth_constructor(
        &mut self,
        name: &str,
        args: &[Expr],
        span: Span,
    ) -> Result<Type, TypeError> {
        let Some((union_name, union_def, variant)) = self.ctx.find_variant(name) else {
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
            let fresh = self.factory.fresh_var();
            mapping.insert(param.clone(), fresh.clone());
            fresh_args.push(fresh);
        }

        for (field, arg) in fields.iter().zip(args) {
            let field_ty = field.substitute_named(&mapping);
            let arg_ty = self.synth(arg)?;
            self.check_fits(&field_ty, &arg_ty, arg.span)?;
        }

        let resolved_args = fresh_args.iter().map(|a| self.resolve(a)).collect();
        Ok(self.factory.union(union_name, resolved_args))
    }

    fn synth_block(
        &mut self,
        statements: &[Statement],
        value: Option<&Expr>,
    ) -> Result<Type, TypeError> {
        for statement in statements {
            match statement {
                Statement::Let {
                    name,
                    mutable,
                    annotation,
                    value,
                    span,
                } => {
                    let declared = annotation
                        .as_ref()
                        .map(|a| resolve_type_expr(a, &self.env, self.factory))
                        .transpose()?;
                    let value_ty = self.synth(value)?;
                    let bound = match declared {
                        Some(declared_ty) => {
                            self.check_fits(&declared_ty, &value_ty, value.span)?;
                            declared_ty
                        }
                        None => self.resolve(&value_ty),
                    };
                    self.scopes.declare_variable(VariableBinding {
                        name: name.clone(),
                        ty: bound,
                        mutable: *mutable,
                        span: Some(*span),
                    })?;
                }

                Statement::Assign { name, value, span } => {
                    let Some(binding) = self.scopes.lookup(name) else {
                        return Err(TypeError::UnresolvedSymbol {
                            name: name.clone(),
                            span: Some(*span),
                        });
                    };
                    if !binding.mutable {
                        return Err(TypeError::InvalidOperation {
                            message: format!("cannot assign to immutable variable `{name}`"),
                            span: Some(*span),
                        });
                    }
                    let target = binding.ty.clone();
                    let value_ty = self.synth(value)?;
                    self.check_fits(&target, &value_ty, value.span)?;
                }

                Statement::Expr(expr) => {
                    self.synth(expr)?;
                }
            }
        }

        match value {
            Some(value) => {
                let ty = self.synth(value)?;
                Ok(self.resolve(&ty))
            }
            None => Ok(Type::UNIT),
        }
    }

    fn synth_lambda(&mut self, params: &[Param], body: &Expr) -> Result<Type, TypeError> {
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = match &param.annotation {
                Some(annotation) => resolve_type_expr(annotation, &self.env, self.factory)?,
                None => self.factory.fresh_var(),
            };
            param_types.push(ty);
        }

        let body_ty = self.with_scope(|w| {
            for (param, ty) in params.iter().zip(&param_types) {
                w.scopes.declare_variable(VariableBinding {
                    name: param.name.clone(),
                    ty: ty.clone(),
                    mutable: false,
                    span: Some(param.span),
                })?;
            }
            w.synth(body)
        })?;

        let param_types = param_types.iter().map(|t| self.resolve(t)).collect();
        let body_ty = self.resolve(&body_ty);
        Ok(self.factory.function(param_types, body_ty))
    }

    fn synth_for(
        &mut self,
        binding: &str,
        iterable: &Expr,
        body: &Expr,
    ) -> Result<Type, TypeError> {
        let iterable_ty = self.synth(iterable)?;
        let iterable_ty = self.resolve(&iterable_ty);
        let elem_ty = match &iterable_ty {
            Type::Generic { name, args } if name == "List" && args.len() == 1 => args[0].clone(),
            ty if ty.is_var() => {
                let elem = self.factory.fresh_var();
                let expected = self.factory.generic("List", vec![elem.clone()]);
                self.unify_now(&expected, &iterable_ty, iterable.span)?;
                elem
            }
            other => {
                return Err(TypeError::InvalidOperation {
                    message: format!("`for` expects a List to iterate, found `{other}`"),
                    span: Some(iterable.span),
                });
            }
        };

        self.with_scope(|w| {
            w.scopes.declare_variable(VariableBinding {
                name: binding.to_owned(),
                ty: w.resolve(&elem_ty),
                mutable: false,
                span: Some(iterable.span),
            })?;
            w.synth(body)
        })?;
        Ok(Type::UNIT)
    }

    fn synth_try(&mut self, inner: &Expr, span: Span) -> Result<Type, TypeError> {
        let Some(context_ty) = self.result_contexts.last().cloned() else {
            return Err(TypeError::InvalidTryExpressionContext { span: Some(span) });
        };
        let Some((_, context_err)) = context_ty.as_result() else {
            return Err(TypeError::InvalidTryExpressionContext { span: Some(span) });
        };
        let context_err = context_err.clone();

        let inner_ty = self.synth(inner)?;
        let inner_ty = self.resolve(&inner_ty);
        if let Some((ok, err)) = inner_ty.as_result() {
            if !err.is_var()
                && !context_err.is_var()
                && !compare::are_compatible(err, &context_err)
            {
                return Err(TypeError::IncompatibleErrorTypes {
                    first: err.clone(),
                    second: context_err,
                    span: Some(span),
                });
            }
            let ok = ok.clone();
            let err = err.clone();
            self.unify_now(&context_err, &err, span)?;
            Ok(self.resolve(&ok))
        } else if inner_ty.is_var() {
            let ok = self.factory.fresh_var();
            let expected = self
                .factory
                .generic("Result", vec![ok.clone(), context_err]);
            self.unify_now(&expected, &inner_ty, inner.span)?;
            Ok(self.resolve(&ok))
        } else {
            Err(TypeError::InvalidTryExpressionTarget {
                found: inner_ty,
                span: Some(span),
            })
        }
    }

    // --- Direct pattern checking ---

    fn synth_match(
        &mut self,
        scrutinee: &Expr,
        cases: &[MatchCase],
        span: Span,
    ) -> Result<Type, TypeError> {
        let scrutinee_ty = self.synth(scrutinee)?;
        let scrutinee_ty = self.resolve(&scrutinee_ty);

        let mut coverage = Coverage::default();
        let mut result_ty: Option<Type> = None;

        for case in cases {
            let outcome = self.match_pattern(&case.pattern, &scrutinee_ty)?;
            pattern::verify_no_duplicate_bindings(&outcome.bindings, case.pattern.span)?;
            coverage.merge(outcome.coverage.clone());

            let body_ty = self.with_scope(|w| {
                for (name, ty) in &outcome.bindings {
                    w.scopes.declare_variable(VariableBinding {
                        name: name.clone(),
                        ty: ty.clone(),
                        mutable: false,
                        span: Some(case.pattern.span),
                    })?;
                }
                w.synth(&case.body)
            })?;

            match &result_ty {
                Some(previous) => self.unify_now(previous, &body_ty, case.span)?,
                None => result_ty = Some(body_ty),
            }
        }

        self.check_exhaustiveness(&scrutinee_ty, &coverage, span)?;

        let result = result_ty.unwrap_or_else(|| self.factory.fresh_var());
        Ok(self.resolve(&result))
    }

    fn check_exhaustiveness(
        &self,
        scrutinee_ty: &Type,
        coverage: &Coverage,
        span: Span,
    ) -> Result<(), TypeError> {
        if coverage.wildcard {
            return Ok(());
        }
        let Some(union) = shared::union_name_of(scrutinee_ty).and_then(|n| self.ctx.union_def(n))
        else {
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

    /// The direct pattern variant: decomposes eagerly, unifying the
    /// target with constructed variant types on the spot.
    fn match_pattern(
        &mut self,
        pattern: &Pattern,
        target: &Type,
    ) -> Result<PatternOutcome, TypeError> {
        match &pattern.kind {
            PatternKind::Wildcard => Ok(PatternOutcome {
                bindings: Vec::new(),
                coverage: Coverage::wildcard(),
            }),

            PatternKind::Identifier(name) => {
                let names_nullary_variant = match shared::union_name_of(target)
                    .and_then(|n| self.ctx.union_def(n))
                {
                    Some(union) => union.variant(name).is_some_and(|v| v.is_nullary()),
                    None => self
                        .ctx
                        .find_variant(name)
                        .is_some_and(|(_, _, v)| v.is_nullary()),
                };
                if names_nullary_variant {
                    return self.match_constructor(name, &[], target, pattern.span);
                }
                Ok(PatternOutcome {
                    bindings: vec![(name.clone(), self.resolve(target))],
                    coverage: Coverage::wildcard(),
                })
            }

            PatternKind::Literal(literal) => {
                let literal_ty = shared::literal_type(self.factory, literal);
                self.unify_now(target, &literal_ty, pattern.span)?;
                Ok(PatternOutcome::default())
            }

            PatternKind::Constructor { name, args } => {
                self.match_constructor(name, args, target, pattern.span)
            }

            PatternKind::Guard { inner, condition } => {
                let outcome = self.match_pattern(inner, target)?;
                self.with_scope(|w| {
                    for (name, ty) in &outcome.bindings {
                        w.scopes.declare_variable(VariableBinding {
                            name: name.clone(),
                            ty: ty.clone(),
                            mutable: false,
                            span: Some(pattern.span),
                        })?;
                    }
                    let cond_ty = w.synth(condition)?;
                    w.expect_boolean(&cond_ty, condition.span)
                })?;
                Ok(outcome)
            }
        }
    }

    fn match_constructor(
        &mut self,
        name: &str,
        args: &[Pattern],
        target: &Type,
        span: Span,
    ) -> Result<PatternOutcome, TypeError> {
        let Some((union_name, union_def, variant)) = self.ctx.find_variant(name) else {
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
            let fresh = self.factory.fresh_var();
            mapping.insert(param.clone(), fresh.clone());
            fresh_args.push(fresh);
        }
        let pattern_ty = self.factory.union(union_name, fresh_args);
        self.unify_now(target, &pattern_ty, span)?;

        let mut outcome = PatternOutcome {
            bindings: Vec::new(),
            coverage: Coverage::of_variant(name),
        };
        for (field, sub_pattern) in fields.iter().zip(args) {
            let field_ty = self.resolve(&field.substitute_named(&mapping));
            let sub = self.match_pattern(sub_pattern, &field_ty)?;
            outcome.bindings.extend(sub.bindings);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::Literal;
    use rill_types::{TypeDef, UnionDef, VariantDef};

    fn expr(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::DUMMY)
    }

    fn int_lit(value: i64) -> Expr {
        expr(ExprKind::Literal(Literal::Int(value)))
    }

    fn option_ctx() -> TypeContext {
        TypeContext::new().with_type(
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
    fn synthesizes_literals() {
        let checker = AlgorithmicChecker::new();
        let typed = checker.check(&int_lit(42), &TypeContext::new()).unwrap();
        assert_eq!(typed.ty, Type::Primitive(PrimitiveType::Int));
    }

    #[test]
    fn widens_arithmetic() {
        let checker = AlgorithmicChecker::new();
        let sum = expr(ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(int_lit(1)),
            rhs: Box::new(expr(ExprKind::Literal(Literal::Float(2.0)))),
        });
        let typed = checker.check(&sum, &TypeContext::new()).unwrap();
        assert_eq!(typed.ty, Type::Primitive(PrimitiveType::Double));
    }

    #[test]
    fn duplicate_let_in_one_scope_is_rejected() {
        let checker = AlgorithmicChecker::new();
        let block = expr(ExprKind::Block {
            statements: vec![
                Statement::Let {
                    name: "x".into(),
                    mutable: false,
                    annotation: None,
                    value: int_lit(1),
                    span: Span::DUMMY,
                },
                Statement::Let {
                    name: "x".into(),
                    mutable: false,
                    annotation: None,
                    value: int_lit(2),
                    span: Span::DUMMY,
                },
            ],
            value: None,
        });
        let err = checker.check(&block, &TypeContext::new()).unwrap_err();
        assert!(matches!(err, TypeError::DuplicateDefinition { .. }));
    }

    #[test]
    fn assignment_to_immutable_is_rejected() {
        let checker = AlgorithmicChecker::new();
        let block = expr(ExprKind::Block {
            statements: vec![
                Statement::Let {
                    name: "x".into(),
                    mutable: false,
                    annotation: None,
                    value: int_lit(1),
                    span: Span::DUMMY,
                },
                Statement::Assign {
                    name: "x".into(),
                    value: int_lit(2),
                    span: Span::DUMMY,
                },
            ],
            value: None,
        });
        let err = checker.check(&block, &TypeContext::new()).unwrap_err();
        assert!(matches!(err, TypeError::InvalidOperation { .. }));
    }

    #[test]
    fn assignment_to_mutable_checks_the_value_type() {
        let checker = AlgorithmicChecker::new();
        let block = expr(ExprKind::Block {
            statements: vec![
                Statement::Let {
                    name: "x".into(),
                    mutable: true,
                    annotation: None,
                    value: int_lit(1),
                    span: Span::DUMMY,
                },
                Statement::Assign {
                    name: "x".into(),
                    value: expr(ExprKind::Literal(Literal::String("no".into()))),
                    span: Span::DUMMY,
                },
            ],
            value: None,
        });
        let err = checker.check(&block, &TypeContext::new()).unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { .. }));
    }

    #[test]
    fn match_over_option_is_checked_for_exhaustiveness() {
        let checker = AlgorithmicChecker::new();
        let ctx = option_ctx().with_variable(
            "opt",
            Type::Union {
                name: "Option".into(),
                args: vec![Type::Primitive(PrimitiveType::Int)],
            },
        );

        let only_some = expr(ExprKind::Match {
            scrutinee: Box::new(expr(ExprKind::Identifier("opt".into()))),
            cases: vec![MatchCase {
                pattern: Pattern::new(
                    PatternKind::Constructor {
                        name: "Some".into(),
                        args: vec![Pattern::new(
                            PatternKind::Identifier("x".into()),
                            Span::DUMMY,
                        )],
                    },
                    Span::DUMMY,
                ),
                body: expr(ExprKind::Identifier("x".into())),
                span: Span::DUMMY,
            }],
        });

        let err = checker.check(&only_some, &ctx).unwrap_err();
        match err {
            TypeError::NonExhaustiveMatch { missing, .. } => {
                assert_eq!(missing, vec!["None".to_owned()]);
            }
            other => panic!("expected NonExhaustiveMatch, got {other:?}"),
        }
    }

    #[test]
    fn checking_mode_accepts_subtypes() {
        let checker = AlgorithmicChecker::new();
        let typed = checker
            .check_with_expected(
                &int_lit(1),
                &Type::Primitive(PrimitiveType::Double),
                &TypeContext::new(),
            )
            .unwrap();
        assert_eq!(typed.ty, Type::Primitive(PrimitiveType::Double));

        let err = checker
            .check_with_expected(
                &int_lit(1),
                &Type::Primitive(PrimitiveType::String),
                &TypeContext::new(),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { .. }));
    }
}

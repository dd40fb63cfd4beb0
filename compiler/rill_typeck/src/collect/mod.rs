//! The bidirectional constraint collector.
//!
//! Walks expressions in synthesis mode (`synthesize`) or checking mode
//! (`check_expected`), emitting equality, subtype, and instance
//! constraints for the solver. Errors inside statements and tuple
//! elements accumulate so a compilation unit can report more than one;
//! everything else is fatal for the enclosing expression.

mod calls;
mod control_flow;
mod operators;

use rill_ir::{Expr, ExprKind, Literal, Span};
use rill_types::{
    Constraint, ConstraintSet, InferenceEnv, Type, TypeError, TypeFactory, TypeScheme,
};

use crate::shared;

/// Red zone / new stack size for the recursion guard; deep expression
/// trees otherwise overflow the stack before they exhaust any limit.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Collects constraints from an expression tree.
pub struct ConstraintCollector<'f> {
    factory: &'f TypeFactory,
    constraints: ConstraintSet,
    errors: Vec<TypeError>,
    /// Expected `Result` types of the enclosing checking contexts, for
    /// `try` expressions.
    result_contexts: Vec<Type>,
}

impl<'f> ConstraintCollector<'f> {
    pub fn new(factory: &'f TypeFactory) -> Self {
        ConstraintCollector {
            factory,
            constraints: ConstraintSet::new(),
            errors: Vec::new(),
            result_contexts: Vec::new(),
        }
    }

    pub fn factory(&self) -> &TypeFactory {
        self.factory
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn take_constraints(&mut self) -> ConstraintSet {
        std::mem::take(&mut self.constraints)
    }

    /// Errors accumulated at statement boundaries.
    pub fn take_errors(&mut self) -> Vec<TypeError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Make `try` legal while collecting under a `Result` context.
    pub fn push_result_context(&mut self, result_ty: Type) {
        self.result_contexts.push(result_ty);
    }

    pub fn pop_result_context(&mut self) {
        self.result_contexts.pop();
    }

    pub(crate) fn emit_equality(&mut self, expected: Type, actual: Type, span: Option<Span>) {
        self.constraints
            .push(Constraint::equality(expected, actual, span));
    }

    pub(crate) fn emit_subtype(&mut self, sub: Type, sup: Type, span: Option<Span>) {
        self.constraints.push(Constraint::subtype(sub, sup, span));
    }

    pub(crate) fn record_error(&mut self, error: TypeError) {
        self.errors.push(error);
    }

    pub(crate) fn literal_type(&self, literal: &Literal) -> Type {
        shared::literal_type(self.factory, literal)
    }

    /// Synthesize the type of an expression bottom-up.
    pub fn synthesize(&mut self, expr: &Expr, env: &InferenceEnv) -> Result<Type, TypeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.synth_inner(expr, env))
    }

    fn synth_inner(&mut self, expr: &Expr, env: &InferenceEnv) -> Result<Type, TypeError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(self.literal_type(literal)),
            ExprKind::Tuple(elems) => self.collect_tuple(elems, env),
            ExprKind::List(elems) => self.collect_list(elems, env),
            ExprKind::Identifier(name) => self.collect_identifier(name, env, expr.span),
            ExprKind::Binary { op, lhs, rhs } => {
                self.collect_binary(*op, lhs, rhs, env, expr.span)
            }
            ExprKind::Unary { op, operand } => self.collect_unary(*op, operand, env, expr.span),
            ExprKind::Call { callee, args } => self.collect_call(callee, args, env, expr.span),
            ExprKind::Constructor { name, args } => {
                self.collect_constructor(name, args, env, expr.span)
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.collect_if(condition, then_branch, else_branch.as_deref(), env, expr.span),
            ExprKind::While { condition, body } => self.collect_while(condition, body, env),
            ExprKind::Match { scrutinee, cases } => {
                self.collect_match(scrutinee, cases, None, env, expr.span)
            }
            ExprKind::Block { statements, value } => {
                self.collect_block(statements, value.as_deref(), env)
            }
            ExprKind::Lambda { params, body } => self.collect_lambda(params, body, None, env),
            ExprKind::For {
                binding,
                iterable,
                body,
            } => self.collect_for(binding, iterable, body, env),
            ExprKind::Try(inner) => self.collect_try(inner, env, expr.span),
        }
    }

    /// Check an expression against an expected type.
    ///
    /// Checking mode drives element types into empty lists, parameter
    /// types into lambdas, and the result type into matches; everything
    /// else synthesizes and constrains.
    pub fn check_expected(
        &mut self,
        expr: &Expr,
        expected: &Type,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        match &expr.kind {
            ExprKind::List(elems) if elems.is_empty() => {
                if is_list_of_one(expected) {
                    return Ok(expected.clone());
                }
                self.check_by_synthesis(expr, expected, env)
            }
            ExprKind::Lambda { params, body } => {
                if let Type::Function {
                    params: expected_params,
                    ret,
                } = expected
                {
                    if expected_params.len() == params.len() {
                        return self.collect_lambda(
                            params,
                            body,
                            Some((expected_params, ret.as_ref())),
                            env,
                        );
                    }
                }
                self.check_by_synthesis(expr, expected, env)
            }
            ExprKind::Match { scrutinee, cases } => {
                self.collect_match(scrutinee, cases, Some(expected), env, expr.span)
            }
            _ => self.check_by_synthesis(expr, expected, env),
        }
    }

    fn check_by_synthesis(
        &mut self,
        expr: &Expr,
        expected: &Type,
        env: &InferenceEnv,
    ) -> Result<Type, TypeError> {
        let ty = self.synthesize(expr, env)?;
        // Two concrete numerics compare by widening; everything else must
        // unify with the expectation.
        if ty.is_numeric() && expected.is_numeric() {
            self.emit_subtype(ty.clone(), expected.clone(), Some(expr.span));
        } else {
            self.emit_equality(expected.clone(), ty.clone(), Some(expr.span));
        }
        Ok(ty)
    }

    /// Check a guard or condition expression against `Boolean`.
    pub(crate) fn check_boolean_condition(
        &mut self,
        condition: &Expr,
        env: &InferenceEnv,
    ) -> Result<(), TypeError> {
        let ty = self.synthesize(condition, env)?;
        self.emit_equality(
            Type::Primitive(rill_types::PrimitiveType::Boolean),
            ty,
            Some(condition.span),
        );
        Ok(())
    }

    // --- Leaf collection ---

    /// Tuple elements accumulate their errors so every bad element is
    /// reported, with fresh variables standing in.
    fn collect_tuple(&mut self, elems: &[Expr], env: &InferenceEnv) -> Result<Type, TypeError> {
        let mut types = Vec::with_capacity(elems.len());
        for elem in elems {
            match self.synthesize(elem, env) {
                Ok(ty) => types.push(ty),
                Err(err) => {
                    self.record_error(err);
                    types.push(self.factory.fresh_var());
                }
            }
        }
        Ok(self.factory.tuple(types))
    }

    /// A non-empty list takes its first element's type; an empty list in
    /// synthesis mode defaults to `List<Unit>`.
    fn collect_list(&mut self, elems: &[Expr], env: &InferenceEnv) -> Result<Type, TypeError> {
        let Some((first, rest)) = elems.split_first() else {
            return Ok(self.factory.generic("List", vec![Type::UNIT]));
        };
        let elem_ty = self.synthesize(first, env)?;
        for elem in rest {
            let ty = self.synthesize(elem, env)?;
            self.emit_equality(elem_ty.clone(), ty, Some(elem.span));
        }
        Ok(self.factory.generic("List", vec![elem_ty]))
    }

    fn collect_identifier(
        &mut self,
        name: &str,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        if let Some(scheme) = env.lookup_variable(name) {
            if scheme.is_mono() {
                return Ok(scheme.ty.clone());
            }
            // A polymorphic binding becomes a fresh use-site variable tied
            // to the scheme; solving instantiates it.
            let scheme: TypeScheme = scheme.clone();
            let use_site = self.factory.fresh_type_var();
            self.constraints
                .push(Constraint::instance(use_site, scheme, Some(span)));
            return Ok(Type::Var(use_site));
        }

        if env
            .find_variant(name)
            .is_some_and(|(_, _, variant)| variant.is_nullary())
        {
            return self.collect_constructor(name, &[], env, span);
        }

        if let Some(sig) = env.lookup_function(name) {
            let sig = sig.clone();
            return Ok(shared::instantiate_signature(self.factory, &sig));
        }

        Err(TypeError::UnresolvedSymbol {
            name: name.to_owned(),
            span: Some(span),
        })
    }
}

fn is_list_of_one(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Generic { name, args } | Type::Union { name, args }
            if name == "List" && args.len() == 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_ir::Literal;
    use rill_types::{PrimitiveType, TypeVar, Unifier};

    fn expr(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::DUMMY)
    }

    fn int_lit(value: i64) -> Expr {
        expr(ExprKind::Literal(Literal::Int(value)))
    }

    fn solve_with(factory: &TypeFactory, collector: &mut ConstraintCollector<'_>, ty: &Type) -> Type {
        let constraints = collector.take_constraints();
        let unifier = Unifier::new(factory);
        let subst = unifier.solve(&constraints).unwrap();
        subst.apply(ty)
    }

    #[test]
    fn polymorphic_binding_instantiates_per_use() {
        let factory = TypeFactory::new();
        let mut collector = ConstraintCollector::new(&factory);

        // id : forall a. (a) -> a
        let a = factory.fresh_type_var();
        let scheme = TypeScheme::poly(
            vec![a],
            factory.function(vec![Type::Var(a)], Type::Var(a)),
        );
        let env = InferenceEnv::new().with_variable_scheme("id", scheme);

        // id(1) and id("s") in one tuple must not interfere.
        let tuple = expr(ExprKind::Tuple(vec![
            expr(ExprKind::Call {
                callee: Box::new(expr(ExprKind::Identifier("id".into()))),
                args: vec![int_lit(1)],
            }),
            expr(ExprKind::Call {
                callee: Box::new(expr(ExprKind::Identifier("id".into()))),
                args: vec![expr(ExprKind::Literal(Literal::String("s".into())))],
            }),
        ]));

        let ty = collector.synthesize(&tuple, &env).unwrap();
        assert!(!collector.has_errors());
        let solved = solve_with(&factory, &mut collector, &ty);
        assert_eq!(solved.to_string(), "(Int, String)");
    }

    #[test]
    fn instance_constraints_are_emitted_for_schemes() {
        let factory = TypeFactory::new();
        let mut collector = ConstraintCollector::new(&factory);

        let a = factory.fresh_type_var();
        let scheme = TypeScheme::poly(vec![a], Type::Var(a));
        let env = InferenceEnv::new().with_variable_scheme("poly", scheme);

        let ty = collector
            .synthesize(&expr(ExprKind::Identifier("poly".into())), &env)
            .unwrap();
        assert!(matches!(ty, Type::Var(TypeVar(_))));
        assert!(collector
            .constraints()
            .iter()
            .any(|c| matches!(c, Constraint::Instance { .. })));
    }

    #[test]
    fn incompatible_try_error_types_are_reported() {
        let factory = TypeFactory::new();
        let mut collector = ConstraintCollector::new(&factory);
        collector.push_result_context(factory.generic(
            "Result",
            vec![
                Type::Primitive(PrimitiveType::Int),
                Type::Named("IoError".into()),
            ],
        ));

        let env = InferenceEnv::new().with_variable(
            "r",
            factory.generic(
                "Result",
                vec![
                    Type::Primitive(PrimitiveType::Int),
                    Type::Named("ParseException".into()),
                ],
            ),
        );
        let try_expr = expr(ExprKind::Try(Box::new(expr(ExprKind::Identifier(
            "r".into(),
        )))));

        let err = collector.synthesize(&try_expr, &env).unwrap_err();
        assert!(matches!(err, TypeError::IncompatibleErrorTypes { .. }));
    }
}

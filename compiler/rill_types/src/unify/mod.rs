//! Robinson unification and constraint solving.
//!
//! `unify` finds the most general substitution making two terms
//! structurally equal, with an occurs-check preventing infinite types.
//! `solve` folds a constraint set in emission order, threading a running
//! substitution; the result is a deterministic function of that order.

mod error;

pub use error::UnifyError;

use crate::constraint::{Constraint, ConstraintSet};
use crate::factory::TypeFactory;
use crate::subst::Substitution;
use crate::term::{is_type_var_name, PrimitiveType, Type, TypeVar};

/// The unification engine.
///
/// Borrows the factory so instance constraints can mint fresh variables
/// during solving. All operations are pure apart from the variable
/// counter.
pub struct Unifier<'f> {
    factory: &'f TypeFactory,
}

impl<'f> Unifier<'f> {
    pub fn new(factory: &'f TypeFactory) -> Self {
        Unifier { factory }
    }

    /// Unify two terms, returning the most general unifier.
    pub fn unify(&self, a: &Type, b: &Type) -> Result<Substitution, UnifyError> {
        // Structurally equal terms need no substitution.
        if a == b {
            return Ok(Substitution::empty());
        }

        match (a, b) {
            // --- Inference Variables ---
            (Type::Var(v), other) | (other, Type::Var(v)) => self.bind_var(*v, other),

            // --- Legacy Name-Convention Variables ---
            // Declared type parameters (`T`, `E`, `T1`) that leak into the
            // unifier match anything; they carry no binding because the
            // propagating representation is `Var`.
            (Type::Named(name), other) | (other, Type::Named(name))
                if is_type_var_name(name) =>
            {
                if contains_named(other, name) {
                    return Err(UnifyError::TypeMismatch {
                        expected: a.clone(),
                        found: b.clone(),
                        span: None,
                    });
                }
                Ok(Substitution::empty())
            }

            // --- Nominal Applications ---
            // Generic and Union references with the same name and arity
            // are compatible for conversion, so the four pairings share
            // one componentwise case.
            (
                Type::Generic { name: n1, args: a1 } | Type::Union { name: n1, args: a1 },
                Type::Generic { name: n2, args: a2 } | Type::Union { name: n2, args: a2 },
            ) => {
                if n1 != n2 {
                    return Err(self.mismatch(a, b));
                }
                if a1.len() != a2.len() {
                    return Err(UnifyError::ArityMismatch {
                        expected: a1.len(),
                        found: a2.len(),
                        span: None,
                    });
                }
                self.unify_pairwise(a1, a2)
            }

            // --- Tuples ---
            (Type::Tuple(e1), Type::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    return Err(UnifyError::ArityMismatch {
                        expected: e1.len(),
                        found: e2.len(),
                        span: None,
                    });
                }
                self.unify_pairwise(e1, e2)
            }

            // --- Functions ---
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
                if p1.len() != p2.len() {
                    return Err(UnifyError::ArityMismatch {
                        expected: p1.len(),
                        found: p2.len(),
                        span: None,
                    });
                }
                let subst = self.unify_pairwise(p1, p2)?;
                let ret = self.unify(&subst.apply(r1), &subst.apply(r2))?;
                Ok(ret.compose(&subst))
            }

            // --- Nullable ---
            (Type::Nullable(b1), Type::Nullable(b2)) => self.unify(b1, b2),

            // --- Mismatch ---
            // Primitives with equal names were caught by the fast path.
            _ => Err(self.mismatch(a, b)),
        }
    }

    /// Solve a constraint set, composing substitutions left to right.
    pub fn solve(&self, constraints: &ConstraintSet) -> Result<Substitution, UnifyError> {
        let mut subst = Substitution::empty();

        for constraint in constraints {
            tracing::trace!(?constraint, "solving");
            match constraint {
                Constraint::Equality { left, right, span } => {
                    let step = self
                        .unify(&subst.apply(left), &subst.apply(right))
                        .map_err(|e| e.with_span(*span))?;
                    subst = step.compose(&subst);
                }
                Constraint::Subtype { sub, sup, span } => {
                    let step =
                        self.solve_subtype(&subst.apply(sub), &subst.apply(sup), *span)?;
                    subst = step.compose(&subst);
                }
                Constraint::Instance { var, scheme, span } => {
                    // Quantified variables must still be abstract here;
                    // a binding means generalization captured a variable
                    // it did not own.
                    if let Some(bound) = scheme.vars.iter().find(|v| subst.get(**v).is_some()) {
                        return Err(UnifyError::ConstraintSolvingFailed {
                            detail: format!(
                                "quantified variable {bound} of an instance constraint is already bound"
                            ),
                            span: *span,
                        });
                    }
                    let instance = self.factory.instantiate(scheme);
                    let step = self
                        .unify(&subst.apply(&Type::Var(*var)), &instance)
                        .map_err(|e| e.with_span(*span))?;
                    subst = step.compose(&subst);
                }
            }
        }

        tracing::debug!(
            constraints = constraints.len(),
            bindings = subst.len(),
            "constraint set solved"
        );
        Ok(subst)
    }

    /// Bind a variable to a term, after the occurs-check.
    fn bind_var(&self, var: TypeVar, ty: &Type) -> Result<Substitution, UnifyError> {
        if ty.contains_var(var) {
            return Err(UnifyError::InfiniteType {
                var,
                ty: ty.clone(),
                span: None,
            });
        }
        Ok(Substitution::singleton(var, ty.clone()))
    }

    /// Unify two sequences componentwise, composing left to right.
    fn unify_pairwise(&self, xs: &[Type], ys: &[Type]) -> Result<Substitution, UnifyError> {
        let mut subst = Substitution::empty();
        for (x, y) in xs.iter().zip(ys) {
            let step = self.unify(&subst.apply(x), &subst.apply(y))?;
            subst = step.compose(&subst);
        }
        Ok(subst)
    }

    /// The minimal subtype rules used during solving.
    fn solve_subtype(
        &self,
        sub: &Type,
        sup: &Type,
        span: Option<rill_ir::Span>,
    ) -> Result<Substitution, UnifyError> {
        // Reflexive.
        if sub == sup {
            return Ok(Substitution::empty());
        }

        // Numeric widening needs no substitution.
        if let (Type::Primitive(a), Type::Primitive(b)) = (sub, sup) {
            if let (Some(ra), Some(rb)) = (a.numeric_rank(), b.numeric_rank()) {
                if ra <= rb {
                    return Ok(Substitution::empty());
                }
            }
        }

        // An unknown subtype takes the supertype.
        if let Type::Var(v) = sub {
            return self.bind_var(*v, sup).map_err(|e| e.with_span(span));
        }

        // An unknown supertype over an Int widens to Double, so later
        // numeric operands of any width still fit; otherwise it takes
        // the subtype.
        if let Type::Var(v) = sup {
            let bound = if *sub == Type::Primitive(PrimitiveType::Int) {
                Type::Primitive(PrimitiveType::Double)
            } else {
                sub.clone()
            };
            return self.bind_var(*v, &bound).map_err(|e| e.with_span(span));
        }

        Err(UnifyError::TypeMismatch {
            expected: sup.clone(),
            found: sub.clone(),
            span,
        })
    }

    fn mismatch(&self, a: &Type, b: &Type) -> UnifyError {
        UnifyError::TypeMismatch {
            expected: a.clone(),
            found: b.clone(),
            span: None,
        }
    }
}

/// Check whether a term contains a `Named` reference with this name.
fn contains_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Primitive(_) | Type::Var(_) => false,
        Type::Named(n) => n == name,
        Type::Generic { args, .. } | Type::Union { args, .. } => {
            args.iter().any(|a| contains_named(a, name))
        }
        Type::Tuple(elems) => elems.iter().any(|e| contains_named(e, name)),
        Type::Function { params, ret } => {
            params.iter().any(|p| contains_named(p, name)) || contains_named(ret, name)
        }
        Type::Nullable(base) => contains_named(base, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TypeScheme;
    use pretty_assertions::assert_eq;

    fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    fn double() -> Type {
        Type::Primitive(PrimitiveType::Double)
    }

    fn string() -> Type {
        Type::Primitive(PrimitiveType::String)
    }

    #[test]
    fn identical_terms_unify_empty() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        assert!(unifier.unify(&int(), &int()).unwrap().is_empty());

        let list = factory.generic("List", vec![int()]);
        assert!(unifier.unify(&list, &list).unwrap().is_empty());
    }

    #[test]
    fn different_primitives_mismatch() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let err = unifier.unify(&int(), &string()).unwrap_err();
        assert!(matches!(err, UnifyError::TypeMismatch { .. }));
    }

    #[test]
    fn variable_binds_to_concrete_type() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let subst = unifier.unify(&Type::Var(v), &int()).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
    }

    #[test]
    fn unifier_result_equates_both_sides() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();
        let w = factory.fresh_type_var();

        let a = factory.function(vec![Type::Var(v)], int());
        let b = factory.function(vec![string()], Type::Var(w));

        let subst = unifier.unify(&a, &b).unwrap();
        assert_eq!(subst.apply(&a), subst.apply(&b));
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let recursive = factory.function(vec![Type::Var(v)], int());
        let err = unifier.unify(&Type::Var(v), &recursive).unwrap_err();
        assert!(matches!(err, UnifyError::InfiniteType { .. }));
    }

    #[test]
    fn generics_unify_componentwise() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let a = factory.generic("Map", vec![string(), Type::Var(v)]);
        let b = factory.generic("Map", vec![string(), int()]);
        let subst = unifier.unify(&a, &b).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
    }

    #[test]
    fn generic_and_union_with_same_name_unify() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let annotation = factory.generic("Option", vec![int()]);
        let constructed = factory.union("Option", vec![Type::Var(v)]);
        let subst = unifier.unify(&annotation, &constructed).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
    }

    #[test]
    fn generic_arity_mismatch() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        let a = factory.generic("Pair", vec![int(), int()]);
        let b = factory.generic("Pair", vec![int()]);
        assert!(matches!(
            unifier.unify(&a, &b),
            Err(UnifyError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn tuples_unify_by_element() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let a = factory.tuple(vec![Type::Var(v), string()]);
        let b = factory.tuple(vec![int(), string()]);
        let subst = unifier.unify(&a, &b).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
    }

    #[test]
    fn function_params_then_return() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();
        let w = factory.fresh_type_var();

        let a = factory.function(vec![Type::Var(v)], Type::Var(w));
        let b = factory.function(vec![int()], string());
        let subst = unifier.unify(&a, &b).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
        assert_eq!(subst.apply(&Type::Var(w)), string());
    }

    #[test]
    fn shared_variable_across_params_propagates() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        // (v, v) against (Int, String) must fail: v cannot be both.
        let a = factory.tuple(vec![Type::Var(v), Type::Var(v)]);
        let b = factory.tuple(vec![int(), string()]);
        assert!(unifier.unify(&a, &b).is_err());
    }

    #[test]
    fn nullable_unifies_by_base() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let a = factory.nullable(Type::Var(v));
        let b = factory.nullable(int());
        let subst = unifier.unify(&a, &b).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());

        assert!(unifier.unify(&factory.nullable(int()), &int()).is_err());
    }

    #[test]
    fn named_type_parameter_matches_permissively() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        assert!(unifier.unify(&factory.named("T"), &int()).is_ok());
        assert!(unifier.unify(&int(), &factory.named("T0")).is_ok());
        // Ordinary nominals still mismatch.
        assert!(unifier
            .unify(&factory.named("Foo"), &factory.named("Bar"))
            .is_err());
    }

    // ========================================
    // Solving
    // ========================================

    #[test]
    fn solve_threads_the_substitution() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();
        let w = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::equality(Type::Var(v), Type::Var(w), None));
        constraints.push(Constraint::equality(Type::Var(w), int(), None));

        let subst = unifier.solve(&constraints).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), int());
        assert_eq!(subst.apply(&Type::Var(w)), int());
    }

    #[test]
    fn solve_reports_the_first_failure() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::equality(Type::Var(v), int(), None));
        constraints.push(Constraint::equality(Type::Var(v), string(), None));

        let err = unifier.solve(&constraints).unwrap_err();
        assert!(matches!(err, UnifyError::TypeMismatch { .. }));
    }

    #[test]
    fn subtype_widening_is_accepted() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::subtype(int(), double(), None));
        constraints.push(Constraint::subtype(
            Type::Primitive(PrimitiveType::Long),
            Type::Primitive(PrimitiveType::Float),
            None,
        ));

        let subst = unifier.solve(&constraints).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn subtype_narrowing_is_rejected() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::subtype(double(), int(), None));
        assert!(unifier.solve(&constraints).is_err());
    }

    #[test]
    fn subtype_variable_on_the_sub_side_takes_the_supertype() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::subtype(Type::Var(v), string(), None));

        let subst = unifier.solve(&constraints).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), string());
    }

    #[test]
    fn subtype_variable_supertype_widens_int_to_double() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::subtype(int(), Type::Var(v), None));

        let subst = unifier.solve(&constraints).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), double());
    }

    #[test]
    fn subtype_variable_supertype_takes_other_subtypes() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        let v = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::subtype(string(), Type::Var(v), None));

        let subst = unifier.solve(&constraints).unwrap();
        assert_eq!(subst.apply(&Type::Var(v)), string());
    }

    #[test]
    fn instance_constraint_instantiates_the_scheme() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        // id : forall a. (a) -> a
        let a = factory.fresh_type_var();
        let scheme = TypeScheme::poly(
            vec![a],
            factory.function(vec![Type::Var(a)], Type::Var(a)),
        );

        let use_site = factory.fresh_type_var();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::instance(use_site, scheme, None));
        // The use site is applied to Int.
        constraints.push(Constraint::equality(
            Type::Var(use_site),
            factory.function(vec![int()], int()),
            None,
        ));

        let subst = unifier.solve(&constraints).unwrap();
        assert_eq!(
            subst.apply(&Type::Var(use_site)),
            factory.function(vec![int()], int())
        );
    }

    #[test]
    fn instance_constraint_keeps_uses_independent() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        let a = factory.fresh_type_var();
        let scheme = TypeScheme::poly(
            vec![a],
            factory.function(vec![Type::Var(a)], Type::Var(a)),
        );

        let use_int = factory.fresh_type_var();
        let use_str = factory.fresh_type_var();
        let mut constraints = ConstraintSet::new();
        constraints.push(Constraint::instance(use_int, scheme.clone(), None));
        constraints.push(Constraint::instance(use_str, scheme, None));
        constraints.push(Constraint::equality(
            Type::Var(use_int),
            factory.function(vec![int()], int()),
            None,
        ));
        constraints.push(Constraint::equality(
            Type::Var(use_str),
            factory.function(vec![string()], string()),
            None,
        ));

        assert!(unifier.solve(&constraints).is_ok());
    }

    #[test]
    fn instance_with_bound_quantified_var_is_inconsistent() {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);

        let a = factory.fresh_type_var();
        let scheme = TypeScheme::poly(vec![a], Type::Var(a));
        let use_site = factory.fresh_type_var();

        let mut constraints = ConstraintSet::new();
        // Bind the quantified variable before the instance constraint.
        constraints.push(Constraint::equality(Type::Var(a), int(), None));
        constraints.push(Constraint::instance(use_site, scheme, None));

        let err = unifier.solve(&constraints).unwrap_err();
        assert!(matches!(err, UnifyError::ConstraintSolvingFailed { .. }));
    }
}

//! Property tests for the algebraic laws of the type system.

use proptest::prelude::*;

use rill_types::{
    compare::structural_equals, InferenceEnv, PrimitiveType, Substitution, Type, TypeFactory,
    TypeVar, Unifier,
};

/// Random type terms. `with_vars` controls whether inference variables
/// may appear; substitution laws need var-free right-hand sides so the
/// domain stays acyclic.
fn arb_type(with_vars: bool) -> impl Strategy<Value = Type> {
    let primitive = prop::sample::select(PrimitiveType::ALL.to_vec()).prop_map(Type::Primitive);
    let named = prop::sample::select(vec!["Shape", "Color", "Request"])
        .prop_map(|n| Type::Named(n.to_owned()));

    let leaf = if with_vars {
        prop_oneof![
            3 => primitive,
            1 => named,
            2 => (0u32..6).prop_map(|i| Type::Var(TypeVar(i))),
        ]
        .boxed()
    } else {
        prop_oneof![3 => primitive, 1 => named].boxed()
    };

    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(|args| Type::Generic {
                name: "Box".to_owned(),
                args,
            }),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Type::Tuple),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone()).prop_map(
                |(params, ret)| Type::Function {
                    params,
                    ret: Box::new(ret),
                }
            ),
            inner.clone().prop_map(|t| match t {
                nullable @ Type::Nullable(_) => nullable,
                other => Type::Nullable(Box::new(other)),
            }),
        ]
    })
}

/// Substitutions with var-free ranges (trivially acyclic).
fn arb_subst() -> impl Strategy<Value = Substitution> {
    prop::collection::vec(((0u32..6).prop_map(TypeVar), arb_type(false)), 0..4).prop_map(
        |bindings| {
            let mut s = Substitution::empty();
            for (v, t) in bindings {
                s.bind(v, t);
            }
            s
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 65536, ..ProptestConfig::default() })]

    /// structuralEquals is reflexive and symmetric.
    #[test]
    fn structural_equality_is_reflexive_and_symmetric(
        a in arb_type(true),
        b in arb_type(true),
    ) {
        prop_assert!(structural_equals(&a, &a));
        prop_assert_eq!(structural_equals(&a, &b), structural_equals(&b, &a));
    }

    /// apply(empty, t) = t.
    #[test]
    fn empty_substitution_is_identity(t in arb_type(true)) {
        prop_assert_eq!(Substitution::empty().apply(&t), t);
    }

    /// apply(compose(a, b), t) = apply(a, apply(b, t)).
    #[test]
    fn compose_law(a in arb_subst(), b in arb_subst(), t in arb_type(true)) {
        let composed = a.compose(&b);
        prop_assert_eq!(composed.apply(&t), a.apply(&b.apply(&t)));
    }

    /// A successful unification equates both sides.
    #[test]
    fn unifier_equates_both_sides(a in arb_type(true), b in arb_type(true)) {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        if let Ok(subst) = unifier.unify(&a, &b) {
            prop_assert_eq!(subst.apply(&a), subst.apply(&b));
        }
    }

    /// Unification is symmetric in success, and the substitutions agree
    /// on both inputs.
    #[test]
    fn unification_success_is_symmetric(a in arb_type(true), b in arb_type(true)) {
        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        prop_assert_eq!(
            unifier.unify(&a, &b).is_ok(),
            unifier.unify(&b, &a).is_ok()
        );
    }

    /// Binding a variable to a compound term containing it is rejected.
    #[test]
    fn occurs_check_rejects_self_reference(t in arb_type(true)) {
        let var = TypeVar(0);
        prop_assume!(t.contains_var(var) && t != Type::Var(var));

        let factory = TypeFactory::new();
        let unifier = Unifier::new(&factory);
        prop_assert!(unifier.unify(&Type::Var(var), &t).is_err());
    }

    /// Generalization never quantifies a variable free in the environment.
    #[test]
    fn generalization_is_disjoint_from_env(
        env_vars in prop::collection::hash_set(0u32..6, 0..4),
        ty in arb_type(true),
    ) {
        let mut env = InferenceEnv::new();
        for (i, v) in env_vars.iter().enumerate() {
            env = env.with_variable(format!("v{i}"), Type::Var(TypeVar(*v)));
        }

        let candidates = ty.free_vars();
        let scheme = env.generalize(&ty, &candidates);
        let free_in_env = env.free_type_vars();
        prop_assert!(scheme.vars.iter().all(|v| !free_in_env.contains(v)));
    }
}

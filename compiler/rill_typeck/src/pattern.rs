//! Pattern decomposition for match checking.
//!
//! The constraint-emitting variant lives here and feeds the collector;
//! the algorithmic checker runs a direct variant over the same
//! [`PatternOutcome`]/[`Coverage`] shapes, so exhaustiveness is computed
//! in exactly one place.

use rill_ir::{Pattern, PatternKind, Span};
use rill_types::{InferenceEnv, Type, TypeError, UnionDef};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::collect::ConstraintCollector;
use crate::shared::union_name_of;

/// Which shapes of the scrutinee a pattern covers.
#[derive(Clone, Debug, Default)]
pub struct Coverage {
    /// A wildcard or plain binding covers everything.
    pub wildcard: bool,
    /// Constructor names covered.
    pub variants: FxHashSet<String>,
}

impl Coverage {
    pub fn wildcard() -> Self {
        Coverage {
            wildcard: true,
            variants: FxHashSet::default(),
        }
    }

    pub fn of_variant(name: impl Into<String>) -> Self {
        let mut variants = FxHashSet::default();
        variants.insert(name.into());
        Coverage {
            wildcard: false,
            variants,
        }
    }

    pub fn merge(&mut self, other: Coverage) {
        self.wildcard |= other.wildcard;
        self.variants.extend(other.variants);
    }
}

/// Bindings and coverage produced by checking one pattern.
#[derive(Clone, Debug, Default)]
pub struct PatternOutcome {
    /// Bound names with their types, in binding order.
    pub bindings: Vec<(String, Type)>,
    pub coverage: Coverage,
}

/// Check a pattern against a target type, emitting constraints into the
/// collector. Duplicate bindings within the pattern are rejected.
pub(crate) fn check_pattern(
    collector: &mut ConstraintCollector<'_>,
    pattern: &Pattern,
    target: &Type,
    env: &InferenceEnv,
) -> Result<PatternOutcome, TypeError> {
    let outcome = check_pattern_inner(collector, pattern, target, env)?;
    verify_no_duplicate_bindings(&outcome.bindings, pattern.span)?;
    Ok(outcome)
}

fn check_pattern_inner(
    collector: &mut ConstraintCollector<'_>,
    pattern: &Pattern,
    target: &Type,
    env: &InferenceEnv,
) -> Result<PatternOutcome, TypeError> {
    match &pattern.kind {
        PatternKind::Wildcard => Ok(PatternOutcome {
            bindings: Vec::new(),
            coverage: Coverage::wildcard(),
        }),

        PatternKind::Identifier(name) => {
            // An identifier naming a nullary variant of the scrutinee's
            // union matches that variant; anything else binds the whole
            // scrutinee.
            if identifies_nullary_variant(name, target, env) {
                return check_constructor(collector, name, &[], target, env, pattern.span);
            }
            Ok(PatternOutcome {
                bindings: vec![(name.clone(), target.clone())],
                coverage: Coverage::wildcard(),
            })
        }

        PatternKind::Literal(literal) => {
            let literal_ty = collector.literal_type(literal);
            collector.emit_equality(target.clone(), literal_ty, Some(pattern.span));
            Ok(PatternOutcome::default())
        }

        PatternKind::Constructor { name, args } => {
            check_constructor(collector, name, args, target, env, pattern.span)
        }

        PatternKind::Guard { inner, condition } => {
            let outcome = check_pattern_inner(collector, inner, target, env)?;
            let guard_env = env.enter_scope_with(outcome.bindings.iter().cloned());
            collector.check_boolean_condition(condition, &guard_env)?;
            Ok(outcome)
        }
    }
}

fn check_constructor(
    collector: &mut ConstraintCollector<'_>,
    name: &str,
    args: &[Pattern],
    target: &Type,
    env: &InferenceEnv,
    span: Span,
) -> Result<PatternOutcome, TypeError> {
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

    // Fresh type arguments for the union; solving links them to the
    // scrutinee's actual arguments through the equality below.
    let mut fresh_args = Vec::with_capacity(type_params.len());
    for _ in &type_params {
        fresh_args.push(collector.factory().fresh_var());
    }
    let pattern_ty = collector
        .factory()
        .union(union_name.clone(), fresh_args.clone());
    collector.emit_equality(target.clone(), pattern_ty, Some(span));

    // Field types substitute the scrutinee's actual type arguments when
    // the target is already a resolved reference to this union, so
    // bindings come out concrete; otherwise the fresh arguments stand in.
    let target_args = match target {
        Type::Union { name, args } | Type::Generic { name, args }
            if *name == union_name && args.len() == type_params.len() =>
        {
            args.clone()
        }
        _ => fresh_args,
    };
    let mapping: FxHashMap<String, Type> = type_params
        .iter()
        .cloned()
        .zip(target_args)
        .collect();

    let mut outcome = PatternOutcome {
        bindings: Vec::new(),
        coverage: Coverage::of_variant(name),
    };
    for (field, sub_pattern) in fields.iter().zip(args) {
        let field_ty = field.substitute_named(&mapping);
        let sub = check_pattern_inner(collector, sub_pattern, &field_ty, env)?;
        outcome.bindings.extend(sub.bindings);
        // Sub-pattern coverage concerns the field, not the scrutinee.
    }
    Ok(outcome)
}

/// Does this identifier name a nullary variant of the target's union?
fn identifies_nullary_variant(name: &str, target: &Type, env: &InferenceEnv) -> bool {
    let target_union = union_name_of(target).and_then(|n| env.lookup_union(n));
    match target_union {
        Some(union) => union.variant(name).is_some_and(|v| v.is_nullary()),
        // With an unresolved scrutinee, fall back to a global variant
        // lookup so `None`-style patterns still work under inference.
        None => env
            .find_variant(name)
            .is_some_and(|(_, _, v)| v.is_nullary()),
    }
}

/// Variables may be bound at most once within a single pattern.
pub(crate) fn verify_no_duplicate_bindings(
    bindings: &[(String, Type)],
    span: Span,
) -> Result<(), TypeError> {
    let mut seen = FxHashSet::default();
    for (name, _) in bindings {
        if !seen.insert(name.as_str()) {
            return Err(TypeError::DuplicateDefinition {
                name: name.clone(),
                span: Some(span),
            });
        }
    }
    Ok(())
}

/// Variant names of `union` not covered, in declaration order.
pub(crate) fn missing_variants(union: &UnionDef, coverage: &Coverage) -> Vec<String> {
    if coverage.wildcard {
        return Vec::new();
    }
    union
        .variant_names()
        .filter(|name| !coverage.variants.contains(*name))
        .map(ToOwned::to_owned)
        .collect()
}

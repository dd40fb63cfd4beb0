//! Type variable substitutions.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::term::{Type, TypeVar};

/// A finite mapping from inference variables to type terms.
///
/// Substitutions compose during solving; composition is associative but
/// not commutative. The domain stays acyclic because every binding passes
/// the occurs-check before it is created, so `apply` terminates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    mapping: FxHashMap<TypeVar, Type>,
}

impl Substitution {
    /// The identity substitution.
    pub fn empty() -> Self {
        Substitution::default()
    }

    /// A substitution with a single binding.
    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut s = Substitution::empty();
        s.bind(var, ty);
        s
    }

    /// Add a binding, eliding identities (`v -> v`).
    pub fn bind(&mut self, var: TypeVar, ty: Type) {
        if ty == Type::Var(var) {
            return;
        }
        self.mapping.insert(var, ty);
    }

    pub fn get(&self, var: TypeVar) -> Option<&Type> {
        self.mapping.get(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Iterate over the bindings (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (TypeVar, &Type)> {
        self.mapping.iter().map(|(&v, t)| (v, t))
    }

    /// Apply the substitution to a term, to a fixed point: no variable in
    /// the domain remains in the output.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Primitive(_) | Type::Named(_) => ty.clone(),
            Type::Var(v) => match self.mapping.get(v) {
                // Recurse to resolve chains like $0 -> $1 -> Int.
                Some(bound) => self.apply(bound),
                None => ty.clone(),
            },
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|e| self.apply(e)).collect()),
            Type::Function { params, ret } => Type::Function {
                params: params.iter().map(|p| self.apply(p)).collect(),
                ret: Box::new(self.apply(ret)),
            },
            Type::Nullable(base) => {
                let applied = self.apply(base);
                // Re-collapse in case a variable resolved to a nullable.
                if matches!(applied, Type::Nullable(_)) {
                    applied
                } else {
                    Type::Nullable(Box::new(applied))
                }
            }
            Type::Union { name, args } => Type::Union {
                name: name.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
        }
    }

    /// Compose with another substitution so that
    /// `compose(a, b).apply(t) == a.apply(&b.apply(t))`.
    ///
    /// Every binding of `b` is rewritten through `a`, then bindings of `a`
    /// for variables outside `b`'s domain are added.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut out = Substitution::empty();
        for (v, t) in other.iter() {
            out.bind(v, self.apply(t));
        }
        for (v, t) in self.iter() {
            if other.get(v).is_none() {
                out.bind(v, t.clone());
            }
        }
        out
    }

    /// Restrict to bindings satisfying the predicate.
    pub fn filter(&self, mut pred: impl FnMut(TypeVar, &Type) -> bool) -> Substitution {
        let mut out = Substitution::empty();
        for (v, t) in self.iter() {
            if pred(v, t) {
                out.bind(v, t.clone());
            }
        }
        out
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (v, t)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v} -> {t}")?;
        }
        f.write_str("}")
    }
}

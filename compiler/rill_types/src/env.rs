//! Persistent inference environment.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::TypeContext;
use crate::def::{FunctionSignature, TypeDef, UnionDef, VariantDef};
use crate::term::{Type, TypeScheme, TypeVar};

/// Internal storage for [`InferenceEnv`], wrapped in `Rc` for cheap
/// structural sharing of the parent chain.
#[derive(Clone, Debug)]
struct EnvInner {
    variables: FxHashMap<String, TypeScheme>,
    /// Names in `variables` that were declared mutable in this frame.
    mutables: FxHashSet<String>,
    types: FxHashMap<String, TypeDef>,
    functions: FxHashMap<String, FunctionSignature>,
    parent: Option<InferenceEnv>,
    depth: u32,
}

/// Lexically scoped environment for the constraint path.
///
/// Environments are immutable records: every `with_*` operation returns a
/// new environment whose parent chain is shared structurally. Lookups walk
/// parents, so shadowing happens only across scope boundaries.
#[derive(Clone, Debug)]
pub struct InferenceEnv(Rc<EnvInner>);

impl InferenceEnv {
    /// An empty root environment.
    pub fn new() -> Self {
        InferenceEnv(Rc::new(EnvInner {
            variables: FxHashMap::default(),
            mutables: FxHashSet::default(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: None,
            depth: 0,
        }))
    }

    /// Copy variables, function signatures, and type definitions from a
    /// caller-provided context into a fresh root environment.
    pub fn from_type_context(ctx: &TypeContext) -> Self {
        let mut variables = FxHashMap::default();
        for (name, ty) in ctx.variables() {
            variables.insert(name.to_owned(), TypeScheme::mono(ty.clone()));
        }
        let mut functions = FxHashMap::default();
        for (name, sig) in ctx.functions() {
            functions.insert(name.to_owned(), sig.clone());
        }
        let mut types = FxHashMap::default();
        for (name, def) in ctx.types() {
            types.insert(name.to_owned(), def.clone());
        }
        InferenceEnv(Rc::new(EnvInner {
            variables,
            mutables: FxHashSet::default(),
            types,
            functions,
            parent: None,
            depth: 0,
        }))
    }

    pub fn depth(&self) -> u32 {
        self.0.depth
    }

    fn update(&self, f: impl FnOnce(&mut EnvInner)) -> Self {
        let mut inner = (*self.0).clone();
        f(&mut inner);
        InferenceEnv(Rc::new(inner))
    }

    /// Bind a variable to a monomorphic type in the current frame.
    #[must_use]
    pub fn with_variable(&self, name: impl Into<String>, ty: Type) -> Self {
        self.with_variable_scheme(name, TypeScheme::mono(ty))
    }

    /// Bind a variable to a type scheme in the current frame.
    #[must_use]
    pub fn with_variable_scheme(&self, name: impl Into<String>, scheme: TypeScheme) -> Self {
        let name = name.into();
        self.update(|inner| {
            // Rebinding in the same frame resets any mutability.
            inner.mutables.remove(&name);
            inner.variables.insert(name, scheme);
        })
    }

    /// Bind a `var`-declared (reassignable) variable in the current frame.
    #[must_use]
    pub fn with_mutable_variable(&self, name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        self.update(|inner| {
            inner.mutables.insert(name.clone());
            inner.variables.insert(name, TypeScheme::mono(ty));
        })
    }

    /// Register a type definition in the current frame.
    #[must_use]
    pub fn with_type_definition(&self, name: impl Into<String>, def: TypeDef) -> Self {
        let name = name.into();
        self.update(|inner| {
            inner.types.insert(name, def);
        })
    }

    /// Register a function signature in the current frame.
    #[must_use]
    pub fn with_function_signature(
        &self,
        name: impl Into<String>,
        sig: FunctionSignature,
    ) -> Self {
        let name = name.into();
        self.update(|inner| {
            inner.functions.insert(name, sig);
        })
    }

    /// Enter a child scope with no bindings.
    #[must_use]
    pub fn enter_scope(&self) -> Self {
        InferenceEnv(Rc::new(EnvInner {
            variables: FxHashMap::default(),
            mutables: FxHashSet::default(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: Some(self.clone()),
            depth: self.0.depth + 1,
        }))
    }

    /// Enter a child scope pre-populated with monomorphic bindings.
    #[must_use]
    pub fn enter_scope_with(
        &self,
        bindings: impl IntoIterator<Item = (String, Type)>,
    ) -> Self {
        self.enter_scope_with_schemes(
            bindings
                .into_iter()
                .map(|(n, t)| (n, TypeScheme::mono(t))),
        )
    }

    /// Enter a child scope pre-populated with scheme bindings.
    #[must_use]
    pub fn enter_scope_with_schemes(
        &self,
        bindings: impl IntoIterator<Item = (String, TypeScheme)>,
    ) -> Self {
        InferenceEnv(Rc::new(EnvInner {
            variables: bindings.into_iter().collect(),
            mutables: FxHashSet::default(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: Some(self.clone()),
            depth: self.0.depth + 1,
        }))
    }

    /// Look up a variable scheme, walking parent scopes.
    pub fn lookup_variable(&self, name: &str) -> Option<&TypeScheme> {
        self.0.variables.get(name).or_else(|| {
            self.0
                .parent
                .as_ref()
                .and_then(|p| p.lookup_variable(name))
        })
    }

    /// Whether a variable is reassignable, resolved in the same frame
    /// that `lookup_variable` finds it in. `None` when the name is
    /// unbound.
    pub fn lookup_mutability(&self, name: &str) -> Option<bool> {
        if self.0.variables.contains_key(name) {
            Some(self.0.mutables.contains(name))
        } else {
            self.0
                .parent
                .as_ref()
                .and_then(|p| p.lookup_mutability(name))
        }
    }

    /// Look up a type definition, walking parent scopes.
    pub fn lookup_type(&self, name: &str) -> Option<&TypeDef> {
        self.0
            .types
            .get(name)
            .or_else(|| self.0.parent.as_ref().and_then(|p| p.lookup_type(name)))
    }

    /// Look up a union definition, walking parent scopes.
    pub fn lookup_union(&self, name: &str) -> Option<&UnionDef> {
        self.lookup_type(name).and_then(TypeDef::as_union)
    }

    /// Look up a function signature, walking parent scopes.
    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.0
            .functions
            .get(name)
            .or_else(|| self.0.parent.as_ref().and_then(|p| p.lookup_function(name)))
    }

    /// Locate a variant by constructor name across every visible union
    /// definition, innermost scope first.
    pub fn find_variant(&self, name: &str) -> Option<(&str, &UnionDef, &VariantDef)> {
        let local = self.0.types.iter().find_map(|(union_name, def)| {
            let union = def.as_union()?;
            union
                .variant(name)
                .map(|variant| (union_name.as_str(), union, variant))
        });
        local.or_else(|| self.0.parent.as_ref().and_then(|p| p.find_variant(name)))
    }

    /// Free type variables of every bound scheme, across the whole chain.
    ///
    /// Used by generalization: variables free in the environment must not
    /// be quantified.
    pub fn free_type_vars(&self) -> FxHashSet<TypeVar> {
        let mut vars = FxHashSet::default();
        self.collect_free_type_vars(&mut vars);
        vars
    }

    fn collect_free_type_vars(&self, vars: &mut FxHashSet<TypeVar>) {
        for scheme in self.0.variables.values() {
            vars.extend(scheme.free_vars());
        }
        if let Some(parent) = &self.0.parent {
            parent.collect_free_type_vars(vars);
        }
    }

    /// Generalize `ty` over `candidates`, excluding variables free in the
    /// environment: `Gen(env, ty) = forall(candidates - FV(env)). ty`.
    pub fn generalize(&self, ty: &Type, candidates: &[TypeVar]) -> TypeScheme {
        let env_vars = self.free_type_vars();
        let quantified: Vec<TypeVar> = candidates
            .iter()
            .copied()
            .filter(|v| !env_vars.contains(v))
            .collect();
        if quantified.is_empty() {
            TypeScheme::mono(ty.clone())
        } else {
            TypeScheme::poly(quantified, ty.clone())
        }
    }
}

impl Default for InferenceEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::PrimitiveType;

    fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    #[test]
    fn bindings_do_not_mutate_the_original() {
        let env = InferenceEnv::new();
        let extended = env.with_variable("x", int());

        assert!(env.lookup_variable("x").is_none());
        assert_eq!(
            extended.lookup_variable("x"),
            Some(&TypeScheme::mono(int()))
        );
    }

    #[test]
    fn child_scope_shadows_parent() {
        let parent = InferenceEnv::new().with_variable("x", int());
        let child = parent.enter_scope().with_variable("x", boolean());

        assert_eq!(
            child.lookup_variable("x"),
            Some(&TypeScheme::mono(boolean()))
        );
        assert_eq!(
            parent.lookup_variable("x"),
            Some(&TypeScheme::mono(int()))
        );
        assert_eq!(child.depth(), 1);
        assert_eq!(parent.depth(), 0);
    }

    #[test]
    fn lookup_walks_the_chain() {
        let root = InferenceEnv::new().with_variable("x", int());
        let deep = root.enter_scope().enter_scope().enter_scope();
        assert_eq!(deep.depth(), 3);
        assert_eq!(deep.lookup_variable("x"), Some(&TypeScheme::mono(int())));
    }

    #[test]
    fn enter_scope_with_binds_all() {
        let env = InferenceEnv::new();
        let child = env.enter_scope_with(vec![
            ("a".to_owned(), int()),
            ("b".to_owned(), boolean()),
        ]);
        assert!(child.lookup_variable("a").is_some());
        assert!(child.lookup_variable("b").is_some());
    }

    #[test]
    fn mutability_tracks_the_resolving_frame() {
        let env = InferenceEnv::new()
            .with_variable("x", int())
            .with_mutable_variable("y", int());

        assert_eq!(env.lookup_mutability("x"), Some(false));
        assert_eq!(env.lookup_mutability("y"), Some(true));
        assert_eq!(env.lookup_mutability("z"), None);

        // An inner immutable shadow wins over an outer mutable binding.
        let child = env.enter_scope().with_variable("y", boolean());
        assert_eq!(child.lookup_mutability("y"), Some(false));
        // Unshadowed names resolve through the chain.
        assert_eq!(child.lookup_mutability("x"), Some(false));
    }

    #[test]
    fn rebinding_resets_mutability() {
        let env = InferenceEnv::new()
            .with_mutable_variable("x", int())
            .with_variable("x", boolean());
        assert_eq!(env.lookup_mutability("x"), Some(false));
    }

    #[test]
    fn generalize_skips_env_free_vars() {
        let v0 = TypeVar(0);
        let v1 = TypeVar(1);
        // v0 is free in the environment via a bound variable.
        let env = InferenceEnv::new().with_variable("x", Type::Var(v0));

        let ty = Type::Tuple(vec![Type::Var(v0), Type::Var(v1)]);
        let scheme = env.generalize(&ty, &[v0, v1]);

        assert_eq!(scheme.vars, vec![v1]);
    }

    #[test]
    fn generalize_with_no_candidates_is_mono() {
        let env = InferenceEnv::new();
        let scheme = env.generalize(&int(), &[]);
        assert!(scheme.is_mono());
    }

    #[test]
    fn quantified_scheme_vars_are_not_env_free() {
        let v0 = TypeVar(0);
        let scheme = TypeScheme::poly(vec![v0], Type::Var(v0));
        let env = InferenceEnv::new().with_variable_scheme("id", scheme);
        assert!(env.free_type_vars().is_empty());
    }
}

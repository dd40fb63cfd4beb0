//! Interned type construction and fresh inference variables.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::subst::Substitution;
use crate::term::{PrimitiveType, Type, TypeScheme, TypeVar};

/// Shared state behind a [`TypeFactory`] handle.
struct FactoryInner {
    /// Next inference variable id. Unique, monotonic, never recycled.
    next_var: AtomicU32,
    /// Structural dedup cache. Insertion is last-writer-wins; values are
    /// pure so a racing double-insert is harmless.
    cache: RwLock<FxHashMap<Type, Type>>,
}

/// Interned construction of structural types.
///
/// The factory is a cheaply cloneable handle; clones share the cache and
/// the variable counter. Interning returns the canonical instance for a
/// structural signature, which keeps repeated instantiations cheap - it
/// is an optimization only, and nothing may rely on pointer identity.
///
/// Embedding hosts reset per compilation unit by creating a fresh factory.
#[derive(Clone)]
pub struct TypeFactory {
    inner: Arc<FactoryInner>,
}

impl TypeFactory {
    pub fn new() -> Self {
        TypeFactory {
            inner: Arc::new(FactoryInner {
                next_var: AtomicU32::new(0),
                cache: RwLock::new(FxHashMap::default()),
            }),
        }
    }

    /// Primitives are constants; `primitive(Int)` is the same term on
    /// every call by construction.
    pub fn primitive(&self, p: PrimitiveType) -> Type {
        Type::Primitive(p)
    }

    /// A nominal reference or type-parameter reference.
    pub fn named(&self, name: impl Into<String>) -> Type {
        self.intern(Type::Named(name.into()))
    }

    /// An applied generic such as `List<Int>`.
    pub fn generic(&self, name: impl Into<String>, args: Vec<Type>) -> Type {
        self.intern(Type::Generic {
            name: name.into(),
            args,
        })
    }

    pub fn tuple(&self, elems: Vec<Type>) -> Type {
        self.intern(Type::Tuple(elems))
    }

    pub fn function(&self, params: Vec<Type>, ret: Type) -> Type {
        self.intern(Type::Function {
            params,
            ret: Box::new(ret),
        })
    }

    /// `T?`, collapsing `T??` to `T?` at construction.
    pub fn nullable(&self, base: Type) -> Type {
        if matches!(base, Type::Nullable(_)) {
            return base;
        }
        self.intern(Type::Nullable(Box::new(base)))
    }

    /// A nominal reference to a tagged-union definition.
    pub fn union(&self, name: impl Into<String>, args: Vec<Type>) -> Type {
        self.intern(Type::Union {
            name: name.into(),
            args,
        })
    }

    /// A fresh inference variable as a type term.
    pub fn fresh_var(&self) -> Type {
        Type::Var(self.fresh_type_var())
    }

    /// A fresh inference variable.
    pub fn fresh_type_var(&self) -> TypeVar {
        TypeVar(self.inner.next_var.fetch_add(1, Ordering::Relaxed))
    }

    /// Instantiate a scheme: each quantified variable is replaced by a
    /// fresh one, consistently throughout the body.
    pub fn instantiate(&self, scheme: &TypeScheme) -> Type {
        if scheme.is_mono() {
            return scheme.ty.clone();
        }
        let mut mapping = Substitution::empty();
        for &v in &scheme.vars {
            mapping.bind(v, self.fresh_var());
        }
        mapping.apply(&scheme.ty)
    }

    fn intern(&self, ty: Type) -> Type {
        if let Some(canonical) = self.inner.cache.read().get(&ty) {
            return canonical.clone();
        }
        self.inner.cache.write().insert(ty.clone(), ty.clone());
        ty
    }
}

impl Default for TypeFactory {
    fn default() -> Self {
        Self::new()
    }
}

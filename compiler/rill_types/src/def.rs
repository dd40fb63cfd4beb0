//! Caller-provided type and function definitions.

use crate::term::Type;

/// A registered type definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDef {
    Union(UnionDef),
}

impl TypeDef {
    pub fn as_union(&self) -> Option<&UnionDef> {
        match self {
            TypeDef::Union(u) => Some(u),
        }
    }
}

/// A tagged-union definition, e.g. `type Option<T> = Some(T) | None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionDef {
    /// Declared type parameter names, in order.
    pub type_params: Vec<String>,
    /// Declared variants, in order.
    pub variants: Vec<VariantDef>,
}

impl UnionDef {
    pub fn new(type_params: Vec<String>, variants: Vec<VariantDef>) -> Self {
        UnionDef {
            type_params,
            variants,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn variant(&self, name: &str) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Variant names in declaration order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.name.as_str())
    }
}

/// One constructor of a tagged union.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    /// Declared field types; may reference the union's type parameters
    /// as `Named` terms.
    pub fields: Vec<Type>,
}

impl VariantDef {
    pub fn new(name: impl Into<String>, fields: Vec<Type>) -> Self {
        VariantDef {
            name: name.into(),
            fields,
        }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Nullary variants double as identifier-form constructors.
    pub fn is_nullary(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A registered top-level function signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Declared type parameter names, in order.
    pub type_params: Vec<String>,
    pub params: Vec<Type>,
    pub ret: Type,
}

impl FunctionSignature {
    pub fn new(type_params: Vec<String>, params: Vec<Type>, ret: Type) -> Self {
        FunctionSignature {
            type_params,
            params,
            ret,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// The signature as a bare function type.
    pub fn as_function_type(&self) -> Type {
        Type::Function {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
        }
    }
}

//! The caller-provided checking context.

use indexmap::IndexMap;

use crate::def::{FunctionSignature, TypeDef, UnionDef, VariantDef};
use crate::term::Type;

/// Everything the embedding host registers before checking a compilation
/// unit: variable types, function signatures, and type definitions.
///
/// Registries keep insertion order so variant lookup across unions is
/// deterministic.
#[derive(Clone, Debug, Default)]
pub struct TypeContext {
    variables: IndexMap<String, Type>,
    functions: IndexMap<String, FunctionSignature>,
    types: IndexMap<String, TypeDef>,
}

impl TypeContext {
    pub fn new() -> Self {
        TypeContext::default()
    }

    /// Register a variable with its type.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.variables.insert(name.into(), ty);
        self
    }

    /// Register a top-level function signature.
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, sig: FunctionSignature) -> Self {
        self.functions.insert(name.into(), sig);
        self
    }

    /// Register a type definition.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, def: TypeDef) -> Self {
        self.types.insert(name.into(), def);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&Type> {
        self.variables.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn union_def(&self, name: &str) -> Option<&UnionDef> {
        self.type_def(name).and_then(TypeDef::as_union)
    }

    /// Locate a variant by constructor name across all union definitions,
    /// in registration order.
    pub fn find_variant(&self, name: &str) -> Option<(&str, &UnionDef, &VariantDef)> {
        self.types.iter().find_map(|(union_name, def)| {
            let union = def.as_union()?;
            union
                .variant(name)
                .map(|variant| (union_name.as_str(), union, variant))
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.variables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &FunctionSignature)> {
        self.functions.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.types.iter().map(|(n, d)| (n.as_str(), d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::PrimitiveType;

    fn option_def() -> UnionDef {
        UnionDef::new(
            vec!["T".into()],
            vec![
                VariantDef::new("Some", vec![Type::Named("T".into())]),
                VariantDef::new("None", vec![]),
            ],
        )
    }

    #[test]
    fn find_variant_searches_all_unions() {
        let ctx = TypeContext::new()
            .with_type("Option", TypeDef::Union(option_def()))
            .with_type(
                "Color",
                TypeDef::Union(UnionDef::new(
                    vec![],
                    vec![VariantDef::new("Red", vec![]), VariantDef::new("Blue", vec![])],
                )),
            );

        let (union_name, _, variant) = ctx.find_variant("Blue").unwrap();
        assert_eq!(union_name, "Color");
        assert!(variant.is_nullary());

        let (union_name, union, variant) = ctx.find_variant("Some").unwrap();
        assert_eq!(union_name, "Option");
        assert!(union.is_generic());
        assert_eq!(variant.arity(), 1);

        assert!(ctx.find_variant("Green").is_none());
    }

    #[test]
    fn variable_registration() {
        let ctx =
            TypeContext::new().with_variable("x", Type::Primitive(PrimitiveType::Int));
        assert_eq!(
            ctx.variable("x"),
            Some(&Type::Primitive(PrimitiveType::Int))
        );
        assert_eq!(ctx.variable("y"), None);
    }
}

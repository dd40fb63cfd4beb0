//! Structural type terms and type schemes.

use std::fmt;

use rustc_hash::FxHashSet;

/// The fixed primitive types.
///
/// This is a closed set; there is no way to introduce a ninth primitive
/// short of editing this enum.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Unit,
    Throwable,
}

impl PrimitiveType {
    /// All primitives, in declaration order.
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::String,
        PrimitiveType::Unit,
        PrimitiveType::Throwable,
    ];

    /// The source-level name.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
            PrimitiveType::Unit => "Unit",
            PrimitiveType::Throwable => "Throwable",
        }
    }

    /// Resolve a primitive by its source-level name.
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        PrimitiveType::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Position in the widening chain `Int < Long < Float < Double`,
    /// or `None` for non-numeric primitives.
    pub const fn numeric_rank(self) -> Option<u8> {
        match self {
            PrimitiveType::Int => Some(0),
            PrimitiveType::Long => Some(1),
            PrimitiveType::Float => Some(2),
            PrimitiveType::Double => Some(3),
            _ => None,
        }
    }

    /// Check membership in the numeric widening chain.
    pub const fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inference variable, globally unique within a factory.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeVar(pub u32);

impl TypeVar {
    pub const fn new(id: u32) -> Self {
        TypeVar(id)
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// A structural type term.
///
/// Terms carry no source locations; equality is the derived structural
/// comparison and is the single equality used everywhere (locations live
/// on AST nodes, constraints, and errors instead).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    /// One of the eight builtin primitives.
    Primitive(PrimitiveType),
    /// A user-defined nominal type or a type-parameter reference.
    Named(String),
    /// An explicit inference variable.
    Var(TypeVar),
    /// An applied generic type such as `List<Int>`.
    Generic { name: String, args: Vec<Type> },
    /// `(A, B, C)`
    Tuple(Vec<Type>),
    /// `(A, B) -> C`
    Function { params: Vec<Type>, ret: Box<Type> },
    /// `T?` - never directly nested; the factory collapses `T??` to `T?`.
    Nullable(Box<Type>),
    /// A nominal reference to a tagged-union definition.
    Union { name: String, args: Vec<Type> },
}

/// Legacy convention: a `Named` term whose name is a single uppercase
/// ASCII letter or `T` followed by digits stands for a type variable.
///
/// Explicit `Var` terms are the propagating representation; this predicate
/// exists so declared type parameters (`T`, `E`, `T1`) leaking into the
/// unifier are matched permissively rather than rejected. Retiring the
/// convention means deleting this one function.
pub fn is_type_var_name(name: &str) -> bool {
    if PrimitiveType::from_name(name).is_some() {
        return false;
    }
    let mut chars = name.chars();
    match (chars.next(), chars.as_str()) {
        (Some(c), "") => c.is_ascii_uppercase(),
        (Some('T'), rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

impl Type {
    /// Shorthand for the `Unit` primitive.
    pub const UNIT: Type = Type::Primitive(PrimitiveType::Unit);

    /// Check whether this term is (or names, by the legacy convention) a
    /// type variable.
    pub fn is_var(&self) -> bool {
        match self {
            Type::Var(_) => true,
            Type::Named(name) => is_type_var_name(name),
            _ => false,
        }
    }

    /// Check whether this is a primitive in the numeric widening chain.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_numeric())
    }

    /// Collect free inference variables in first-occurrence order.
    pub fn free_vars(&self) -> Vec<TypeVar> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_free_vars(&mut seen, &mut out);
        out
    }

    fn collect_free_vars(&self, seen: &mut FxHashSet<TypeVar>, out: &mut Vec<TypeVar>) {
        match self {
            Type::Primitive(_) | Type::Named(_) => {}
            Type::Var(v) => {
                if seen.insert(*v) {
                    out.push(*v);
                }
            }
            Type::Generic { args, .. } | Type::Union { args, .. } => {
                for a in args {
                    a.collect_free_vars(seen, out);
                }
            }
            Type::Tuple(elems) => {
                for e in elems {
                    e.collect_free_vars(seen, out);
                }
            }
            Type::Function { params, ret } => {
                for p in params {
                    p.collect_free_vars(seen, out);
                }
                ret.collect_free_vars(seen, out);
            }
            Type::Nullable(base) => base.collect_free_vars(seen, out),
        }
    }

    /// Replace `Named` type-parameter references according to a mapping,
    /// e.g. instantiating a union's declared field types.
    pub fn substitute_named<S: std::hash::BuildHasher>(
        &self,
        mapping: &std::collections::HashMap<String, Type, S>,
    ) -> Type {
        match self {
            Type::Primitive(_) | Type::Var(_) => self.clone(),
            Type::Named(name) => mapping.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute_named(mapping)).collect(),
            },
            Type::Tuple(elems) => {
                Type::Tuple(elems.iter().map(|e| e.substitute_named(mapping)).collect())
            }
            Type::Function { params, ret } => Type::Function {
                params: params.iter().map(|p| p.substitute_named(mapping)).collect(),
                ret: Box::new(ret.substitute_named(mapping)),
            },
            Type::Nullable(base) => Type::Nullable(Box::new(base.substitute_named(mapping))),
            Type::Union { name, args } => Type::Union {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute_named(mapping)).collect(),
            },
        }
    }

    /// Decompose `Result<T, E>` into its components, whether written as a
    /// generic reference or a union reference.
    pub fn as_result(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Generic { name, args } | Type::Union { name, args }
                if name == "Result" && args.len() == 2 =>
            {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// Check whether `var` occurs anywhere in this term.
    pub fn contains_var(&self, var: TypeVar) -> bool {
        match self {
            Type::Primitive(_) | Type::Named(_) => false,
            Type::Var(v) => *v == var,
            Type::Generic { args, .. } | Type::Union { args, .. } => {
                args.iter().any(|a| a.contains_var(var))
            }
            Type::Tuple(elems) => elems.iter().any(|e| e.contains_var(var)),
            Type::Function { params, ret } => {
                params.iter().any(|p| p.contains_var(var)) || ret.contains_var(var)
            }
            Type::Nullable(base) => base.contains_var(var),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[Type]) -> fmt::Result {
    f.write_str(name)?;
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{a}")?;
    }
    f.write_str(">")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Named(name) => f.write_str(name),
            Type::Var(v) => write!(f, "{v}"),
            Type::Generic { name, args } | Type::Union { name, args } => write_args(f, name, args),
            Type::Tuple(elems) => {
                f.write_str("(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str(")")
            }
            Type::Function { params, ret } => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Nullable(base) => match **base {
                Type::Function { .. } => write!(f, "({base})?"),
                _ => write!(f, "{base}?"),
            },
        }
    }
}

/// A type paired with its universally quantified inference variables.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeScheme {
    /// Quantified variables; empty means the scheme is monomorphic.
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl TypeScheme {
    /// A scheme quantifying nothing.
    pub fn mono(ty: Type) -> Self {
        TypeScheme { vars: Vec::new(), ty }
    }

    /// A scheme quantifying `vars` in `ty`.
    pub fn poly(vars: Vec<TypeVar>, ty: Type) -> Self {
        TypeScheme { vars, ty }
    }

    pub fn is_mono(&self) -> bool {
        self.vars.is_empty()
    }

    /// Free variables of the body minus the quantified set.
    pub fn free_vars(&self) -> Vec<TypeVar> {
        self.ty
            .free_vars()
            .into_iter()
            .filter(|v| !self.vars.contains(v))
            .collect()
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vars.is_empty() {
            f.write_str("forall")?;
            for v in &self.vars {
                write!(f, " {v}")?;
            }
            f.write_str(". ")?;
        }
        write!(f, "{}", self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_round_trip() {
        for p in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_name(p.name()), Some(p));
        }
        assert_eq!(PrimitiveType::from_name("int"), None);
        assert_eq!(PrimitiveType::from_name("Option"), None);
    }

    #[test]
    fn type_var_name_convention() {
        assert!(is_type_var_name("A"));
        assert!(is_type_var_name("T"));
        assert!(is_type_var_name("T0"));
        assert!(is_type_var_name("T42"));
        assert!(!is_type_var_name("Tx"));
        assert!(!is_type_var_name("Option"));
        assert!(!is_type_var_name("a"));
        // Builtins are never type variables, whatever their shape.
        assert!(!is_type_var_name("Int"));
    }

    #[test]
    fn free_vars_in_first_occurrence_order() {
        let ty = Type::Function {
            params: vec![Type::Var(TypeVar(3)), Type::Var(TypeVar(1))],
            ret: Box::new(Type::Tuple(vec![
                Type::Var(TypeVar(3)),
                Type::Var(TypeVar(2)),
            ])),
        };
        assert_eq!(
            ty.free_vars(),
            vec![TypeVar(3), TypeVar(1), TypeVar(2)]
        );
    }

    #[test]
    fn contains_var_looks_through_structure() {
        let ty = Type::Generic {
            name: "List".into(),
            args: vec![Type::Nullable(Box::new(Type::Var(TypeVar(7))))],
        };
        assert!(ty.contains_var(TypeVar(7)));
        assert!(!ty.contains_var(TypeVar(8)));
    }

    #[test]
    fn scheme_free_vars_exclude_quantified() {
        let body = Type::Function {
            params: vec![Type::Var(TypeVar(0))],
            ret: Box::new(Type::Var(TypeVar(1))),
        };
        let scheme = TypeScheme::poly(vec![TypeVar(0)], body);
        assert_eq!(scheme.free_vars(), vec![TypeVar(1)]);
    }

    #[test]
    fn display_forms() {
        let f = Type::Function {
            params: vec![Type::Primitive(PrimitiveType::Int)],
            ret: Box::new(Type::Primitive(PrimitiveType::Boolean)),
        };
        assert_eq!(f.to_string(), "(Int) -> Boolean");

        let opt = Type::Union {
            name: "Option".into(),
            args: vec![Type::Primitive(PrimitiveType::Int)],
        };
        assert_eq!(opt.to_string(), "Option<Int>");

        let nullable_fn = Type::Nullable(Box::new(f));
        assert_eq!(nullable_fn.to_string(), "((Int) -> Boolean)?");
    }
}

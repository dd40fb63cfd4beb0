//! Mutable scope stack for the direct (algorithmic) checker.

use rill_ir::Span;
use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::term::Type;

/// A declared variable in an imperative scope.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableBinding {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub span: Option<Span>,
}

#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<String, VariableBinding>,
}

/// A stack of mutable scopes.
///
/// Redeclaration is rejected only within the innermost scope; shadowing an
/// outer scope is allowed. The root (global) scope can never be popped.
#[derive(Debug)]
pub struct ScopeManager {
    scopes: Vec<Scope>,
}

impl ScopeManager {
    /// A manager holding just the global scope.
    pub fn new() -> Self {
        ScopeManager {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of scopes above the global one.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Enter a block scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Leave the current block scope.
    ///
    /// Popping the global scope violates the bracketing invariant and is
    /// reported rather than performed.
    pub fn pop_scope(&mut self) -> Result<(), TypeError> {
        if self.scopes.len() == 1 {
            return Err(TypeError::InvalidOperation {
                message: "cannot pop the global scope".into(),
                span: None,
            });
        }
        self.scopes.pop();
        Ok(())
    }

    /// Declare a variable in the innermost scope.
    pub fn declare_variable(&mut self, binding: VariableBinding) -> Result<(), TypeError> {
        let scope = self
            .scopes
            .last_mut()
            .expect("the global scope always exists");
        if scope.bindings.contains_key(&binding.name) {
            return Err(TypeError::DuplicateDefinition {
                name: binding.name,
                span: binding.span,
            });
        }
        scope.bindings.insert(binding.name.clone(), binding);
        Ok(())
    }

    /// Look up a binding, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&VariableBinding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    /// Names visible from the current scope, including shadowed ones.
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|s| s.bindings.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Lexical scopes for local bindings.

use crate::types::TypeInfo;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// The kind of binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// A method, constructor, accessor or lambda parameter.
    Parameter,
    /// A local variable (including `for`, `using` and `out` declarations).
    Local,
    /// A `foreach` iteration variable.
    Iteration,
    /// A `catch` variable.
    Catch,
    /// A variable introduced by an `is` pattern.
    Pattern,
    /// A local function; its type is the return type.
    Function,
}

/// A name visible in the current scope.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The kind of binding.
    pub kind: BindingKind,
    /// The declared or inferred type; `None` when it could not be resolved.
    ///
    /// An unresolved binding still shadows fields of the same name.
    pub ty: Option<TypeInfo>,
}

/// A stack of nested scopes.
///
/// Outside of any scope (at class level) declarations are ignored: fields and
/// properties are resolved through the class table instead.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<FxHashMap<SmolStr, Binding>>,
}

impl Scope {
    /// Creates an empty scope stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current nesting depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a nested scope.
    pub fn enter(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Closes the innermost scope and drops its bindings.
    pub fn leave(&mut self) {
        self.frames.pop();
    }

    /// Declares a name in the innermost scope. Returns false when there is no
    /// open scope.
    pub fn declare(&mut self, name: SmolStr, kind: BindingKind, ty: Option<TypeInfo>) -> bool {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.insert(name, Binding { kind, ty });
                true
            }
            None => false,
        }
    }

    /// Finds the innermost binding for a name.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_leave() {
        let mut scope = Scope::new();
        assert!(!scope.declare("x".into(), BindingKind::Local, None));

        scope.enter();
        scope.declare("x".into(), BindingKind::Parameter, Some(TypeInfo::named("int")));
        scope.enter();
        scope.declare("x".into(), BindingKind::Local, Some(TypeInfo::named("string")));
        assert_eq!(scope.depth(), 2);
        assert_eq!(scope.lookup("x").and_then(|b| b.ty.as_ref()), Some(&TypeInfo::named("string")));

        scope.leave();
        let binding = scope.lookup("x").expect("outer binding");
        assert_eq!(binding.kind, BindingKind::Parameter);
        assert_eq!(binding.ty, Some(TypeInfo::named("int")));

        scope.leave();
        assert!(scope.lookup("x").is_none());
    }
}

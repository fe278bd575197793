use std::collections::HashMap;
use std::rc::Rc;

use crate::{
    ast::{Block, SourceLocation},
    interpreter::value::core::Value,
};

/// Handle to a scope in the [`EnvArena`].
///
/// Closures capture their defining scope as a handle rather than an owning
/// pointer, so the closure/environment reference cycles that lexical capture
/// creates cost nothing: the whole arena is dropped when the run ends.
pub type EnvRef = usize;

/// A named section body, registered by a `name: { … }` declaration and
/// consumed by the solution runner.
#[derive(Debug, Clone)]
pub struct Section {
    pub name:     String,
    pub body:     Rc<Block>,
    /// Whether the declaration carried an `@slow` annotation.
    pub slow:     bool,
    pub location: SourceLocation,
}

/// One binding: the value plus whether `mut` was used.
#[derive(Debug, Clone)]
struct Binding {
    value:   Value,
    mutable: bool,
}

/// A single lexical scope.
#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    sections: Vec<Rc<Section>>,
    parent:   Option<EnvRef>,
}

/// The outcome of an assignment attempt, resolved by the caller into a
/// runtime error carrying the assignment's source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    NotFound,
    Immutable,
}

/// Owns every scope created during a run.
#[derive(Debug, Default)]
pub struct EnvArena {
    scopes: Vec<Scope>,
}

impl EnvArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope with no parent.
    pub fn root(&mut self) -> EnvRef {
        self.scopes.push(Scope::default());
        self.scopes.len() - 1
    }

    /// Creates a child scope of `parent`.
    pub fn child(&mut self, parent: EnvRef) -> EnvRef {
        self.scopes.push(Scope { parent: Some(parent),
                                 ..Scope::default() });
        self.scopes.len() - 1
    }

    /// Looks a name up, walking the parent chain.
    #[must_use]
    pub fn lookup(&self, env: EnvRef, name: &str) -> Option<&Value> {
        let mut current = Some(env);
        while let Some(scope) = current {
            if let Some(binding) = self.scopes[scope].bindings.get(name) {
                return Some(&binding.value);
            }
            current = self.scopes[scope].parent;
        }
        None
    }

    /// Whether `name` is already declared directly in `env`.
    #[must_use]
    pub fn declared_here(&self, env: EnvRef, name: &str) -> bool {
        self.scopes[env].bindings.contains_key(name)
    }

    /// Declares a new binding in `env`. The caller checks
    /// [`EnvArena::declared_here`] first; re-declaration is a name error.
    pub fn declare(&mut self, env: EnvRef, name: &str, value: Value, mutable: bool) {
        self.scopes[env].bindings.insert(name.to_string(), Binding { value, mutable });
    }

    /// Assigns to an existing binding, walking the parent chain.
    pub fn assign(&mut self, env: EnvRef, name: &str, value: Value) -> AssignOutcome {
        let mut current = Some(env);
        while let Some(scope) = current {
            if let Some(binding) = self.scopes[scope].bindings.get_mut(name) {
                if !binding.mutable {
                    return AssignOutcome::Immutable;
                }
                binding.value = value;
                return AssignOutcome::Assigned;
            }
            current = self.scopes[scope].parent;
        }
        AssignOutcome::NotFound
    }

    /// Appends a section declaration to `env`'s registry.
    pub fn add_section(&mut self, env: EnvRef, section: Section) {
        self.scopes[env].sections.push(Rc::new(section));
    }

    /// The sections named `name` declared directly in `env`, in declaration
    /// order.
    #[must_use]
    pub fn sections_local(&self, env: EnvRef, name: &str) -> Vec<Rc<Section>> {
        self.scopes[env].sections
                        .iter()
                        .filter(|section| section.name == name)
                        .cloned()
                        .collect()
    }

    /// All sections named `name` visible from `env`, outermost scope first,
    /// declaration order within a scope preserved.
    #[must_use]
    pub fn sections(&self, env: EnvRef, name: &str) -> Vec<Rc<Section>> {
        let mut chain = Vec::new();
        let mut current = Some(env);
        while let Some(scope) = current {
            chain.push(scope);
            current = self.scopes[scope].parent;
        }

        let mut found = Vec::new();
        for scope in chain.into_iter().rev() {
            for section in &self.scopes[scope].sections {
                if section.name == name {
                    found.push(Rc::clone(section));
                }
            }
        }
        found
    }
}

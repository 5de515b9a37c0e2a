// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::collections::HashMap;

use log::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeKind {
    #[default]
    Block,

    Program,
    Procedure,

    /// The sub-scope holding only the control variable of a `ForLoop`.
    /// Declarations never bind into this kind of scope.
    LoopVariable,
}

#[derive(Debug, Clone, Default)]
pub struct Scope<V> {
    kind: ScopeKind,
    bindings: HashMap<String, V>,
}

impl<V> Scope<V> {
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.bindings.get(name)
    }
}

/// A stack of name bindings. The semantic analyzer keeps two of these with
/// the same push/pop discipline: one mapping names to their declaration,
/// one mapping names to the node that last gave them a value.
#[derive(Debug, Clone)]
pub struct ScopeStack<V> {
    scopes: Vec<Scope<V>>,
}

impl<V: Copy> ScopeStack<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            bindings: HashMap::new(),
        });
    }

    pub fn pop(&mut self) {
        let popped = self.scopes.pop();
        debug_assert!(popped.is_some(), "Popped a scope that was never pushed");
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Searches innermost to outermost.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<V> {
        self.scopes.iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }

    /// Whether `name` is bound anywhere between the innermost scope and the
    /// scope [`bind`](Self::bind) would place it in, inclusive.
    #[must_use]
    pub fn is_bound_locally(&self, name: &str) -> bool {
        let Some(target) = self.binding_scope_index() else {
            return false;
        };

        self.scopes[target..].iter().any(|scope| scope.get(name).is_some())
    }

    /// Binds in the innermost scope that is not a loop-variable scope.
    pub fn bind(&mut self, name: impl Into<String>, value: V) {
        let Some(target) = self.binding_scope_index() else {
            warn!("Tried to bind a name without any scope to bind it in");
            return;
        };

        self.scopes[target].bindings.insert(name.into(), value);
    }

    /// Binds in the innermost scope, whatever its kind.
    pub fn bind_innermost(&mut self, name: impl Into<String>, value: V) {
        let Some(scope) = self.scopes.last_mut() else {
            warn!("Tried to bind a name without any scope to bind it in");
            return;
        };

        scope.bindings.insert(name.into(), value);
    }

    fn binding_scope_index(&self) -> Option<usize> {
        self.scopes.iter()
            .rposition(|scope| scope.kind != ScopeKind::LoopVariable)
            .or_else(|| self.scopes.len().checked_sub(1))
    }
}

impl<V: Copy> Default for ScopeStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

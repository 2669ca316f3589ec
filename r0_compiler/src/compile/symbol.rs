//! Symbol scopes for semantic analysis.
use smol_str::SmolStr;
use std::collections::{hash_map::Entry, HashMap};

use crate::parsing::VarType;

/// What a name resolves to. Bindings hold the semantic facts the later
/// passes need rather than references into the tree, so scopes carry no
/// lifetime.
#[derive(Debug, Clone)]
pub enum Binding {
    Var(VarBinding),
    Func(FuncBinding),
}

#[derive(Debug, Clone, Copy)]
pub struct VarBinding {
    pub ty: VarType,
    pub is_const: bool,
}

#[derive(Debug, Clone)]
pub struct FuncBinding {
    pub params: Vec<VarType>,
    pub return_type: VarType,
}

/// A name-to-binding map valid from its push to its pop.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<SmolStr, Binding>,
}

impl Scope {
    /// Returns false when the name is already bound in this scope.
    pub fn insert(&mut self, name: SmolStr, binding: Binding) -> bool {
        match self.symbols.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(binding);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.symbols.get(name)
    }
}

/// Stack of scopes. Lookup walks from the innermost scope outwards.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Starts with the outermost scope already in place.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the outermost scope");
        self.scopes.pop();
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
    }

    /// Typed lookup for a variable. Scopes binding the name to a
    /// function are skipped and the walk continues outwards.
    pub fn lookup_var(&self, name: &str) -> Option<VarBinding> {
        self.scopes.iter().rev().find_map(|scope| match scope.get(name) {
            Some(Binding::Var(var)) => Some(*var),
            _ => None,
        })
    }

    /// Typed lookup for a function.
    pub fn lookup_func(&self, name: &str) -> Option<&FuncBinding> {
        self.scopes.iter().rev().find_map(|scope| match scope.get(name) {
            Some(Binding::Func(func)) => Some(func),
            _ => None,
        })
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

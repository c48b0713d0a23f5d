//! Scope-aware name resolution for the compiler. A stack of scopes, each
//! owning a name→symbol map, a definition counter used to assign dense
//! indices, and an ordered free-symbol list for closure capture.

use crate::core::value::Symbol as Name;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolScope {
    Global,
    Local,
    BuiltIn,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: Name,
    pub scope: SymbolScope,
    pub index: u32,
}

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<Name, Symbol>,
    num_definitions: u32,
    /// Original (outer) symbols this scope has captured, in capture order;
    /// this order becomes a closure's bind-list.
    free_symbols: Vec<Symbol>,
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn enter_scope(&mut self) {
        tracing::trace!("entering compiler scope, depth now {}", self.scopes.len() + 1);
        self.scopes.push(Scope::default());
    }

    /// Exit the innermost scope, returning the free symbols it captured (in
    /// capture order) — the bind-list for whatever closure this scope was.
    pub fn exit_scope(&mut self) -> Vec<Symbol> {
        let scope = self
            .scopes
            .pop()
            .expect("exit_scope called with no enclosing scope to leave");
        tracing::trace!("exiting compiler scope, depth now {}", self.scopes.len());
        scope.free_symbols
    }

    fn is_global(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Number of names defined so far in the innermost scope.
    pub fn num_definitions(&self) -> u32 {
        self.scopes.last().expect("at least one scope").num_definitions
    }

    /// Insert `name` into the innermost scope. Scope is `Local` unless the
    /// innermost scope is the global one, in which case it is `Global`.
    /// Assigns a dense, zero-based index equal to the pre-call
    /// `num_definitions`.
    pub fn define(&mut self, name: Name) -> Symbol {
        let scope_kind = if self.is_global() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let scope = self.scopes.last_mut().expect("at least one scope");
        let index = scope.num_definitions;
        let symbol = Symbol {
            name,
            scope: scope_kind,
            index,
        };
        scope.store.insert(name, symbol);
        scope.num_definitions += 1;
        symbol
    }

    /// Pre-populate the global scope with a built-in at a fixed index.
    /// Built-ins occupy their own index space, separate from `define`'s
    /// per-scope counter.
    pub fn define_builtin(&mut self, index: u32, name: Name) -> Symbol {
        let symbol = Symbol {
            name,
            scope: SymbolScope::BuiltIn,
            index,
        };
        self.scopes[0].store.insert(name, symbol);
        symbol
    }

    /// Resolve `name` innermost-outward, capturing free variables through
    /// every intermediate scope along the way.
    pub fn resolve(&mut self, name: Name) -> Option<Symbol> {
        let depth = self.scopes.len() - 1;
        self.resolve_at(depth, name)
    }

    fn resolve_at(&mut self, depth: usize, name: Name) -> Option<Symbol> {
        if let Some(&symbol) = self.scopes[depth].store.get(&name) {
            return Some(symbol);
        }
        if depth == 0 {
            return None;
        }
        let outer = self.resolve_at(depth - 1, name)?;
        match outer.scope {
            SymbolScope::Global | SymbolScope::BuiltIn => Some(outer),
            SymbolScope::Local | SymbolScope::Free => Some(self.define_free(depth, outer)),
        }
    }

    fn define_free(&mut self, depth: usize, original: Symbol) -> Symbol {
        let scope = &mut self.scopes[depth];
        scope.free_symbols.push(original);
        let free = Symbol {
            name: original.name,
            scope: SymbolScope::Free,
            index: (scope.free_symbols.len() - 1) as u32,
        };
        scope.store.insert(original.name, free);
        free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: u32) -> Name {
        Name(n)
    }

    #[test]
    fn define_then_resolve_in_global_scope() {
        let mut table = SymbolTable::new();
        let pre = table.num_definitions();
        let defined = table.define(name(1));
        assert_eq!(defined.scope, SymbolScope::Global);
        assert_eq!(defined.index, pre);
        let resolved = table.resolve(name(1)).unwrap();
        assert_eq!(resolved, defined);
    }

    #[test]
    fn define_in_nested_scope_is_local() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        let defined = table.define(name(2));
        assert_eq!(defined.scope, SymbolScope::Local);
        assert_eq!(defined.index, 0);
    }

    #[test]
    fn shadowing_hides_outer_binding_for_subsequent_lookups() {
        let mut table = SymbolTable::new();
        let outer_a = table.define(name(10));
        table.enter_scope();
        let inner_a = table.define(name(10));
        assert_eq!(table.resolve(name(10)).unwrap(), inner_a);
        assert_ne!(inner_a, outer_a);
        table.exit_scope();
        assert_eq!(table.resolve(name(10)).unwrap(), outer_a);
    }

    #[test]
    fn free_symbol_capture_cascades_through_intermediate_scopes() {
        let mut table = SymbolTable::new();
        table.enter_scope(); // depth 1: defines `a`
        let a = table.define(name(1));
        table.enter_scope(); // depth 2
        table.enter_scope(); // depth 3: resolves `a`, two scopes up
        let resolved = table.resolve(name(1)).unwrap();
        assert_eq!(resolved.scope, SymbolScope::Free);
        assert_eq!(resolved.index, 0);

        let depth3_free = table.exit_scope();
        assert_eq!(depth3_free, vec![Symbol {
            scope: SymbolScope::Free,
            ..a
        }]);

        // The intermediate scope (depth 2) also acquired a free entry for `a`.
        let depth2_free = table.exit_scope();
        assert_eq!(depth2_free, vec![a]);
    }

    #[test]
    fn global_and_builtin_lookups_pass_through_regardless_of_depth() {
        let mut table = SymbolTable::new();
        let global = table.define(name(5));
        let builtin = table.define_builtin(0, name(6));
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.resolve(name(5)).unwrap(), global);
        assert_eq!(table.resolve(name(6)).unwrap(), builtin);
    }

    #[test]
    fn unresolved_name_is_none() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        assert_eq!(table.resolve(name(999)), None);
    }
}

//! Lexical scope stack.
//!
//! A [`ScopeStack`] is a stack of [`Rib`]s, each one a flat symbol table
//! for one lexical region (module, function body, block, loop body).
//! Resolution walks outward from the current rib to its parent until a
//! binding is found or the chain runs out — the usual shadowing rule:
//! the innermost binding for a name wins.

use aspenc_util::{Idx, IndexVec, Symbol};
use std::collections::HashMap;

use crate::registry::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RibId(pub u32);

impl Idx for RibId {
    fn from_usize(idx: usize) -> Self {
        RibId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Loop label, interned the same way any other identifier is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub Symbol);

#[derive(Debug)]
pub struct Rib {
    pub bindings: HashMap<Symbol, SymbolId>,
    pub parent: Option<RibId>,
    pub kind: RibKind,
}

#[derive(Debug, Clone, Copy)]
pub enum RibKind {
    Module,
    /// A class/struct/enum/protocol/extension body: `self` and its
    /// members are visible without qualification.
    TypeBody,
    Function { mutating: bool },
    Block,
    Loop(Option<LabelId>),
}

pub struct ScopeStack {
    ribs: IndexVec<RibId, Rib>,
    current: RibId,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut ribs = IndexVec::new();
        let root = ribs.push(Rib { bindings: HashMap::new(), parent: None, kind: RibKind::Module });
        Self { ribs, current: root }
    }

    pub fn enter_scope(&mut self, kind: RibKind) -> RibId {
        let rib = self.ribs.push(Rib {
            bindings: HashMap::new(),
            parent: Some(self.current),
            kind,
        });
        self.current = rib;
        rib
    }

    /// Pop back to the parent of the current rib. A no-op at the module
    /// root, where there is no parent to return to.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.ribs[self.current].parent {
            self.current = parent;
        }
    }

    pub fn current_rib(&self) -> RibId {
        self.current
    }

    pub fn kind(&self, rib: RibId) -> RibKind {
        self.ribs[rib].kind
    }

    pub fn add_binding(&mut self, name: Symbol, symbol: SymbolId) {
        self.ribs[self.current].bindings.insert(name, symbol);
    }

    /// Look up a name starting at the current rib and walking out to the
    /// module root.
    pub fn resolve(&self, name: Symbol) -> Option<SymbolId> {
        let mut rib_id = self.current;
        loop {
            let rib = &self.ribs[rib_id];
            if let Some(&symbol) = rib.bindings.get(&name) {
                return Some(symbol);
            }
            match rib.parent {
                Some(parent) => rib_id = parent,
                None => return None,
            }
        }
    }

    /// Look up a name only within the current rib, without walking to
    /// parents — used to detect a duplicate definition within one scope
    /// rather than legitimate shadowing of an outer one.
    pub fn resolve_local(&self, name: Symbol) -> Option<SymbolId> {
        self.ribs[self.current].bindings.get(&name).copied()
    }

    /// The nearest enclosing loop rib, for `break`/`continue` validation;
    /// `label` narrows the search to a loop carrying that label.
    pub fn enclosing_loop(&self, label: Option<LabelId>) -> Option<RibId> {
        let mut rib_id = self.current;
        loop {
            if let RibKind::Loop(loop_label) = self.ribs[rib_id].kind {
                match label {
                    None => return Some(rib_id),
                    Some(wanted) => {
                        if loop_label == Some(wanted) {
                            return Some(rib_id);
                        }
                    }
                }
            }
            match self.ribs[rib_id].parent {
                Some(parent) => rib_id = parent,
                None => return None,
            }
        }
    }

    /// Whether the current rib or an enclosing function rib is a
    /// `mutating` method, for self-mutation validation inside structs.
    pub fn in_mutating_context(&self) -> bool {
        let mut rib_id = self.current;
        loop {
            if let RibKind::Function { mutating } = self.ribs[rib_id].kind {
                return mutating;
            }
            match self.ribs[rib_id].parent {
                Some(parent) => rib_id = parent,
                None => return false,
            }
        }
    }
}

//! Symbol registry: one entry per named declaration, keyed by [`SymbolId`].
//!
//! The registry is where a declaration lives once it has been given
//! identity but possibly before its type is fully known — a function
//! registered in pass 1 of the analyzer (§4.6) carries a [`Type::Placeholder`]
//! until pass 2 resolves its signature. Registering it under that
//! placeholder rather than deferring registration entirely is what lets
//! mutually recursive declarations (two functions that call each other)
//! resolve at all: by the time either body is checked, both names are
//! already bound, just not yet fully typed.

use aspenc_ast::NodeId;
use aspenc_util::{DefId, Idx, IndexVec, Symbol};
use std::collections::HashMap;

use crate::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl Idx for SymbolId {
    fn from_usize(idx: usize) -> Self {
        SymbolId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable { mutable: bool },
    Parameter,
    Type,
    EnumCase,
    ComputedProperty,
}

/// A symbol's resolution state. `Lazy` entries exist so pass 1 can bind a
/// name before pass 2 has visited the declaration body that would give it
/// a real type; `Resolved` entries carry that type once known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Lazy,
    Resolved(TypeId),
}

/// Per-symbol attribute bits (§4.6 step 5) that don't belong on `SymbolKind`
/// because they cut across it — a `Parameter` and a `Variable` can both be
/// `Writable`, a `Variable` and a `ComputedProperty` can both be `Lazy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SymbolFlags(pub u32);

impl SymbolFlags {
    pub const NONE: Self = Self(0);
    pub const READABLE: Self = Self(0x1);
    pub const WRITABLE: Self = Self(0x2);
    pub const MEMBER: Self = Self(0x4);
    pub const STATIC: Self = Self(0x8);
    pub const LAZY: Self = Self(0x10);
    pub const NONMUTATING: Self = Self(0x20);
    pub const STORED_PROPERTY: Self = Self(0x40);
    pub const INITIALIZING: Self = Self(0x80);
    pub const HAS_INITIALIZER: Self = Self(0x100);
    pub const TEMPORARY: Self = Self(0x200);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for SymbolFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What kind of value binding a `PlaceHolder`-style symbol came from. Only
/// meaningful for `SymbolKind::Variable`/`SymbolKind::Parameter` entries;
/// `None` for functions, types, and enum cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    LocalVariable,
    Property,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub def_id: DefId,
    pub node: NodeId,
    pub kind: SymbolKind,
    pub resolution: Resolution,
    pub flags: SymbolFlags,
    pub role: Option<Role>,
}

/// What registering a name under an already-occupied slot in the same
/// scope produced.
pub enum RegisterOutcome {
    /// A fresh binding; no prior symbol of this name was visible locally.
    Fresh(SymbolId),
    /// The new declaration was folded into an existing overload set (or
    /// started one) because both the existing and the new symbol are
    /// functions. The id returned is the set's representative id — the
    /// first function symbol registered under this name.
    JoinedOverloadSet(SymbolId),
    /// The name already denotes a non-function symbol in this scope, or a
    /// function collides with a non-function: the caller should emit a
    /// duplicate-definition diagnostic naming `existing`.
    Conflict { existing: SymbolId },
}

pub struct SymbolRegistry {
    entries: IndexVec<SymbolId, SymbolEntry>,
    /// Overload sets, keyed by the representative `SymbolId` of the first
    /// function registered under a name. A name with only one function
    /// registered never appears here — promotion only happens on the
    /// second colliding `Function` registration.
    overload_sets: HashMap<SymbolId, Vec<SymbolId>>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self { entries: IndexVec::new(), overload_sets: HashMap::new() }
    }

    pub fn get(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut SymbolEntry {
        &mut self.entries[id]
    }

    pub fn resolve_type(&mut self, id: SymbolId, ty: TypeId) {
        self.entries[id].resolution = Resolution::Resolved(ty);
    }

    /// Every member of the overload set rooted at `representative`,
    /// including the representative itself. Empty iterator if
    /// `representative` isn't actually an overload set root (the common
    /// case: a name with exactly one function).
    pub fn overload_members(&self, representative: SymbolId) -> &[SymbolId] {
        self.overload_sets.get(&representative).map(Vec::as_slice).unwrap_or(&[])
    }

    fn insert(&mut self, name: Symbol, def_id: DefId, node: NodeId, kind: SymbolKind) -> SymbolId {
        self.entries.push(SymbolEntry {
            name,
            def_id,
            node,
            kind,
            resolution: Resolution::Lazy,
            flags: SymbolFlags::NONE,
            role: None,
        })
    }

    /// Attach attribute flags to an already-registered symbol. Additive:
    /// ORs into whatever was already set rather than replacing it, so
    /// callers can set `MEMBER` at registration time and `HAS_INITIALIZER`
    /// later once the initializer is seen.
    pub fn add_flags(&mut self, id: SymbolId, flags: SymbolFlags) {
        self.entries[id].flags.insert(flags);
    }

    pub fn set_role(&mut self, id: SymbolId, role: Role) {
        self.entries[id].role = Some(role);
    }

    /// Register `name` freshly allocated in the current scope. Callers
    /// that need overload-aware registration against an existing local
    /// binding should use [`Self::register_with_collision`] instead; this
    /// is for the common case of no local binding to collide with.
    pub fn register(&mut self, name: Symbol, def_id: DefId, node: NodeId, kind: SymbolKind) -> SymbolId {
        self.insert(name, def_id, node, kind)
    }

    /// Register `name`, given the `SymbolId` (if any) already bound to it
    /// in the current scope. Two `Function` symbols colliding join (or
    /// start) an overload set; anything else colliding is a conflict the
    /// caller must diagnose.
    pub fn register_with_collision(
        &mut self,
        name: Symbol,
        def_id: DefId,
        node: NodeId,
        kind: SymbolKind,
        existing: Option<SymbolId>,
    ) -> RegisterOutcome {
        let new_id = self.insert(name, def_id, node, kind);
        let Some(existing) = existing else {
            return RegisterOutcome::Fresh(new_id);
        };

        let existing_is_function = self.entries[existing].kind == SymbolKind::Function
            || self.overload_sets.contains_key(&existing);
        if kind != SymbolKind::Function || !existing_is_function {
            return RegisterOutcome::Conflict { existing };
        }

        self.overload_sets.entry(existing).or_insert_with(|| vec![existing]).push(new_id);
        RegisterOutcome::JoinedOverloadSet(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspenc_ast::NodeId as AstNodeId;
    use aspenc_util::Idx;

    fn node(n: u32) -> AstNodeId {
        AstNodeId::from_usize(n as usize)
    }

    #[test]
    fn second_function_with_same_name_joins_overload_set() {
        let mut reg = SymbolRegistry::new();
        let name = Symbol::intern("f");
        let first = reg.register(name, DefId(0), node(0), SymbolKind::Function);

        match reg.register_with_collision(name, DefId(1), node(1), SymbolKind::Function, Some(first)) {
            RegisterOutcome::JoinedOverloadSet(rep) => {
                assert_eq!(rep, first);
                assert_eq!(reg.overload_members(rep).len(), 2);
            }
            _ => panic!("expected an overload set"),
        }
    }

    #[test]
    fn variable_colliding_with_variable_is_a_conflict() {
        let mut reg = SymbolRegistry::new();
        let name = Symbol::intern("x");
        let first = reg.register(name, DefId(0), node(0), SymbolKind::Variable { mutable: false });

        match reg.register_with_collision(
            name,
            DefId(1),
            node(1),
            SymbolKind::Variable { mutable: false },
            Some(first),
        ) {
            RegisterOutcome::Conflict { existing } => assert_eq!(existing, first),
            _ => panic!("expected a conflict"),
        }
    }

    /// EDGE CASE: a function colliding with a non-function of the same
    /// name is a conflict, not an overload set of size one.
    #[test]
    fn test_edge_function_colliding_with_variable_is_a_conflict() {
        let mut reg = SymbolRegistry::new();
        let name = Symbol::intern("x");
        let first = reg.register(name, DefId(0), node(0), SymbolKind::Variable { mutable: false });

        match reg.register_with_collision(name, DefId(1), node(1), SymbolKind::Function, Some(first)) {
            RegisterOutcome::Conflict { existing } => assert_eq!(existing, first),
            _ => panic!("expected a conflict"),
        }
    }
}

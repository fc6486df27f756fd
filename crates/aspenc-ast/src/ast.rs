//! Core tree node model: arena, node identity, and the default traversal.
//!
//! This crate does not parse anything. It defines the contract an upstream
//! parser and a downstream semantic analyzer agree on: a closed set of node
//! kinds, owned by index rather than by reference-counted pointer.

use aspenc_util::{define_idx, Idx, IndexVec};

use crate::expr::Expr;
use crate::items::{Decl, Parameter, Parameters};
use crate::pattern::Pattern;
use crate::stmt::{CodeBlock, Stmt};
use crate::types::TypeExpr;

define_idx!(NodeId);

/// Source position carried by every node. `file_hash` identifies the
/// originating file without pinning this crate to any particular path or
/// interning scheme upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceInfo {
    pub file_hash: u32,
    pub line: u32,
    pub column: u32,
}

impl SourceInfo {
    pub const DUMMY: SourceInfo = SourceInfo { file_hash: 0, line: 0, column: 0 };

    pub fn new(file_hash: u32, line: u32, column: u32) -> Self {
        Self { file_hash, line, column }
    }
}

/// The closed set of tree node kinds (§3.1).
///
/// A `Node` is `NodeKind` plus its `SourceInfo`; the kind itself is split
/// across five sub-enums (`Decl`, `Stmt`, `Expr`, `TypeExpr`, `Pattern`)
/// grouped by the grammatical category they belong to, plus the two
/// structural kinds (`Program`, `CodeBlock`) that own a sequence of other
/// nodes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Program(Vec<NodeId>),
    CodeBlock(CodeBlock),
    Decl(Decl),
    Stmt(Stmt),
    Expr(Expr),
    TypeExpr(TypeExpr),
    Pattern(Pattern),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub info: SourceInfo,
}

impl Node {
    pub fn new(kind: NodeKind, info: SourceInfo) -> Self {
        Self { kind, info }
    }
}

/// Owns the node arena for one compilation unit.
///
/// Nodes cite each other by `NodeId`; there is no reference counting and no
/// parent pointer. A `Program` is itself node 0's worth of bookkeeping: the
/// root node lives in the arena like everything else, referenced by
/// [`Program::root`].
#[derive(Debug, Clone, Default)]
pub struct Program {
    arena: IndexVec<NodeId, Node>,
    root: Option<NodeId>,
}

impl Program {
    pub fn new() -> Self {
        Self { arena: IndexVec::new(), root: None }
    }

    /// Insert a node into the arena, returning its id.
    pub fn alloc(&mut self, kind: NodeKind, info: SourceInfo) -> NodeId {
        self.arena.push(Node::new(kind, info))
    }

    /// Allocate the `Program` root node itself, given the top-level
    /// declaration ids that have already been allocated.
    pub fn set_root(&mut self, top_level: Vec<NodeId>, info: SourceInfo) -> NodeId {
        let id = self.alloc(NodeKind::Program(top_level), info);
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Default traversal order for a node (§4.1): the fixed, documented
    /// child order that every semantic pass relies on for deterministic
    /// diagnostic emission and resolution order. This is a plain recursive
    /// match over `NodeKind`, not a double-dispatch visitor: there is one
    /// function, not one method per kind.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.get(id).kind {
            NodeKind::Program(items) => items.clone(),
            NodeKind::CodeBlock(block) => block.statements.clone(),
            NodeKind::Decl(decl) => decl.children(),
            NodeKind::Stmt(stmt) => stmt.children(),
            NodeKind::Expr(expr) => expr.children(),
            NodeKind::TypeExpr(ty) => ty.children(),
            NodeKind::Pattern(pat) => pat.children(),
        }
    }

    /// Walk the tree in default-traversal pre-order, calling `visit` at
    /// every node. Passes that need post-order behavior recurse manually
    /// instead of relying on this helper.
    pub fn walk_preorder(&self, id: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(id);
        for child in self.children(id) {
            self.walk_preorder(child, visit);
        }
    }
}

/// Declaration modifiers (§3.5), bit-for-bit matching the upstream
/// compiler's modifier encoding so that fixtures and the constants named in
/// diagnostics agree on the same bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DeclModifiers(pub u32);

impl DeclModifiers {
    pub const NONE: Self = Self(0);
    pub const CLASS: Self = Self(0x1);
    pub const CONVENIENCE: Self = Self(0x2);
    pub const DYNAMIC: Self = Self(0x4);
    pub const FINAL: Self = Self(0x8);
    pub const INFIX: Self = Self(0x10);
    pub const LAZY: Self = Self(0x20);
    pub const MUTATING: Self = Self(0x40);
    pub const NONMUTATING: Self = Self(0x80);
    pub const OPTIONAL: Self = Self(0x100);
    pub const OVERRIDE: Self = Self(0x200);
    pub const POSTFIX: Self = Self(0x400);
    pub const PREFIX: Self = Self(0x800);
    pub const REQUIRED: Self = Self(0x1000);
    pub const STATIC: Self = Self(0x2000);
    pub const UNOWNED: Self = Self(0x4000);
    pub const UNOWNED_SAFE: Self = Self(0x4000 | 0x8000);
    pub const UNOWNED_UNSAFE: Self = Self(0x4000 | 0x10000);
    pub const WEAK: Self = Self(0x20000);
    pub const INTERNAL: Self = Self(0x40000);
    pub const INTERNAL_SET: Self = Self(0x40000 | 0x80000);
    pub const PRIVATE: Self = Self(0x100000);
    pub const PRIVATE_SET: Self = Self(0x100000 | 0x200000);
    pub const PUBLIC: Self = Self(0x400000);
    pub const PUBLIC_SET: Self = Self(0x400000 | 0x800000);
    pub const GENERATED: Self = Self(0x1000000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DeclModifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for DeclModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

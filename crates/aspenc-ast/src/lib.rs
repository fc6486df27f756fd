//! aspenc-ast - AST Node Model (Arena-Owned Tree)
//!
//! ============================================================================
//! NODE MODEL THEORY
//! ============================================================================
//!
//! An upstream parser and a downstream semantic analyzer need to agree on
//! exactly one thing: the shape of the tree between them. This crate is
//! that contract. It does not parse source text and does not type-check
//! anything; it owns a closed set of node kinds and the arena they live in.
//!
//! OWNERSHIP MODEL:
//! -----------------
//! Every node is allocated once into a [`Program`]'s arena and referenced
//! everywhere else by [`NodeId`], a typed index. There is no parent
//! pointer and no reference counting: a node cannot observe who points to
//! it, and the tree cannot form a cycle by construction (an id can only
//! reference a node already allocated, since [`Program::alloc`] hands back
//! ids in allocation order).
//!
//! This is the idiomatic Rust answer to a tree shape that, in a
//! garbage-collected or reference-counted host language, would use shared
//! pointers for parent/child/sibling links. Indices into a single arena
//! give the same graph flexibility (a node can be referenced from more
//! than one place — an overload set member and the declaration it recurs
//! to, for instance) without the cycle and aliasing hazards shared
//! ownership brings.
//!
//! DEFAULT TRAVERSAL:
//! -------------------
//! [`Program::children`] defines one deterministic child order per node
//! kind. Passes that need to visit every node (name resolution, type
//! checking) walk this order rather than inventing their own; passes that
//! need a different order (post-order operator precedence rotation, for
//! instance) recurse by hand instead of fighting the default.
//!
//! The five grammatical sub-enums — [`items::Decl`], [`stmt::Stmt`],
//! [`expr::Expr`], [`types::TypeExpr`], [`pattern::Pattern`] — are matched
//! explicitly rather than dispatched through a visitor trait. A `match`
//! over a closed enum gives the compiler exhaustiveness checking for free;
//! a visitor with one method per node kind does not, and adding a node
//! kind to a visitor-based tree silently compiles with the default (often
//! wrong) behavior at every existing visit site.

pub mod ast;
pub mod expr;
pub mod items;
pub mod pattern;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod edge_cases;

pub use ast::{DeclModifiers, Node, NodeId, NodeKind, Program, SourceInfo};
pub use expr::Expr;
pub use items::{Decl, GenericDefinition, GenericParam, Parameter, Parameters};
pub use pattern::Pattern;
pub use stmt::{CodeBlock, Stmt};
pub use types::TypeExpr;

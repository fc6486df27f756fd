//! Semantic analysis core: type resolution, the symbol registry and scope
//! stack, and the two-pass semantic analyzer that drives them over a parsed
//! [`aspenc_ast::Program`].
//!
//! The crate is organized around three collaborating pieces:
//!
//! - [`types`] — the canonical, interned [`types::Type`] representation and
//!   its generic-specialization cache.
//! - [`registry`] and [`scope`] — identity registration (what a name refers
//!   to) kept separate from lexical visibility (where a name is in scope).
//! - [`resolver`] and [`operator`] — turn AST type/operator syntax into the
//!   canonical forms the analyzer checks against.
//!
//! [`analysis::SemanticAnalyzer`] ties these together: pass one walks every
//! top-level declaration registering names and signatures, pass two resolves
//! types, checks control flow, and validates mutation rules against the
//! scope and symbol state pass one built.

pub mod analysis;
pub mod diagnostics;
pub mod error;
pub mod operator;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod types;

#[cfg(test)]
mod edge_cases;
#[cfg(test)]
mod property;

pub use analysis::{AnalyzerConfig, SelfOwnerKind, SemanticAnalyzer};
pub use error::{SemaError, SemaResult};
pub use operator::{Associativity, OperatorResolver, OperatorTable};
pub use registry::{
    RegisterOutcome, Resolution, Role, SymbolEntry, SymbolFlags, SymbolId, SymbolKind, SymbolRegistry,
};
pub use resolver::{TypeDeclSignature, TypeResolver};
pub use scope::{LabelId, Rib, RibId, RibKind, ScopeStack};
pub use types::{InferId, Type, TypeId, TypeRegistry};

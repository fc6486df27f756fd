//! aspenc-util - Core Utilities and Foundation Types
//!
//! Foundation types shared by every stage of the semantic analysis core:
//! interned identifiers ([`Symbol`]), typed arena indices ([`IndexVec`]),
//! source locations ([`Span`]), definition identifiers ([`DefId`]), and
//! the diagnostic model ([`diagnostic`]).
//!
//! These are zero-cost abstractions: a [`Symbol`] is a 4-byte handle, an
//! [`IndexVec`] is the same size as `Vec<T>`, and index types generated by
//! [`define_idx`] are newtype wrappers around `u32`.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use error::{
    DiagnosticError, DiagnosticResult, IndexVecError, IndexVecResult, SourceMapError,
    SourceMapResult, SymbolError, SymbolResult,
};
pub use index_vec::{define_idx, Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};

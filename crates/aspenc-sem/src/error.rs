//! Internal-invariant failures (diagnostic band 4): conditions that mean a
//! prior pass produced a malformed tree, not that the user's program is
//! wrong. These never reach the user as a diagnostic; they're a bug in
//! this crate or its upstream parser, surfaced as a `Result::Err` so the
//! driver can report it distinctly from a normal compile failure.

use aspenc_ast::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemaError {
    #[error("generic specialization of {template:?} did not terminate within the configured depth limit")]
    CyclicSpecialization { template: aspenc_util::DefId },

    #[error("node {node:?} had an unexpected shape for this pass: {expected}")]
    MalformedNode { node: NodeId, expected: &'static str },

    #[error("specialization cache miss resolving {node:?}, which should have been registered in pass 1")]
    SpecializationCacheMiss { node: NodeId },

    #[error("symbol {0:?} was referenced before being registered")]
    UnregisteredSymbol(crate::registry::SymbolId),

    #[error("node {0:?} is out of range for this program's arena")]
    NodeOutOfRange(NodeId),
}

pub type SemaResult<T> = Result<T, SemaError>;

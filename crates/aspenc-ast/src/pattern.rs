//! Pattern node payloads.

use aspenc_util::Symbol;

use crate::ast::NodeId;

#[derive(Debug, Clone)]
pub enum Pattern {
    TypedPattern(TypedPattern),
    LetPattern(LetPattern),
    VarPattern(VarPattern),
    EnumCasePattern(EnumCasePattern),
    ValueBindingPattern(ValueBindingPattern),
    TuplePattern(TuplePattern),
}

impl Pattern {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Pattern::TypedPattern(p) => {
                let mut c = vec![p.pattern];
                c.extend(p.declared_type);
                c
            }
            Pattern::LetPattern(p) => vec![p.inner],
            Pattern::VarPattern(p) => vec![p.inner],
            Pattern::EnumCasePattern(p) => p.associated_values.clone(),
            Pattern::ValueBindingPattern(p) => vec![p.pattern],
            Pattern::TuplePattern(p) => p.elements.clone(),
        }
    }
}

/// A pattern annotated with an explicit declared type (`x: Int`).
#[derive(Debug, Clone)]
pub struct TypedPattern {
    pub pattern: NodeId,
    pub declared_type: Option<NodeId>,
}

/// `let` binding inside a pattern (e.g. a case-let in a switch pattern).
#[derive(Debug, Clone)]
pub struct LetPattern {
    pub inner: NodeId,
}

/// `var` binding inside a pattern.
#[derive(Debug, Clone)]
pub struct VarPattern {
    pub inner: NodeId,
}

/// `.case(a, b)` destructuring pattern matched against an enum case.
#[derive(Debug, Clone)]
pub struct EnumCasePattern {
    pub case_name: Symbol,
    pub associated_values: Vec<NodeId>,
}

/// A single leaf identifier a tuple-explosion pass may rewrite into a
/// `MemberAccess` off a synthesized temporary.
#[derive(Debug, Clone)]
pub struct ValueBindingPattern {
    pub name: Symbol,
    pub pattern: NodeId,
}

/// `(x, y)` in `let (x, y) = ...` — the pre-explosion shape a tuple
/// binding pattern has before the analyzer rewrites it into a
/// [`crate::items::ValueBindingsGroup`] of single-identifier leaves.
#[derive(Debug, Clone, Default)]
pub struct TuplePattern {
    pub elements: Vec<NodeId>,
}

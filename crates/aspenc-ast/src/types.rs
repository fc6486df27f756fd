//! Type expression node payloads.

use aspenc_util::Symbol;

use crate::ast::NodeId;

#[derive(Debug, Clone)]
pub enum TypeExpr {
    TypeIdentifier(TypeIdentifier),
    TupleType(TupleType),
    ArrayType(ArrayType),
    DictionaryType(DictionaryType),
    OptionalType(OptionalType),
    ImplicitlyUnwrappedOptional(ImplicitlyUnwrappedOptionalType),
    FunctionType(FunctionType),
    ProtocolComposition(ProtocolComposition),
}

impl TypeExpr {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            TypeExpr::TypeIdentifier(t) => t.generic_arguments.clone(),
            TypeExpr::TupleType(t) => t.elements.clone(),
            TypeExpr::ArrayType(t) => vec![t.element],
            TypeExpr::DictionaryType(t) => vec![t.key, t.value],
            TypeExpr::OptionalType(t) => vec![t.wrapped],
            TypeExpr::ImplicitlyUnwrappedOptional(t) => vec![t.wrapped],
            TypeExpr::FunctionType(t) => {
                let mut c = t.parameters.clone();
                c.push(t.return_type);
                c
            }
            TypeExpr::ProtocolComposition(t) => t.members.clone(),
        }
    }
}

/// A named type reference, generic arguments supplied in source order
/// (`Dictionary<String, Int>`).
#[derive(Debug, Clone)]
pub struct TypeIdentifier {
    pub name: Symbol,
    pub generic_arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct TupleType {
    pub elements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub element: NodeId,
}

#[derive(Debug, Clone)]
pub struct DictionaryType {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone)]
pub struct OptionalType {
    pub wrapped: NodeId,
}

#[derive(Debug, Clone)]
pub struct ImplicitlyUnwrappedOptionalType {
    pub wrapped: NodeId,
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub parameters: Vec<NodeId>,
    pub return_type: NodeId,
}

/// `A & B & C` — the set of protocols a conforming type must satisfy
/// simultaneously.
#[derive(Debug, Clone, Default)]
pub struct ProtocolComposition {
    pub members: Vec<NodeId>,
}

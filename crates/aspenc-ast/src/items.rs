//! Declaration node payloads: types, functions, value bindings, imports.

use aspenc_util::Symbol;

use crate::ast::{DeclModifiers, NodeId};

/// A generic parameter name plus its constraint, if any (a protocol or
/// concrete type bound via `:`, or a same-type requirement from a `where`
/// clause folded in at registration time).
#[derive(Debug, Clone)]
pub struct GenericParam {
    pub name: Symbol,
    pub constraint: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct GenericDefinition {
    pub params: Vec<GenericParam>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Class(ClassDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Protocol(ProtocolDecl),
    Extension(ExtensionDecl),
    Function(FunctionDecl),
    Subscript(SubscriptDecl),
    Init(InitDecl),
    Deinit(DeinitDecl),
    TypeAlias(TypeAliasDecl),
    Operator(OperatorDecl),
    Import(ImportDecl),
    Variable(ValueBindingDecl),
    Constant(ValueBindingDecl),
    ValueBinding(ValueBindingLeaf),
    ValueBindings(ValueBindingsGroup),
    Parameter(Parameter),
    Parameters(Parameters),
    ComputedProperty(ComputedPropertyDecl),
}

impl Decl {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Decl::Class(d) => d.members.clone(),
            Decl::Struct(d) => d.members.clone(),
            Decl::Enum(d) => {
                let mut c = d.cases.clone();
                c.extend(d.members.iter().copied());
                c
            }
            Decl::Protocol(d) => d.members.clone(),
            Decl::Extension(d) => d.members.clone(),
            Decl::Function(d) => {
                let mut c = vec![d.parameters];
                c.extend(d.return_type);
                c.extend(d.body);
                c
            }
            Decl::Subscript(d) => {
                let mut c = vec![d.parameters];
                c.push(d.element_type);
                c.extend(d.getter);
                c.extend(d.setter);
                c
            }
            Decl::Init(d) => {
                vec![d.parameters, d.body]
            }
            Decl::Deinit(d) => vec![d.body],
            Decl::TypeAlias(d) => vec![d.aliased_type],
            Decl::Operator(_) => vec![],
            Decl::Import(_) => vec![],
            Decl::Variable(d) | Decl::Constant(d) => d.bindings.clone(),
            Decl::ValueBinding(leaf) => {
                let mut c = vec![leaf.pattern];
                c.extend(leaf.declared_type);
                c.extend(leaf.initializer);
                c
            }
            Decl::ValueBindings(group) => {
                let mut c = vec![];
                c.extend(group.temporary);
                c.extend(group.leaves.iter().copied());
                c
            }
            Decl::Parameter(p) => {
                let mut c = vec![p.declared_type];
                c.extend(p.default_value);
                c
            }
            Decl::Parameters(ps) => ps.params.clone(),
            Decl::ComputedProperty(d) => {
                let mut c = vec![d.declared_type];
                c.extend(d.getter);
                c.extend(d.setter);
                c
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Symbol,
    pub generics: GenericDefinition,
    pub superclass: Option<NodeId>,
    pub conformances: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub generics: GenericDefinition,
    pub conformances: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: Symbol,
    pub generics: GenericDefinition,
    pub conformances: Vec<NodeId>,
    pub cases: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct EnumCase {
    pub name: Symbol,
    pub payload: Vec<NodeId>,
    pub raw_value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ProtocolDecl {
    pub name: Symbol,
    pub inherited: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct ExtensionDecl {
    pub extended_type: NodeId,
    pub conformances: Vec<NodeId>,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub generics: GenericDefinition,
    pub parameters: NodeId,
    pub return_type: Option<NodeId>,
    pub body: Option<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct SubscriptDecl {
    pub parameters: NodeId,
    pub element_type: NodeId,
    pub getter: Option<NodeId>,
    pub setter: Option<NodeId>,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone)]
pub struct InitDecl {
    pub parameters: NodeId,
    pub body: NodeId,
    pub modifiers: DeclModifiers,
    pub failable: bool,
}

#[derive(Debug, Clone)]
pub struct DeinitDecl {
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDecl {
    pub name: Symbol,
    pub generics: GenericDefinition,
    pub aliased_type: NodeId,
    pub modifiers: DeclModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    None,
}

#[derive(Debug, Clone)]
pub struct OperatorDecl {
    pub spelling: Symbol,
    pub fixity: Fixity,
    pub precedence: i32,
    pub associativity: Associativity,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: Vec<Symbol>,
}

/// Shared payload for `var`/`let` top-level declarations, which are a thin
/// wrapper over one or more bound leaves.
#[derive(Debug, Clone)]
pub struct ValueBindingDecl {
    pub bindings: Vec<NodeId>,
    pub modifiers: DeclModifiers,
}

/// A single-identifier binding leaf, the unit the tuple-explosion pass
/// (§4.6) produces and consumes.
#[derive(Debug, Clone)]
pub struct ValueBindingLeaf {
    pub pattern: NodeId,
    pub declared_type: Option<NodeId>,
    pub initializer: Option<NodeId>,
    pub modifiers: DeclModifiers,
}

/// A group of leaves sharing one pattern before (or after) explosion; once
/// `temporary` is set the group has been exploded and the temporary holds
/// the initializer the leaves index into.
#[derive(Debug, Clone)]
pub struct ValueBindingsGroup {
    pub temporary: Option<NodeId>,
    pub leaves: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub external_name: Option<Symbol>,
    pub internal_name: Symbol,
    pub declared_type: NodeId,
    pub default_value: Option<NodeId>,
    pub is_inout: bool,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Parameters {
    pub params: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ComputedPropertyDecl {
    pub name: Symbol,
    pub declared_type: NodeId,
    pub getter: Option<NodeId>,
    pub setter: Option<NodeId>,
    pub modifiers: DeclModifiers,
}

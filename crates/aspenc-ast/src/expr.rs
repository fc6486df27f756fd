//! Expression node payloads.

use aspenc_util::Symbol;

use crate::ast::NodeId;

#[derive(Debug, Clone)]
pub enum Expr {
    Identifier(Identifier),
    Integer(i64),
    Float(f64),
    StringLiteral(Symbol),
    StringInterpolation(StringInterpolation),
    ArrayLiteral(ArrayLiteral),
    DictionaryLiteral(DictionaryLiteral),
    Tuple(Tuple),
    ParenthesizedExpression(ParenthesizedExpression),
    MemberAccess(MemberAccess),
    SubscriptAccess(SubscriptAccess),
    FunctionCall(FunctionCall),
    Closure(Closure),
    SelfExpr,
    InitializerReference(InitializerReference),
    DynamicType(DynamicType),
    ForcedValue(ForcedValue),
    OptionalChaining(OptionalChaining),
    BinaryOperator(BinaryOperator),
    UnaryOperator(UnaryOperator),
    ConditionalOperator(ConditionalOperator),
    CompileConstant(CompileConstant),
}

impl Expr {
    /// Default traversal order (§4.1): operands in written order; a call
    /// visits callee, then arguments, then a trailing closure if present.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Expr::Identifier(_) => vec![],
            Expr::Integer(_) | Expr::Float(_) | Expr::StringLiteral(_) => vec![],
            Expr::StringInterpolation(e) => e.segments.clone(),
            Expr::ArrayLiteral(e) => e.elements.clone(),
            Expr::DictionaryLiteral(e) => {
                let mut c = vec![];
                for (k, v) in &e.entries {
                    c.push(*k);
                    c.push(*v);
                }
                c
            }
            Expr::Tuple(e) => e.elements.clone(),
            Expr::ParenthesizedExpression(e) => vec![e.inner],
            Expr::MemberAccess(e) => vec![e.base],
            Expr::SubscriptAccess(e) => {
                let mut c = vec![e.base];
                c.extend(e.arguments.iter().copied());
                c
            }
            Expr::FunctionCall(e) => {
                let mut c = vec![e.callee];
                c.extend(e.arguments.iter().copied());
                c.extend(e.trailing_closure);
                c
            }
            Expr::Closure(e) => {
                let mut c = e.parameters.clone();
                c.push(e.body);
                c
            }
            Expr::SelfExpr => vec![],
            Expr::InitializerReference(e) => vec![e.base],
            Expr::DynamicType(e) => vec![e.base],
            Expr::ForcedValue(e) => vec![e.base],
            Expr::OptionalChaining(e) => vec![e.base],
            Expr::BinaryOperator(e) => vec![e.lhs, e.rhs],
            Expr::UnaryOperator(e) => vec![e.operand],
            Expr::ConditionalOperator(e) => vec![e.condition, e.then_expr, e.else_expr],
            Expr::CompileConstant(_) => vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: Symbol,
}

#[derive(Debug, Clone, Default)]
pub struct StringInterpolation {
    pub segments: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayLiteral {
    pub elements: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct DictionaryLiteral {
    pub entries: Vec<(NodeId, NodeId)>,
}

#[derive(Debug, Clone, Default)]
pub struct Tuple {
    pub elements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ParenthesizedExpression {
    pub inner: NodeId,
}

#[derive(Debug, Clone)]
pub struct MemberAccess {
    pub base: NodeId,
    pub member: Symbol,
}

#[derive(Debug, Clone)]
pub struct SubscriptAccess {
    pub base: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub callee: NodeId,
    pub arguments: Vec<NodeId>,
    pub argument_labels: Vec<Option<Symbol>>,
    pub trailing_closure: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Closure {
    pub parameters: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct InitializerReference {
    pub base: NodeId,
}

/// `type(of: expr)`.
#[derive(Debug, Clone)]
pub struct DynamicType {
    pub base: NodeId,
}

/// `expr!`.
#[derive(Debug, Clone)]
pub struct ForcedValue {
    pub base: NodeId,
}

/// `expr?`.
#[derive(Debug, Clone)]
pub struct OptionalChaining {
    pub base: NodeId,
}

#[derive(Debug, Clone)]
pub struct BinaryOperator {
    pub op: Symbol,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryPosition {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone)]
pub struct UnaryOperator {
    pub op: Symbol,
    pub operand: NodeId,
    pub position: UnaryPosition,
}

#[derive(Debug, Clone)]
pub struct ConditionalOperator {
    pub condition: NodeId,
    pub then_expr: NodeId,
    pub else_expr: NodeId,
}

/// `#line`, `#file`, `#function`, `#column` and similar literals resolved
/// at the point of use rather than carrying a value from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileConstant {
    Line,
    File,
    Function,
    Column,
}

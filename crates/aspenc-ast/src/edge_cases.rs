//! Edge case tests for the node arena and default traversal.

use crate::ast::{DeclModifiers, NodeKind, Program, SourceInfo};
use crate::items::{Decl, FunctionDecl, GenericDefinition, Parameters};
use crate::pattern::Pattern;
use crate::stmt::{CodeBlock, Stmt, SwitchStmt};
use aspenc_util::Symbol;

/// EDGE CASE: an empty program has a root with zero children.
#[test]
fn test_edge_empty_program() {
    let mut program = Program::new();
    let root = program.set_root(vec![], SourceInfo::DUMMY);
    assert_eq!(program.children(root), Vec::new());
    assert_eq!(program.len(), 1);
}

/// EDGE CASE: a function with no body (protocol requirement, `@objc`
/// stub) still traverses its parameters and return type.
#[test]
fn test_edge_function_with_no_body() {
    let mut program = Program::new();
    let params = program.alloc(
        NodeKind::Decl(Decl::Parameters(Parameters::default())),
        SourceInfo::DUMMY,
    );
    let func = program.alloc(
        NodeKind::Decl(Decl::Function(FunctionDecl {
            name: Symbol::intern("f"),
            generics: GenericDefinition::default(),
            parameters: params,
            return_type: None,
            body: None,
            modifiers: DeclModifiers::REQUIRED,
        })),
        SourceInfo::DUMMY,
    );
    assert_eq!(program.children(func), vec![params]);
}

/// EDGE CASE: a switch with no default case still traverses every case in
/// order without a trailing placeholder id.
#[test]
fn test_edge_switch_without_default() {
    let mut program = Program::new();
    let leaf = program.alloc(NodeKind::CodeBlock(CodeBlock::default()), SourceInfo::DUMMY);
    let control = program.alloc(
        NodeKind::Pattern(Pattern::ValueBindingPattern(
            crate::pattern::ValueBindingPattern { name: Symbol::intern("x"), pattern: leaf },
        )),
        SourceInfo::DUMMY,
    );
    let switch = program.alloc(
        NodeKind::Stmt(Stmt::Switch(SwitchStmt {
            control_expr: control,
            cases: vec![],
            default_case: None,
        })),
        SourceInfo::DUMMY,
    );
    assert_eq!(program.children(switch), vec![control]);
}

/// EDGE CASE: an empty code block (`{}`) has no statement children.
#[test]
fn test_edge_empty_code_block() {
    let mut program = Program::new();
    let block = program.alloc(NodeKind::CodeBlock(CodeBlock::default()), SourceInfo::DUMMY);
    assert_eq!(program.children(block), Vec::new());
}

/// EDGE CASE: `DeclModifiers::NONE` contains nothing, including itself
/// trivially, but no other bit.
#[test]
fn test_edge_no_modifiers_contains_nothing_but_none() {
    let none = DeclModifiers::NONE;
    assert!(none.contains(DeclModifiers::NONE));
    assert!(!none.contains(DeclModifiers::PUBLIC));
    assert!(none.is_empty());
}

/// EDGE CASE: the combined `UNOWNED_SAFE` modifier contains the plain
/// `UNOWNED` bit it's built from.
#[test]
fn test_edge_unowned_safe_contains_unowned() {
    assert!(DeclModifiers::UNOWNED_SAFE.contains(DeclModifiers::UNOWNED));
    assert!(!DeclModifiers::UNOWNED_SAFE.contains(DeclModifiers::UNOWNED_UNSAFE));
}

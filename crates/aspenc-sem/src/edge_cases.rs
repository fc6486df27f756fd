//! Edge case tests that exercise the registry, scope stack and type
//! registry together, rather than in isolation as their own unit tests do.

use aspenc_ast::NodeId;
use aspenc_util::{DefId, Idx, Symbol};

use crate::registry::{RegisterOutcome, SymbolKind, SymbolRegistry};
use crate::scope::{RibKind, ScopeStack};
use crate::types::{Type, TypeRegistry};

fn node(n: u32) -> NodeId {
    NodeId::from_usize(n as usize)
}

/// EDGE CASE: a binding registered in an outer rib and then shadowed in an
/// inner one must resolve back to the outer symbol once the inner rib is
/// exited, with the registry itself never needing to know about scoping.
#[test]
fn test_edge_shadow_then_restore_across_registry_and_scope() {
    let mut symbols = SymbolRegistry::new();
    let mut scopes = ScopeStack::new();
    let name = Symbol::intern("x");

    let outer = symbols.register(name, DefId(0), node(0), SymbolKind::Variable { mutable: false });
    scopes.add_binding(name, outer);

    scopes.enter_scope(RibKind::Block);
    let inner = symbols.register(name, DefId(1), node(1), SymbolKind::Variable { mutable: true });
    scopes.add_binding(name, inner);

    assert_eq!(scopes.resolve(name), Some(inner));
    scopes.exit_scope();
    assert_eq!(scopes.resolve(name), Some(outer));
}

/// EDGE CASE: two functions registered in sibling scopes (not the same rib)
/// never join an overload set — joining only happens for a real local
/// collision the caller detected via `resolve_local`.
#[test]
fn test_edge_overload_set_requires_an_actual_local_collision() {
    let mut symbols = SymbolRegistry::new();
    let mut scopes = ScopeStack::new();
    let name = Symbol::intern("f");

    scopes.enter_scope(RibKind::Block);
    let a = symbols.register(name, DefId(0), node(0), SymbolKind::Function);
    scopes.add_binding(name, a);
    scopes.exit_scope();

    scopes.enter_scope(RibKind::Block);
    let existing = scopes.resolve_local(name);
    assert!(existing.is_none(), "sibling block must not see the other block's binding");
    let b = symbols.register(name, DefId(1), node(1), SymbolKind::Function);
    scopes.add_binding(name, b);

    assert!(symbols.overload_members(a).is_empty());
}

/// EDGE CASE: registering a second function against a real local collision
/// does join the set, and a third joins the same set rather than starting
/// a new one.
#[test]
fn test_edge_three_overloads_share_one_set() {
    let mut symbols = SymbolRegistry::new();
    let name = Symbol::intern("f");

    let first = symbols.register(name, DefId(0), node(0), SymbolKind::Function);
    let rep = match symbols.register_with_collision(name, DefId(1), node(1), SymbolKind::Function, Some(first)) {
        RegisterOutcome::JoinedOverloadSet(rep) => rep,
        _ => panic!("expected an overload set"),
    };
    match symbols.register_with_collision(name, DefId(2), node(2), SymbolKind::Function, Some(rep)) {
        RegisterOutcome::JoinedOverloadSet(rep2) => assert_eq!(rep2, rep),
        _ => panic!("expected the third function to join the same set"),
    }
    assert_eq!(symbols.overload_members(rep).len(), 3);
}

/// EDGE CASE: an empty tuple does NOT collapse to `Void` — `()` as a type
/// and `Void` are interned separately since nothing in the resolver treats
/// them as interchangeable.
#[test]
fn test_edge_empty_tuple_is_distinct_from_void() {
    let mut reg = TypeRegistry::new();
    let empty_tuple = reg.intern(Type::Tuple(vec![]));
    let void = reg.intern(Type::Void);
    assert_ne!(empty_tuple, void);
}

/// EDGE CASE: deeply nested optionals intern without blowing the stack and
/// two equally-deep chains built separately still collapse to one id.
#[test]
fn test_edge_deeply_nested_optional_interns_once() {
    let mut reg = TypeRegistry::new();

    let mut a = Type::Int;
    for _ in 0..64 {
        a = Type::Optional(Box::new(a));
    }
    let id_a = reg.intern(a);

    let mut b = Type::Int;
    for _ in 0..64 {
        b = Type::Optional(Box::new(b));
    }
    let id_b = reg.intern(b);

    assert_eq!(id_a, id_b);
}

/// EDGE CASE: a placeholder that is never bound resolves to itself rather
/// than panicking.
#[test]
fn test_edge_unbound_placeholder_resolves_to_itself() {
    let mut reg = TypeRegistry::new();
    let p = reg.new_placeholder();
    assert_eq!(reg.resolve(p), p);
}

/// EDGE CASE: `Dictionary<K, V>` with distinct key/value types is not
/// mistaken for `Dictionary<V, K>` — argument order is load-bearing.
#[test]
fn test_edge_dictionary_argument_order_is_significant() {
    let mut reg = TypeRegistry::new();
    let int_ty = reg.intern(Type::Int);
    let string_ty = reg.intern(Type::String);
    let a = reg.intern(Type::Dictionary(Box::new(Type::Int), Box::new(Type::String)));
    let b = reg.intern(Type::Dictionary(Box::new(Type::String), Box::new(Type::Int)));
    assert_ne!(a, b);
    let _ = (int_ty, string_ty);
}

/// EDGE CASE: a function type with no parameters is distinct from one
/// taking a single `Void` parameter.
#[test]
fn test_edge_nullary_function_distinct_from_void_parameter() {
    let mut reg = TypeRegistry::new();
    let nullary = reg.intern(Type::Function(vec![], Box::new(Type::Bool)));
    let unary_void = reg.intern(Type::Function(vec![Type::Void], Box::new(Type::Bool)));
    assert_ne!(nullary, unary_void);
}

/// EDGE CASE: `Error` and `Never` both count as bottom types for unifier
/// purposes, but remain distinct, non-equal `Type` values.
#[test]
fn test_edge_error_and_never_are_both_bottom_but_not_equal() {
    assert!(Type::Error.is_bottom());
    assert!(Type::Never.is_bottom());
    assert_ne!(Type::Error, Type::Never);
}

//! Canonical type representation and the specialization cache.
//!
//! A [`Type`] is either a primitive, a structural compound (tuple, array,
//! dictionary, function, optional, protocol composition), or a reference to
//! a nominal declaration (`Adt`) possibly applied to generic arguments
//! (`Specialized`). Two structurally identical `Type` values are `==`
//! regardless of which expression produced them: canonicalization happens
//! once, in [`TypeRegistry::intern`], not at every comparison site.

use aspenc_util::{DefId, Idx, IndexVec};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl Idx for TypeId {
    fn from_usize(idx: usize) -> Self {
        TypeId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type inference/placeholder variable id, distinct from [`TypeId`] so a
/// half-resolved contextual type can never be mistaken for a canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InferId(pub u32);

impl Idx for InferId {
    fn from_usize(idx: usize) -> Self {
        InferId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The canonical type representation (§3 of the type model).
///
/// `Adt` and `Specialized` carry a [`DefId`] rather than inlining the
/// declaration's members: looking a member up means resolving the `DefId`
/// through the symbol registry, which keeps a `Type` cheap to clone and
/// keeps recursive declarations (`class Node { var next: Node? }`) from
/// requiring an infinitely deep value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Error,
    Void,
    Never,
    Bool,
    Int,
    Double,
    String,
    /// A non-generic nominal type: a class, struct, enum, or protocol.
    Adt(DefId),
    /// A generic nominal type applied to a fixed argument vector, in
    /// declaration order. `Specialized(d, [])` never occurs; an
    /// unapplied generic definition is referred to by `Adt(d)` with its
    /// own parameters still free, used only while resolving the generic
    /// definition itself.
    Specialized(DefId, Vec<Type>),
    /// A reference to one of the enclosing generic definition's own type
    /// parameters, by position. Stands for "whatever type argument N was
    /// bound to" until specialization substitutes it away.
    GenericParam(u32),
    Tuple(Vec<Type>),
    Array(Box<Type>),
    Dictionary(Box<Type>, Box<Type>),
    Optional(Box<Type>),
    ImplicitlyUnwrappedOptional(Box<Type>),
    Function(Vec<Type>, Box<Type>),
    /// `A & B & C`: a closed, order-independent set of protocols a
    /// conforming type must satisfy simultaneously. Stored sorted by
    /// `DefId` so two compositions naming the same protocols in a
    /// different order canonicalize to the same `Type`.
    ProtocolComposition(Vec<DefId>),
    /// Not yet resolved; carries the variable the resolver will bind a
    /// concrete type into once enough context is available (a literal's
    /// contextual type, an unannotated closure parameter).
    Placeholder(InferId),
}

impl Type {
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Type::Placeholder(_))
    }

    /// Whether a value of this type is guaranteed to diverge or is already
    /// an error sentinel — both act as a universal unifier downstream so a
    /// single cascading failure doesn't produce a diagnostic at every use
    /// site.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Type::Error | Type::Never)
    }
}

fn normalize_protocol_composition(mut members: Vec<DefId>) -> Vec<DefId> {
    members.sort_by_key(|d| d.0);
    members.dedup();
    members
}

/// Interns [`Type`] values and owns the generic specialization cache.
///
/// Specialization is memoized by `(template, arguments)` so that asking
/// for `List<Int>` twice returns the same `TypeId` both times, and so that
/// a generic definition that recursively mentions itself
/// (`class Box<T> { var next: Box<T>? }`) can be specialized without
/// looping forever: the cache entry is inserted *before* the template's
/// members are walked, so a self-reference during that walk finds the
/// in-progress entry instead of recursing again.
pub struct TypeRegistry {
    types: IndexVec<TypeId, Type>,
    interned: HashMap<Type, TypeId>,
    specializations: HashMap<(DefId, Vec<TypeId>), TypeId>,
    substitutions: IndexVec<InferId, Option<TypeId>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            types: IndexVec::new(),
            interned: HashMap::new(),
            specializations: HashMap::new(),
            substitutions: IndexVec::new(),
        };
        // Prime the common primitives so callers can cheaply compare
        // against well-known ids instead of re-interning every time.
        for ty in [
            Type::Error,
            Type::Void,
            Type::Never,
            Type::Bool,
            Type::Int,
            Type::Double,
            Type::String,
        ] {
            reg.intern(ty);
        }
        reg
    }

    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = self.types.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    pub fn protocol_composition(&mut self, members: Vec<DefId>) -> TypeId {
        self.intern(Type::ProtocolComposition(normalize_protocol_composition(members)))
    }

    pub fn new_placeholder(&mut self) -> TypeId {
        let infer_id = self.substitutions.push(None);
        self.intern(Type::Placeholder(infer_id))
    }

    pub fn bind_placeholder(&mut self, infer_id: InferId, ty: TypeId) {
        self.substitutions[infer_id] = Some(ty);
    }

    /// Follow a chain of bound placeholders to the concrete type, with
    /// path compression so repeated lookups through a long chain are O(1)
    /// after the first.
    pub fn resolve(&mut self, id: TypeId) -> TypeId {
        let infer_id = match self.get(id) {
            Type::Placeholder(infer_id) => *infer_id,
            _ => return id,
        };
        match self.substitutions[infer_id] {
            Some(bound) => {
                let root = self.resolve(bound);
                self.substitutions[infer_id] = Some(root);
                root
            }
            None => id,
        }
    }

    /// Specialize a generic template with concrete arguments, memoizing
    /// the result. `build` is called only on first specialization of this
    /// exact `(template, args)` pair: a reservation is inserted into the
    /// cache *before* `build` runs, so a direct or indirect
    /// `Box<Box<T>>`-through-itself reference made from inside `build`
    /// finds that reservation and returns immediately instead of
    /// recursing without end.
    pub fn specialize(
        &mut self,
        template: DefId,
        args: Vec<TypeId>,
        build: impl FnOnce(&mut Self) -> Type,
    ) -> TypeId {
        let key = (template, args.clone());
        if let Some(&id) = self.specializations.get(&key) {
            return id;
        }

        let reserved = self.intern(Type::Specialized(
            template,
            args.iter().map(|a| self.get(*a).clone()).collect(),
        ));
        self.specializations.insert(key.clone(), reserved);

        let built = build(self);
        let final_id = self.intern(built);
        self.specializations.insert(key, final_id);
        final_id
    }

    pub fn specialization_cache_len(&self) -> usize {
        self.specializations.len()
    }

    /// Replace every `GenericParam(n)` reachable from `ty` with `args[n]`,
    /// the argument vector a `Specialized(def_id, args)` instance was built
    /// from. A member looked up through a specialized instance carries its
    /// declaration's raw type, parameterized over the *template's* generic
    /// positions; this is what turns that into the type the member actually
    /// has for this particular instantiation. `GenericParam` indices past
    /// the end of `args` are left as-is rather than panicking, since a
    /// member can be declared on an enclosing, differently-parameterized
    /// generic scope this call doesn't know about.
    pub fn substitute_generic_params(&mut self, ty: &Type, args: &[Type]) -> Type {
        match ty {
            Type::GenericParam(n) => args.get(*n as usize).cloned().unwrap_or_else(|| ty.clone()),
            Type::Specialized(def_id, inner_args) => Type::Specialized(
                *def_id,
                inner_args.iter().map(|a| self.substitute_generic_params(a, args)).collect(),
            ),
            Type::Tuple(elems) => {
                Type::Tuple(elems.iter().map(|e| self.substitute_generic_params(e, args)).collect())
            }
            Type::Array(elem) => Type::Array(Box::new(self.substitute_generic_params(elem, args))),
            Type::Dictionary(key, value) => Type::Dictionary(
                Box::new(self.substitute_generic_params(key, args)),
                Box::new(self.substitute_generic_params(value, args)),
            ),
            Type::Optional(inner) => Type::Optional(Box::new(self.substitute_generic_params(inner, args))),
            Type::ImplicitlyUnwrappedOptional(inner) => {
                Type::ImplicitlyUnwrappedOptional(Box::new(self.substitute_generic_params(inner, args)))
            }
            Type::Function(params, ret) => Type::Function(
                params.iter().map(|p| self.substitute_generic_params(p, args)).collect(),
                Box::new(self.substitute_generic_params(ret, args)),
            ),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structurally_identical_types_intern_to_the_same_id() {
        let mut reg = TypeRegistry::new();
        let a = reg.intern(Type::Array(Box::new(Type::Int)));
        let b = reg.intern(Type::Array(Box::new(Type::Int)));
        assert_eq!(a, b);
    }

    #[test]
    fn protocol_composition_ignores_member_order() {
        let mut reg = TypeRegistry::new();
        let a = reg.protocol_composition(vec![DefId(2), DefId(1)]);
        let b = reg.protocol_composition(vec![DefId(1), DefId(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn protocol_composition_dedups_repeated_members() {
        let mut reg = TypeRegistry::new();
        let a = reg.protocol_composition(vec![DefId(1), DefId(1)]);
        let b = reg.protocol_composition(vec![DefId(1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn placeholder_resolves_through_a_chain_with_compression() {
        let mut reg = TypeRegistry::new();
        let p1 = reg.new_placeholder();
        let p2 = reg.new_placeholder();
        let int_ty = reg.intern(Type::Int);

        let infer1 = match reg.get(p1) {
            Type::Placeholder(id) => *id,
            _ => unreachable!(),
        };
        let infer2 = match reg.get(p2) {
            Type::Placeholder(id) => *id,
            _ => unreachable!(),
        };
        reg.bind_placeholder(infer1, p2);
        reg.bind_placeholder(infer2, int_ty);

        assert_eq!(reg.resolve(p1), int_ty);
    }

    #[test]
    fn specialize_memoizes_by_template_and_arguments() {
        let mut reg = TypeRegistry::new();
        let template = DefId(7);
        let int_ty = reg.intern(Type::Int);

        let first = reg.specialize(template, vec![int_ty], |r| {
            Type::Specialized(template, vec![r.get(int_ty).clone()])
        });
        let second = reg.specialize(template, vec![int_ty], |_| {
            panic!("build should not run twice for the same specialization key")
        });

        assert_eq!(first, second);
    }

    #[test]
    fn specialize_with_different_arguments_produces_distinct_ids() {
        let mut reg = TypeRegistry::new();
        let template = DefId(7);
        let int_ty = reg.intern(Type::Int);
        let string_ty = reg.intern(Type::String);

        let a = reg.specialize(template, vec![int_ty], |r| {
            Type::Specialized(template, vec![r.get(int_ty).clone()])
        });
        let b = reg.specialize(template, vec![string_ty], |r| {
            Type::Specialized(template, vec![r.get(string_ty).clone()])
        });

        assert_ne!(a, b);
    }

    /// EDGE CASE: a self-referential generic (`Box<T>` holding an
    /// `Optional<Box<T>>`) must not recurse forever while specializing.
    #[test]
    fn test_edge_recursive_generic_specializes_without_looping() {
        let mut reg = TypeRegistry::new();
        let template = DefId(9);
        let int_ty = reg.intern(Type::Int);

        let id = reg.specialize(template, vec![int_ty], |r| {
            let self_ref = r.specialize(template, vec![int_ty], |_| {
                panic!("nested call must hit the reservation, not rebuild")
            });
            Type::Tuple(vec![r.get(self_ref).clone()])
        });

        assert!(matches!(reg.get(id), Type::Tuple(_)));
    }
}

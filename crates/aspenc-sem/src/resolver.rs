//! Type resolver (§4.2): turns a [`TypeExpr`] node into a canonical
//! [`TypeId`], looking up named types through the symbol registry and
//! driving generic specialization through the [`TypeRegistry`] cache.

use aspenc_ast::types::TypeExpr;
use aspenc_ast::{NodeId, NodeKind, Program};
use aspenc_util::{DefId, FxHashMap, Handler, Span};

use crate::registry::{Resolution, SymbolId, SymbolRegistry};
use crate::types::{Type, TypeId, TypeRegistry};

/// Generic arity recorded for a nominal type declaration the first time
/// the analyzer's forward-declaration pass sees it, so the resolver can
/// validate `List<Int, String>` against `class List<T>` without having to
/// walk the declaration's own node again.
#[derive(Debug, Clone, Copy)]
pub struct TypeDeclSignature {
    pub def_id: DefId,
    pub generic_param_count: usize,
    pub is_protocol: bool,
}

pub struct TypeResolver<'a> {
    pub types: &'a mut TypeRegistry,
    pub symbols: &'a mut SymbolRegistry,
    pub type_decls: &'a FxHashMap<aspenc_util::Symbol, TypeDeclSignature>,
    pub handler: &'a Handler,
    /// The `DefId` of the nominal type whose body is currently being
    /// resolved, if any — what `Self` refers to inside a class/struct/enum
    /// body. `None` at the top level, where `Self` has no meaning.
    pub current_self: Option<DefId>,
}

impl<'a> TypeResolver<'a> {
    /// Resolve a `TypeExpr` node into its canonical `TypeId`. Unresolvable
    /// names and arity mismatches degrade to `Type::Error` after emitting
    /// a diagnostic, so a single bad type annotation doesn't abort the
    /// rest of the pass.
    pub fn resolve(&mut self, program: &Program, node: NodeId) -> TypeId {
        let NodeKind::TypeExpr(expr) = &program.get(node).kind else {
            return self.types.intern(Type::Error);
        };
        let span = Span::DUMMY;

        match expr.clone() {
            TypeExpr::TypeIdentifier(t) => self.resolve_type_identifier(program, node, t, span),
            TypeExpr::TupleType(t) => {
                let elems = t.elements.iter().map(|e| self.resolve(program, *e)).collect();
                self.types.intern(Type::Tuple(elems))
            }
            TypeExpr::ArrayType(t) => {
                let elem = self.resolve(program, t.element);
                self.types.intern(Type::Array(Box::new(self.types.get(elem).clone())))
            }
            TypeExpr::DictionaryType(t) => {
                let key = self.resolve(program, t.key);
                let value = self.resolve(program, t.value);
                self.types.intern(Type::Dictionary(
                    Box::new(self.types.get(key).clone()),
                    Box::new(self.types.get(value).clone()),
                ))
            }
            TypeExpr::OptionalType(t) => {
                let wrapped = self.resolve(program, t.wrapped);
                self.types.intern(Type::Optional(Box::new(self.types.get(wrapped).clone())))
            }
            TypeExpr::ImplicitlyUnwrappedOptional(t) => {
                let wrapped = self.resolve(program, t.wrapped);
                self.types
                    .intern(Type::ImplicitlyUnwrappedOptional(Box::new(self.types.get(wrapped).clone())))
            }
            TypeExpr::FunctionType(t) => {
                let params = t.parameters.iter().map(|p| self.resolve(program, *p)).collect::<Vec<_>>();
                let params = params.into_iter().map(|id| self.types.get(id).clone()).collect();
                let ret = self.resolve(program, t.return_type);
                self.types.intern(Type::Function(params, Box::new(self.types.get(ret).clone())))
            }
            TypeExpr::ProtocolComposition(t) => {
                let mut members = vec![];
                for member_node in &t.members {
                    let member_ty = self.resolve(program, *member_node);
                    match self.types.get(member_ty).clone() {
                        Type::Adt(def_id) => {
                            if !self.is_protocol(def_id) {
                                self.emit_error(
                                    "E_NON_PROTOCOL_TYPE_CANNOT_BE_USED_WITHIN_PROTOCOL_COMPOSITION",
                                    span,
                                );
                            }
                            members.push(def_id);
                        }
                        _ => self.emit_error(
                            "E_NON_PROTOCOL_TYPE_CANNOT_BE_USED_WITHIN_PROTOCOL_COMPOSITION",
                            span,
                        ),
                    }
                }
                self.types.protocol_composition(members)
            }
        }
    }

    fn is_protocol(&self, def_id: DefId) -> bool {
        self.type_decls.values().any(|sig| sig.def_id == def_id && sig.is_protocol)
    }

    fn resolve_type_identifier(
        &mut self,
        program: &Program,
        _node: NodeId,
        t: aspenc_ast::types::TypeIdentifier,
        span: Span,
    ) -> TypeId {
        if t.name.eq_str("Self") {
            return match self.current_self {
                Some(def_id) => self.types.intern(Type::Adt(def_id)),
                None => {
                    self.emit_error("E_USE_OF_UNDECLARED_TYPE", span);
                    self.types.intern(Type::Error)
                }
            };
        }

        if let Some(prim) = primitive_type(t.name.as_str()) {
            if !t.generic_arguments.is_empty() {
                self.emit_error("E_CANNOT_SPECIALIZE_NON_GENERIC_TYPE", span);
            }
            return self.types.intern(prim);
        }

        // A module-qualified or nested type name (`Outer.Inner`) has no
        // dedicated AST shape — `TypeIdentifier` only ever carries a single
        // `Symbol` — so a dotted spelling is resolved by looking up its
        // trailing simple name against the flat, already-deduplicated
        // `type_decls` table: nested declarations register under their own
        // name regardless of nesting depth (`register_nominal` recurses
        // into every member), so the qualifier prefix never changes which
        // signature the lookup finds.
        let simple_name = t.name.as_str().rsplit('.').next().unwrap_or(t.name.as_str());
        let lookup_name = if simple_name == t.name.as_str() {
            t.name
        } else {
            aspenc_util::Symbol::intern(simple_name)
        };

        let Some(sig) = self.type_decls.get(&lookup_name).copied() else {
            self.emit_error("E_USE_OF_UNDECLARED_TYPE", span);
            return self.types.intern(Type::Error);
        };

        let args: Vec<TypeId> = t.generic_arguments.iter().map(|a| self.resolve(program, *a)).collect();

        if sig.generic_param_count == 0 {
            if !args.is_empty() {
                self.emit_error("E_CANNOT_SPECIALIZE_NON_GENERIC_TYPE", span);
            }
            return self.types.intern(Type::Adt(sig.def_id));
        }

        if args.is_empty() {
            self.emit_error("E_GENERIC_TYPE_ARGUMENT_REQUIRED", span);
            return self.types.intern(Type::Error);
        }
        if args.len() > sig.generic_param_count {
            self.emit_error("E_TYPE_WITH_TOO_MANY_ARGUMENTS", span);
            return self.types.intern(Type::Error);
        }
        if args.len() < sig.generic_param_count {
            self.emit_error("E_TYPE_WITH_INSUFFICIENT_ARGUMENTS", span);
            return self.types.intern(Type::Error);
        }

        let arg_types: Vec<Type> = args.iter().map(|id| self.types.get(*id).clone()).collect();
        self.types.specialize(sig.def_id, args, move |_| Type::Specialized(sig.def_id, arg_types))
    }

    fn emit_error(&self, code: &'static str, span: Span) {
        use aspenc_util::diagnostic::DiagnosticBuilder;
        DiagnosticBuilder::error(code).span(span).emit(self.handler);
    }
}

fn primitive_type(name: &str) -> Option<Type> {
    match name {
        "Void" => Some(Type::Void),
        "Never" => Some(Type::Never),
        "Bool" => Some(Type::Bool),
        "Int" => Some(Type::Int),
        "Double" => Some(Type::Double),
        "String" => Some(Type::String),
        _ => None,
    }
}

/// Looks up `symbol`'s resolved type through the registry, returning
/// `Type::Error` interned if the symbol is still `Lazy` — a forward
/// reference the analyzer hasn't visited yet in this pass.
pub fn symbol_type(types: &mut TypeRegistry, symbols: &SymbolRegistry, symbol: SymbolId) -> TypeId {
    match symbols.get(symbol).resolution {
        Resolution::Resolved(ty) => ty,
        Resolution::Lazy => types.intern(Type::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspenc_ast::{DeclModifiers, SourceInfo};
    use aspenc_util::Symbol;

    fn resolve_fixture(
        build: impl FnOnce(&mut Program) -> NodeId,
        type_decls: &FxHashMap<Symbol, TypeDeclSignature>,
    ) -> (TypeRegistry, TypeId) {
        let mut program = Program::new();
        let node = build(&mut program);
        let mut types = TypeRegistry::new();
        let mut symbols = SymbolRegistry::new();
        let handler = Handler::new();
        let mut resolver = TypeResolver {
            types: &mut types,
            symbols: &mut symbols,
            type_decls,
            handler: &handler,
            current_self: None,
        };
        let resolved = resolver.resolve(&program, node);
        drop(resolver);
        (types, resolved)
    }

    #[test]
    fn resolves_primitive_identifier() {
        let decls = FxHashMap::default();
        let (types, id) = resolve_fixture(
            |p| {
                p.alloc(
                    NodeKind::TypeExpr(TypeExpr::TypeIdentifier(aspenc_ast::types::TypeIdentifier {
                        name: Symbol::intern("Int"),
                        generic_arguments: vec![],
                    })),
                    SourceInfo::DUMMY,
                )
            },
            &decls,
        );
        assert_eq!(*types.get(id), Type::Int);
    }

    #[test]
    fn resolves_optional_of_primitive() {
        let decls = FxHashMap::default();
        let (types, id) = resolve_fixture(
            |p| {
                let int_ty = p.alloc(
                    NodeKind::TypeExpr(TypeExpr::TypeIdentifier(aspenc_ast::types::TypeIdentifier {
                        name: Symbol::intern("Int"),
                        generic_arguments: vec![],
                    })),
                    SourceInfo::DUMMY,
                );
                p.alloc(
                    NodeKind::TypeExpr(TypeExpr::OptionalType(aspenc_ast::types::OptionalType {
                        wrapped: int_ty,
                    })),
                    SourceInfo::DUMMY,
                )
            },
            &decls,
        );
        assert_eq!(*types.get(id), Type::Optional(Box::new(Type::Int)));
    }

    /// EDGE CASE: referencing a generic type without arguments is an
    /// error, not a silently-zero-arity specialization.
    #[test]
    fn test_edge_missing_generic_argument_is_an_error() {
        let mut decls = FxHashMap::default();
        let list_name = Symbol::intern("List");
        decls.insert(
            list_name,
            TypeDeclSignature { def_id: DefId(1), generic_param_count: 1, is_protocol: false },
        );
        let (types, id) = resolve_fixture(
            |p| {
                p.alloc(
                    NodeKind::TypeExpr(TypeExpr::TypeIdentifier(aspenc_ast::types::TypeIdentifier {
                        name: list_name,
                        generic_arguments: vec![],
                    })),
                    SourceInfo::DUMMY,
                )
            },
            &decls,
        );
        assert_eq!(*types.get(id), Type::Error);
    }

    #[test]
    fn specializes_generic_type_with_matching_arity() {
        let mut decls = FxHashMap::default();
        let list_name = Symbol::intern("List");
        decls.insert(
            list_name,
            TypeDeclSignature { def_id: DefId(1), generic_param_count: 1, is_protocol: false },
        );
        let (types, id) = resolve_fixture(
            |p| {
                let int_ty = p.alloc(
                    NodeKind::TypeExpr(TypeExpr::TypeIdentifier(aspenc_ast::types::TypeIdentifier {
                        name: Symbol::intern("Int"),
                        generic_arguments: vec![],
                    })),
                    SourceInfo::DUMMY,
                );
                p.alloc(
                    NodeKind::TypeExpr(TypeExpr::TypeIdentifier(aspenc_ast::types::TypeIdentifier {
                        name: list_name,
                        generic_arguments: vec![int_ty],
                    })),
                    SourceInfo::DUMMY,
                )
            },
            &decls,
        );
        assert_eq!(*types.get(id), Type::Specialized(DefId(1), vec![Type::Int]));
    }

    // DeclModifiers import kept for fixtures exercising decl-bearing trees
    // elsewhere in this module's test family.
    #[allow(dead_code)]
    fn _unused(_m: DeclModifiers) {}
}

//! Semantic analyzer (§4): the two-pass driver that ties the symbol
//! registry, scope stack, type resolver, and operator table together into
//! whole-program analysis.
//!
//! Pass 1 ([`SemanticAnalyzer::register_decl`]) walks every declaration and
//! gives it identity — a [`SymbolId`], and for nominal types a
//! [`TypeDeclSignature`] recorded in `type_decls` — without yet resolving
//! any type that refers to another declaration. Pass 2
//! ([`SemanticAnalyzer::analyze_decl`]) walks the same tree again, now able
//! to resolve forward references, and performs the actual checks named
//! throughout this module's functions.

use aspenc_ast::expr::BinaryOperator;
use aspenc_ast::items::{Decl, ValueBindingLeaf};
use aspenc_ast::pattern::Pattern;
use aspenc_ast::stmt::Stmt;
use aspenc_ast::{DeclModifiers, Expr, NodeId, NodeKind, Program};
use aspenc_util::{DefId, DefIdGenerator, FxHashMap, Handler, Span, Symbol};
use log::{debug, trace};

use std::collections::HashSet;

use crate::diagnostics::*;
use crate::error::SemaResult;
use crate::operator::{OperatorResolver, OperatorTable};
use crate::registry::{RegisterOutcome, Resolution, Role, SymbolFlags, SymbolId, SymbolKind, SymbolRegistry};
use crate::resolver::{TypeDeclSignature, TypeResolver};
use crate::scope::{RibKind, ScopeStack};
use crate::types::{Type, TypeId, TypeRegistry};

/// Sentinel member names `Init`/`Subscript` declarations register under:
/// neither carries a `Symbol` of its own in the AST, but both need a name
/// to join the same member-lookup tables (`type_decls`, overload sets) as
/// everything else in a nominal's body.
const INIT_MEMBER_NAME: &str = "init";
const SUBSCRIPT_MEMBER_NAME: &str = "subscript";

#[derive(Debug, Clone, Copy)]
pub struct AnalyzerConfig {
    /// Upper bound on recursive generic specialization depth before the
    /// analyzer gives up rather than looping; the specialization cache
    /// itself is cycle-safe (see `types.rs`), this just bounds pathological
    /// non-recursive but very deep chains.
    pub max_specialization_depth: usize,
    pub warnings_as_errors: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { max_specialization_depth: 64, warnings_as_errors: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfOwnerKind {
    Struct,
    Class,
    Enum,
}

#[derive(Debug, Clone, Copy)]
struct SelfContext {
    owner: SelfOwnerKind,
    def_id: DefId,
    mutating: bool,
}

/// The core driver described at module level. Owns the tree it analyzes
/// (`program`) for the duration of the pass since operator resolution and
/// tuple explosion both rewrite nodes in place.
pub struct SemanticAnalyzer<'a> {
    program: &'a mut Program,
    types: TypeRegistry,
    symbols: SymbolRegistry,
    scopes: ScopeStack,
    handler: Handler,
    config: AnalyzerConfig,
    operator_table: OperatorTable,
    type_decls: FxHashMap<Symbol, TypeDeclSignature>,
    node_types: FxHashMap<NodeId, TypeId>,
    node_symbols: FxHashMap<NodeId, SymbolId>,
    def_ids: DefIdGenerator,
    self_stack: Vec<SelfContext>,
    return_type_stack: Vec<Option<TypeId>>,
    /// The `DefId` of every nominal type whose body is currently being
    /// walked, innermost last — what `Self` resolves to, and what
    /// `SelfContext::def_id` should carry instead of a placeholder.
    type_stack: Vec<DefId>,
    /// Per-nominal member symbol tables, populated in pass 1 as each
    /// member is registered. Used to look up `init`/`subscript`/ordinary
    /// members by name when a generic specialization needs to substitute
    /// its arguments into a member's declared type.
    type_members: FxHashMap<DefId, FxHashMap<Symbol, SymbolId>>,
    /// Top-level declaration nodes already fully analyzed, so an
    /// on-demand resolution triggered by a forward reference doesn't get
    /// re-analyzed a second time when the main pass-2 loop reaches it in
    /// source order.
    analyzed: HashSet<NodeId>,
    /// Symbols currently being resolved on demand, used to detect a
    /// declaration that (directly or indirectly) refers to itself before
    /// it has a type.
    resolving: Vec<SymbolId>,
    /// Variant count recorded per enum `DefId`, so a `switch` over an enum
    /// value can be flagged as non-exhaustive by comparing its case count
    /// against the enum's own — an approximation, since case arms are
    /// arena bodies with no stored case pattern to cross-reference.
    enum_variant_counts: FxHashMap<DefId, usize>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(program: &'a mut Program, config: AnalyzerConfig) -> Self {
        Self {
            program,
            types: TypeRegistry::new(),
            symbols: SymbolRegistry::new(),
            scopes: ScopeStack::new(),
            handler: Handler::new(),
            config,
            operator_table: OperatorTable::with_defaults(),
            type_decls: FxHashMap::default(),
            node_types: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            def_ids: DefIdGenerator::new(),
            self_stack: Vec::new(),
            return_type_stack: Vec::new(),
            type_stack: Vec::new(),
            type_members: FxHashMap::default(),
            analyzed: HashSet::new(),
            resolving: Vec::new(),
            enum_variant_counts: FxHashMap::default(),
        }
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    pub fn node_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// Run both passes over the whole tree (§4.6).
    pub fn analyze_program(&mut self) -> SemaResult<()> {
        let Some(root) = self.program.root() else { return Ok(()) };
        let items = self.program.children(root);

        for item in &items {
            self.register_decl(*item, None)?;
        }
        for item in &items {
            self.analyze_decl(*item, None)?;
        }
        Ok(())
    }

    fn decl_of(&self, node: NodeId) -> Option<Decl> {
        match &self.program.get(node).kind {
            NodeKind::Decl(d) => Some(d.clone()),
            _ => None,
        }
    }

    fn span_of(&self, node: NodeId) -> Span {
        let info = self.program.get(node).info;
        Span::new(0, 0, info.line, info.column)
    }

    fn emit_error(&self, code: &'static str, node: NodeId) {
        use aspenc_util::diagnostic::DiagnosticBuilder;
        DiagnosticBuilder::error(code).span(self.span_of(node)).emit(&self.handler);
    }

    fn emit_warning(&self, code: &'static str, node: NodeId) {
        use aspenc_util::diagnostic::{DiagnosticBuilder, Level};
        let level = if self.config.warnings_as_errors { Level::Error } else { Level::Warning };
        DiagnosticBuilder::new(level, code).span(self.span_of(node)).emit(&self.handler);
    }

    // ---------------------------------------------------------------
    // Pass 1: registration
    // ---------------------------------------------------------------

    fn register_decl(&mut self, node: NodeId, owner: Option<SelfOwnerKind>) -> SemaResult<()> {
        let Some(decl) = self.decl_of(node) else { return Ok(()) };
        trace!("register_decl {:?}", node);

        match decl {
            Decl::Class(d) => self.register_nominal(
                node,
                d.name,
                d.generics.params.len(),
                d.members,
                false,
                SelfOwnerKind::Class,
            ),
            Decl::Struct(d) => self.register_nominal(
                node,
                d.name,
                d.generics.params.len(),
                d.members,
                false,
                SelfOwnerKind::Struct,
            ),
            Decl::Enum(d) => {
                let mut members = d.members.clone();
                members.extend(d.cases.iter().copied());
                let case_count = d.cases.len();
                self.register_nominal_with_case_count(
                    node,
                    d.name,
                    d.generics.params.len(),
                    members,
                    false,
                    SelfOwnerKind::Enum,
                    Some(case_count),
                )
            }
            Decl::Protocol(d) => {
                self.register_nominal(node, d.name, 0, d.members, true, SelfOwnerKind::Struct)
            }
            Decl::Extension(d) => {
                for member in &d.members {
                    self.register_decl(*member, owner)?;
                }
                Ok(())
            }
            Decl::Function(d) => {
                let is_class_method = owner == Some(SelfOwnerKind::Class);
                if is_class_method && d.modifiers.contains(DeclModifiers::MUTATING) {
                    self.emit_error(E_A_ISNT_VALID_ON_METHODS_IN_CLASSES_OR_CLASS_BOUND_PROTOCOLS, node);
                }
                if d.modifiers.contains(DeclModifiers::STATIC)
                    && (d.modifiers.contains(DeclModifiers::MUTATING)
                        || d.modifiers.contains(DeclModifiers::NONMUTATING))
                {
                    self.emit_error(E_STATIC_METHODS_CANNOT_BE_MUTATING_OR_NONMUTATING, node);
                }

                let existing = self.scopes.resolve_local(d.name);
                let def_id = self.def_ids.next();
                match self.symbols.register_with_collision(
                    d.name,
                    def_id,
                    node,
                    SymbolKind::Function,
                    existing,
                ) {
                    RegisterOutcome::Fresh(id) | RegisterOutcome::JoinedOverloadSet(id) => {
                        self.scopes.add_binding(d.name, id);
                        self.node_symbols.insert(node, id);
                        if owner.is_some() {
                            let mut flags = SymbolFlags::MEMBER;
                            if d.modifiers.contains(DeclModifiers::STATIC) {
                                flags.insert(SymbolFlags::STATIC);
                            }
                            if d.modifiers.contains(DeclModifiers::NONMUTATING) {
                                flags.insert(SymbolFlags::NONMUTATING);
                            }
                            self.symbols.add_flags(id, flags);
                            self.record_type_member(d.name, id);
                        }
                    }
                    RegisterOutcome::Conflict { .. } => {
                        self.emit_error(E_DEFINITION_CONFLICT, node);
                    }
                }
                Ok(())
            }
            Decl::Variable(d) | Decl::Constant(d) => {
                for leaf in &d.bindings {
                    self.register_binding_leaf(*leaf, owner)?;
                }
                Ok(())
            }
            Decl::ValueBinding(_) => self.register_binding_leaf(node, owner),
            Decl::ValueBindings(group) => {
                for leaf in &group.leaves {
                    self.register_binding_leaf(*leaf, owner)?;
                }
                Ok(())
            }
            Decl::ComputedProperty(d) => {
                let def_id = self.def_ids.next();
                let id = self.symbols.register(d.name, def_id, node, SymbolKind::ComputedProperty);
                self.scopes.add_binding(d.name, id);
                self.node_symbols.insert(node, id);
                Ok(())
            }
            Decl::Operator(d) => {
                let assoc = match d.associativity {
                    aspenc_ast::items::Associativity::Left => crate::operator::Associativity::Left,
                    aspenc_ast::items::Associativity::Right => crate::operator::Associativity::Right,
                    aspenc_ast::items::Associativity::None => crate::operator::Associativity::Left,
                };
                self.operator_table.declare(d.spelling, d.precedence.clamp(0, 255) as u8, assoc);
                Ok(())
            }
            Decl::Init(d) => {
                let name = Symbol::intern(INIT_MEMBER_NAME);
                let existing = self.scopes.resolve_local(name);
                let def_id = self.def_ids.next();
                match self.symbols.register_with_collision(name, def_id, node, SymbolKind::Function, existing) {
                    RegisterOutcome::Fresh(id) | RegisterOutcome::JoinedOverloadSet(id) => {
                        self.scopes.add_binding(name, id);
                        self.node_symbols.insert(node, id);
                        self.symbols.add_flags(id, SymbolFlags::MEMBER);
                        self.record_type_member(name, id);
                    }
                    RegisterOutcome::Conflict { .. } => self.emit_error(E_DEFINITION_CONFLICT, node),
                }
                let _ = d;
                Ok(())
            }
            Decl::Subscript(d) => {
                let name = Symbol::intern(SUBSCRIPT_MEMBER_NAME);
                let existing = self.scopes.resolve_local(name);
                let def_id = self.def_ids.next();
                match self.symbols.register_with_collision(name, def_id, node, SymbolKind::Function, existing) {
                    RegisterOutcome::Fresh(id) | RegisterOutcome::JoinedOverloadSet(id) => {
                        self.scopes.add_binding(name, id);
                        self.node_symbols.insert(node, id);
                        self.symbols.add_flags(id, SymbolFlags::MEMBER);
                        self.record_type_member(name, id);
                    }
                    RegisterOutcome::Conflict { .. } => self.emit_error(E_DEFINITION_CONFLICT, node),
                }
                let _ = d;
                Ok(())
            }
            Decl::Deinit(_)
            | Decl::TypeAlias(_)
            | Decl::Import(_)
            | Decl::Parameter(_)
            | Decl::Parameters(_) => Ok(()),
        }
    }

    /// Record `name -> id` under the nominal currently on top of
    /// `type_stack`, if any. A no-op at the top level, where a member
    /// declaration can't occur.
    fn record_type_member(&mut self, name: Symbol, id: SymbolId) {
        if let Some(&owner_def_id) = self.type_stack.last() {
            self.type_members.entry(owner_def_id).or_default().insert(name, id);
        }
    }

    fn register_nominal(
        &mut self,
        node: NodeId,
        name: Symbol,
        generic_param_count: usize,
        members: Vec<NodeId>,
        is_protocol: bool,
        owner_kind: SelfOwnerKind,
    ) -> SemaResult<()> {
        self.register_nominal_with_case_count(node, name, generic_param_count, members, is_protocol, owner_kind, None)
    }

    fn register_nominal_with_case_count(
        &mut self,
        node: NodeId,
        name: Symbol,
        generic_param_count: usize,
        members: Vec<NodeId>,
        is_protocol: bool,
        owner_kind: SelfOwnerKind,
        case_count: Option<usize>,
    ) -> SemaResult<()> {
        let def_id = self.def_ids.next();
        let id = self.symbols.register(name, def_id, node, SymbolKind::Type);
        self.scopes.add_binding(name, id);
        self.node_symbols.insert(node, id);
        self.type_decls.insert(name, TypeDeclSignature { def_id, generic_param_count, is_protocol });
        if let Some(count) = case_count {
            self.enum_variant_counts.insert(def_id, count);
        }

        self.scopes.enter_scope(RibKind::TypeBody);
        self.type_stack.push(def_id);
        for member in &members {
            self.register_decl(*member, Some(owner_kind))?;
        }
        self.type_stack.pop();
        self.scopes.exit_scope();
        Ok(())
    }

    fn register_binding_leaf(&mut self, node: NodeId, owner: Option<SelfOwnerKind>) -> SemaResult<()> {
        let NodeKind::Decl(Decl::ValueBinding(leaf)) = &self.program.get(node).kind else {
            return Ok(());
        };
        let leaf = leaf.clone();
        let Some(name) = self.binding_leaf_name(&leaf) else { return Ok(()) };

        if self.scopes.resolve_local(name).is_some() {
            self.emit_error(E_DEFINITION_CONFLICT, node);
        }

        let def_id = self.def_ids.next();
        let id = self.symbols.register(name, def_id, node, SymbolKind::Variable { mutable: true });
        self.scopes.add_binding(name, id);
        self.node_symbols.insert(node, id);

        let mut flags = SymbolFlags::READABLE | SymbolFlags::WRITABLE | SymbolFlags::STORED_PROPERTY;
        if leaf.modifiers.contains(DeclModifiers::LAZY) {
            flags.insert(SymbolFlags::LAZY);
        }
        if leaf.modifiers.contains(DeclModifiers::STATIC) {
            flags.insert(SymbolFlags::STATIC);
        }
        if leaf.initializer.is_some() {
            flags.insert(SymbolFlags::HAS_INITIALIZER);
        }
        if owner.is_some() {
            flags.insert(SymbolFlags::MEMBER);
            self.symbols.set_role(id, Role::Property);
            self.record_type_member(name, id);
        } else {
            self.symbols.set_role(id, Role::LocalVariable);
        }
        self.symbols.add_flags(id, flags);
        Ok(())
    }

    fn binding_leaf_name(&self, leaf: &ValueBindingLeaf) -> Option<Symbol> {
        self.pattern_name(leaf.pattern)
    }

    fn pattern_name(&self, node: NodeId) -> Option<Symbol> {
        match &self.program.get(node).kind {
            NodeKind::Pattern(Pattern::ValueBindingPattern(p)) => Some(p.name),
            NodeKind::Pattern(Pattern::LetPattern(p)) => self.pattern_name(p.inner),
            NodeKind::Pattern(Pattern::VarPattern(p)) => self.pattern_name(p.inner),
            NodeKind::Pattern(Pattern::TypedPattern(p)) => self.pattern_name(p.pattern),
            _ => None,
        }
    }

    // ---------------------------------------------------------------
    // Pass 2: analysis
    // ---------------------------------------------------------------

    fn analyze_decl(&mut self, node: NodeId, owner: Option<SelfOwnerKind>) -> SemaResult<()> {
        if !self.analyzed.insert(node) {
            return Ok(());
        }
        let Some(decl) = self.decl_of(node) else { return Ok(()) };
        debug!("analyze_decl {:?}", node);

        match decl {
            Decl::Class(d) => self.analyze_nominal_body(node, d.members, SelfOwnerKind::Class, false),
            Decl::Struct(d) => self.analyze_nominal_body(node, d.members, SelfOwnerKind::Struct, false),
            Decl::Enum(d) => {
                let mut members = d.members.clone();
                members.extend(d.cases.iter().copied());
                self.analyze_nominal_body(node, members, SelfOwnerKind::Enum, false)
            }
            Decl::Protocol(d) => self.analyze_nominal_body(node, d.members, SelfOwnerKind::Struct, true),
            Decl::Extension(d) => {
                for member in &d.members {
                    self.analyze_decl(*member, owner)?;
                }
                Ok(())
            }
            Decl::Function(d) => self.analyze_function(node, d, owner),
            Decl::Variable(d) | Decl::Constant(d) => {
                let is_let = matches!(&self.program.get(node).kind, NodeKind::Decl(Decl::Constant(_)));
                for leaf in &d.bindings {
                    self.analyze_binding_leaf(*leaf, is_let)?;
                }
                Ok(())
            }
            Decl::ValueBinding(_) => Ok(()),
            Decl::ValueBindings(group) => self.explode_tuple_group(node, &group.leaves),
            Decl::ComputedProperty(d) => {
                let ty = self.resolve_type_expr(d.declared_type);
                if let Some(id) = self.node_symbol(node) {
                    self.symbols.resolve_type(id, ty);
                    self.symbols.add_flags(id, SymbolFlags::READABLE);
                }
                Ok(())
            }
            Decl::Init(d) => {
                self.scopes.enter_scope(RibKind::Function { mutating: true });
                self.check_unreachable_code(d.body);
                self.analyze_code_block(d.body)?;
                self.scopes.exit_scope();
                Ok(())
            }
            Decl::Subscript(d) => {
                let element_ty = self.resolve_type_expr(d.element_type);
                if let Some(id) = self.node_symbol(node) {
                    self.symbols.resolve_type(id, element_ty);
                }
                if let Some(getter) = d.getter {
                    self.analyze_code_block_or_stmt(getter)?;
                }
                if let Some(setter) = d.setter {
                    self.analyze_code_block_or_stmt(setter)?;
                }
                Ok(())
            }
            Decl::Operator(_)
            | Decl::Deinit(_)
            | Decl::TypeAlias(_)
            | Decl::Import(_)
            | Decl::Parameter(_)
            | Decl::Parameters(_) => Ok(()),
        }
    }

    fn analyze_nominal_body(
        &mut self,
        node: NodeId,
        members: Vec<NodeId>,
        owner_kind: SelfOwnerKind,
        is_protocol: bool,
    ) -> SemaResult<()> {
        if let Some(id) = self.node_symbol(node) {
            let def_id = self.symbols.get(id).def_id;
            let ty = self.types.intern(Type::Adt(def_id));
            self.symbols.resolve_type(id, ty);
            self.type_stack.push(def_id);
        }

        self.scopes.enter_scope(RibKind::TypeBody);
        for member in &members {
            self.analyze_decl(*member, Some(owner_kind))?;
            if is_protocol {
                self.check_protocol_member_has_no_stored_property(*member);
            }
        }
        self.scopes.exit_scope();
        if self.node_symbol(node).is_some() {
            self.type_stack.pop();
        }
        Ok(())
    }

    /// §4.6: a protocol may declare a computed property or a method, but
    /// never a stored property with a concrete initializer — there is no
    /// storage to initialize until a conforming type exists.
    fn check_protocol_member_has_no_stored_property(&mut self, member: NodeId) {
        let d = match self.program.get(member).kind.clone() {
            NodeKind::Decl(Decl::Variable(d)) | NodeKind::Decl(Decl::Constant(d)) => d,
            _ => return,
        };
        for leaf in &d.bindings {
            let NodeKind::Decl(Decl::ValueBinding(binding)) = self.program.get(*leaf).kind.clone() else {
                continue;
            };
            if binding.initializer.is_some() {
                self.emit_error(E_PROTOCOLS_FORBID_STORED_PROPERTIES, *leaf);
            }
        }
    }

    fn analyze_function(
        &mut self,
        node: NodeId,
        d: aspenc_ast::items::FunctionDecl,
        owner: Option<SelfOwnerKind>,
    ) -> SemaResult<()> {
        let return_type = match d.return_type {
            Some(rt) => self.resolve_type_expr(rt),
            None => self.types.intern(Type::Void),
        };
        if let Some(id) = self.node_symbol(node) {
            self.symbols.resolve_type(id, return_type);
        }

        let mutating = d.modifiers.contains(DeclModifiers::MUTATING);
        if let Some(owner_kind) = owner {
            let def_id = self.type_stack.last().copied().unwrap_or(DefId::DUMMY);
            self.self_stack.push(SelfContext { owner: owner_kind, def_id, mutating });
        }
        self.return_type_stack.push(Some(return_type));
        self.scopes.enter_scope(RibKind::Function { mutating });

        if let Some(body) = d.body {
            self.check_unreachable_code(body);
            if let Some(owner_kind) = owner {
                self.check_self_mutation(body, mutating, owner_kind);
            }
            self.analyze_code_block(body)?;

            let always_returns = self.block_always_returns_node(body);
            if !always_returns && !matches!(self.types.get(return_type), Type::Void | Type::Never) {
                self.emit_error(E_MISSING_RETURN_IN_A_FUNCTION_EXPECTED_TO_RETURN_A_1, node);
            }
        }

        self.scopes.exit_scope();
        self.return_type_stack.pop();
        if owner.is_some() {
            self.self_stack.pop();
        }
        Ok(())
    }

    fn resolve_type_expr(&mut self, node: NodeId) -> TypeId {
        let mut resolver = TypeResolver {
            types: &mut self.types,
            symbols: &mut self.symbols,
            type_decls: &self.type_decls,
            handler: &self.handler,
            current_self: self.type_stack.last().copied(),
        };
        resolver.resolve(self.program, node)
    }

    // ---------------------------------------------------------------
    // Unreachable-code detection (§4.4)
    // ---------------------------------------------------------------

    fn check_unreachable_code(&mut self, block: NodeId) {
        let NodeKind::CodeBlock(cb) = &self.program.get(block).kind else { return };
        let statements = cb.statements.clone();

        for (i, stmt) in statements.iter().enumerate() {
            if is_terminal_stmt(self.program, *stmt) && i + 1 < statements.len() {
                self.emit_warning(W_CODE_AFTER_A_WILL_NEVER_BE_EXECUTED_1, statements[i + 1]);
                break;
            }
        }

        for stmt in &statements {
            self.check_unreachable_in_stmt(*stmt);
        }
    }

    fn check_unreachable_in_stmt(&mut self, stmt: NodeId) {
        let NodeKind::Stmt(s) = &self.program.get(stmt).kind else { return };
        match s.clone() {
            Stmt::If(s) => {
                self.check_unreachable_code(s.then_branch);
                if let Some(else_branch) = s.else_branch {
                    self.check_unreachable_in_stmt_or_block(else_branch);
                }
            }
            Stmt::ForIn(s) => self.check_unreachable_code(s.body),
            Stmt::ForLoop(s) => self.check_unreachable_code(s.body),
            Stmt::WhileLoop(s) => self.check_unreachable_code(s.body),
            Stmt::DoLoop(s) => self.check_unreachable_code(s.body),
            Stmt::LabeledStatement(s) => self.check_unreachable_in_stmt(s.statement),
            _ => {}
        }
    }

    fn check_unreachable_in_stmt_or_block(&mut self, node: NodeId) {
        match &self.program.get(node).kind {
            NodeKind::CodeBlock(_) => self.check_unreachable_code(node),
            NodeKind::Stmt(_) => self.check_unreachable_in_stmt(node),
            _ => {}
        }
    }

    // ---------------------------------------------------------------
    // Self-mutation validation (§4.4)
    // ---------------------------------------------------------------

    fn check_self_mutation(&mut self, block: NodeId, mutating: bool, owner: SelfOwnerKind) {
        let NodeKind::CodeBlock(cb) = &self.program.get(block).kind else { return };
        let statements = cb.statements.clone();
        for stmt in statements {
            self.check_self_mutation_in_stmt(stmt, mutating, owner);
        }
    }

    fn check_self_mutation_in_stmt(&mut self, stmt: NodeId, mutating: bool, owner: SelfOwnerKind) {
        let NodeKind::Stmt(s) = &self.program.get(stmt).kind else { return };
        match s.clone() {
            Stmt::Assignment(a) => self.check_assignment_target(a.target, mutating, owner),
            other => {
                for child in other.children() {
                    match &self.program.get(child).kind {
                        NodeKind::CodeBlock(_) => self.check_self_mutation(child, mutating, owner),
                        NodeKind::Stmt(_) => self.check_self_mutation_in_stmt(child, mutating, owner),
                        _ => {}
                    }
                }
            }
        }
    }

    /// §4.4: assigning through `self` (or one of its members) outside a
    /// `mutating` method is only an error for value types. Classes are
    /// reference types, so `self.member = ...` is always fine there
    /// regardless of the method's own `mutating`/`nonmutating` marking.
    fn check_assignment_target(&mut self, target: NodeId, mutating: bool, owner: SelfOwnerKind) {
        if owner == SelfOwnerKind::Class {
            return;
        }
        if mutating {
            return;
        }
        match &self.program.get(target).kind {
            NodeKind::Expr(Expr::MemberAccess(m)) => {
                if matches!(&self.program.get(m.base).kind, NodeKind::Expr(Expr::SelfExpr)) {
                    self.emit_error(E_CANNOT_ASSIGN_TO_A_IN_B_2, target);
                }
            }
            NodeKind::Expr(Expr::SelfExpr) => {
                if owner == SelfOwnerKind::Enum {
                    self.emit_error(E_CANNOT_ASSIGN_TO_A_IN_A_METHOD_1, target);
                }
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------
    // Statement and expression typing
    // ---------------------------------------------------------------

    fn analyze_code_block(&mut self, block: NodeId) -> SemaResult<()> {
        self.scopes.enter_scope(RibKind::Block);
        let NodeKind::CodeBlock(cb) = &self.program.get(block).kind else {
            self.scopes.exit_scope();
            return Ok(());
        };
        let statements = cb.statements.clone();
        for stmt in statements {
            self.analyze_stmt(stmt)?;
        }
        self.scopes.exit_scope();
        Ok(())
    }

    fn analyze_stmt(&mut self, node: NodeId) -> SemaResult<()> {
        let NodeKind::Stmt(stmt) = self.program.get(node).kind.clone() else { return Ok(()) };
        match stmt {
            Stmt::If(s) => {
                self.type_expr(s.condition);
                self.check_condition_is_bool(s.condition);
                self.analyze_code_block_or_stmt(s.then_branch)?;
                if let Some(else_branch) = s.else_branch {
                    self.analyze_code_block_or_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::Switch(s) => {
                let control_ty = self.type_expr(s.control_expr);
                for case in &s.cases {
                    self.analyze_code_block_or_stmt(*case)?;
                }
                if let Some(default_case) = s.default_case {
                    self.analyze_code_block_or_stmt(default_case)?;
                }
                self.check_switch_exhaustiveness(node, control_ty, s.cases.len(), s.default_case.is_some());
                Ok(())
            }
            Stmt::ForIn(s) => {
                self.type_expr(s.sequence);
                self.scopes.enter_scope(RibKind::Loop(None));
                self.analyze_code_block_or_stmt(s.body)?;
                self.scopes.exit_scope();
                Ok(())
            }
            Stmt::ForLoop(s) => {
                self.scopes.enter_scope(RibKind::Loop(None));
                for init in &s.initializers {
                    self.analyze_stmt(*init)?;
                }
                if let Some(cond) = s.condition {
                    self.type_expr(cond);
                }
                if let Some(step) = s.step {
                    self.type_expr(step);
                }
                self.analyze_code_block_or_stmt(s.body)?;
                self.scopes.exit_scope();
                Ok(())
            }
            Stmt::WhileLoop(s) => {
                self.type_expr(s.condition);
                self.check_condition_is_bool(s.condition);
                self.scopes.enter_scope(RibKind::Loop(None));
                self.analyze_code_block_or_stmt(s.body)?;
                self.scopes.exit_scope();
                Ok(())
            }
            Stmt::DoLoop(s) => {
                self.scopes.enter_scope(RibKind::Loop(None));
                self.analyze_code_block_or_stmt(s.body)?;
                self.scopes.exit_scope();
                self.type_expr(s.condition);
                Ok(())
            }
            Stmt::Return(s) => {
                if let Some(value) = s.value {
                    self.type_expr(value);
                }
                Ok(())
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Fallthrough => Ok(()),
            Stmt::LabeledStatement(s) => self.analyze_code_block_or_stmt(s.statement),
            Stmt::Assignment(s) => {
                self.type_expr(s.target);
                self.type_expr(s.value);
                Ok(())
            }
        }
    }

    /// Approximate exhaustiveness check (§4.4): the arena gives each switch
    /// arm only its body, not the case pattern it matches, so this can't
    /// cross-reference which variants are actually covered. Instead it
    /// flags the two situations that are unambiguous without that
    /// information: no `default` and zero cases at all, or no `default`
    /// and fewer cases than the enum being switched on has variants. A
    /// real exhaustiveness check would need the parser to attach each
    /// case's matched pattern to its own node.
    fn check_switch_exhaustiveness(&mut self, node: NodeId, control_ty: TypeId, case_count: usize, has_default: bool) {
        if has_default {
            return;
        }
        if case_count == 0 {
            self.emit_error(E_SWITCH_MUST_BE_EXHAUSTIVE, node);
            return;
        }
        if let Type::Adt(def_id) = self.types.get(control_ty) {
            if let Some(&variants) = self.enum_variant_counts.get(def_id) {
                if case_count < variants {
                    self.emit_error(E_SWITCH_MUST_BE_EXHAUSTIVE, node);
                }
            }
        }
    }

    fn analyze_code_block_or_stmt(&mut self, node: NodeId) -> SemaResult<()> {
        match &self.program.get(node).kind {
            NodeKind::CodeBlock(_) => self.analyze_code_block(node),
            NodeKind::Stmt(_) => self.analyze_stmt(node),
            _ => Ok(()),
        }
    }

    fn check_condition_is_bool(&mut self, node: NodeId) {
        if let Some(ty) = self.node_type(node) {
            if !matches!(self.types.get(ty), Type::Bool | Type::Error) {
                self.emit_error(E_IF_WHILE_CONDITION_MUST_BE_BOOL, node);
            }
        }
    }

    /// Type an expression bottom-up, recording the result in `node_types`
    /// and returning it. Operator trees are re-sorted to precedence-correct
    /// shape before being typed.
    fn type_expr(&mut self, node: NodeId) -> TypeId {
        if let Some(ty) = self.node_type(node) {
            return ty;
        }
        if matches!(&self.program.get(node).kind, NodeKind::Expr(Expr::BinaryOperator(_))) {
            let resolver = OperatorResolver { table: &self.operator_table };
            resolver.resort(self.program, node);
        }

        let NodeKind::Expr(expr) = self.program.get(node).kind.clone() else {
            let err = self.types.intern(Type::Error);
            self.node_types.insert(node, err);
            return err;
        };

        let ty = match expr {
            Expr::Identifier(id) => match self.scopes.resolve(id.name) {
                Some(symbol_id) => {
                    self.node_symbols.insert(node, symbol_id);
                    self.resolved_or_lazy(symbol_id, node)
                }
                None => {
                    self.emit_error(E_USE_OF_UNRESOLVED_IDENTIFIER_1, node);
                    self.types.intern(Type::Error)
                }
            },
            Expr::Integer(_) => self.types.intern(Type::Int),
            Expr::Float(_) => self.types.intern(Type::Double),
            Expr::StringLiteral(_) => self.types.intern(Type::String),
            Expr::StringInterpolation(e) => {
                for segment in &e.segments {
                    self.type_expr(*segment);
                }
                self.types.intern(Type::String)
            }
            Expr::ArrayLiteral(e) => {
                let elem = e.elements.first().map(|el| self.type_expr(*el));
                for el in e.elements.iter().skip(1) {
                    self.type_expr(*el);
                }
                let elem_ty = elem.map(|id| self.types.get(id).clone()).unwrap_or(Type::Error);
                self.types.intern(Type::Array(Box::new(elem_ty)))
            }
            Expr::DictionaryLiteral(e) => {
                let mut key_ty = None;
                let mut value_ty = None;
                for (k, v) in &e.entries {
                    let kt = self.type_expr(*k);
                    let vt = self.type_expr(*v);
                    key_ty.get_or_insert(kt);
                    value_ty.get_or_insert(vt);
                }
                let key_ty = key_ty.map(|id| self.types.get(id).clone()).unwrap_or(Type::Error);
                let value_ty = value_ty.map(|id| self.types.get(id).clone()).unwrap_or(Type::Error);
                self.types.intern(Type::Dictionary(Box::new(key_ty), Box::new(value_ty)))
            }
            Expr::Tuple(e) => {
                let elem_types: Vec<Type> = e
                    .elements
                    .iter()
                    .map(|el| {
                        let id = self.type_expr(*el);
                        self.types.get(id).clone()
                    })
                    .collect();
                self.types.intern(Type::Tuple(elem_types))
            }
            Expr::ParenthesizedExpression(e) => self.type_expr(e.inner),
            Expr::MemberAccess(e) => self.type_member_access(node, e),
            Expr::SubscriptAccess(e) => {
                let base_ty = self.type_expr(e.base);
                for arg in &e.arguments {
                    self.type_expr(*arg);
                }
                let subscript_name = Symbol::intern(SUBSCRIPT_MEMBER_NAME);
                match self.member_symbol_of(base_ty, subscript_name) {
                    Some(sym) => {
                        self.node_symbols.insert(node, sym);
                        self.substituted_member_type(base_ty, sym, node)
                    }
                    None => self.types.intern(Type::Error),
                }
            }
            Expr::FunctionCall(e) => self.type_function_call(node, e),
            Expr::Closure(e) => {
                self.scopes.enter_scope(RibKind::Block);
                for param in &e.parameters {
                    self.type_expr(*param);
                }
                let body_ty = self.type_expr(e.body);
                self.scopes.exit_scope();
                let ret = self.types.get(body_ty).clone();
                self.types.intern(Type::Function(vec![], Box::new(ret)))
            }
            Expr::SelfExpr => match self.self_stack.last() {
                Some(ctx) => self.types.intern(Type::Adt(ctx.def_id)),
                None => self.types.intern(Type::Error),
            },
            Expr::InitializerReference(e) => {
                let base_ty = self.type_expr(e.base);
                let init_name = Symbol::intern(INIT_MEMBER_NAME);
                match self.member_symbol_of(base_ty, init_name) {
                    Some(sym) => {
                        self.node_symbols.insert(node, sym);
                        self.substituted_member_type(base_ty, sym, node)
                    }
                    None => self.types.intern(Type::Error),
                }
            }
            Expr::DynamicType(e) => {
                // `type(of: expr)` yields a metatype; since metatypes
                // aren't in the closed `Type` set, this passes the base
                // expression's own type through rather than modeling a
                // distinct `Type::Meta` variant.
                self.type_expr(e.base)
            }
            Expr::ForcedValue(e) => {
                let base_ty = self.type_expr(e.base);
                match self.types.get(base_ty).clone() {
                    Type::Optional(inner) | Type::ImplicitlyUnwrappedOptional(inner) => {
                        self.types.intern(*inner)
                    }
                    Type::Error => self.types.intern(Type::Error),
                    _ => {
                        self.emit_error(E_VALUE_OF_OPTIONAL_TYPE_MUST_BE_UNWRAPPED, node);
                        self.types.intern(Type::Error)
                    }
                }
            }
            Expr::OptionalChaining(e) => {
                let base_ty = self.type_expr(e.base);
                match self.types.get(base_ty).clone() {
                    Type::Optional(inner) | Type::ImplicitlyUnwrappedOptional(inner) => {
                        self.types.intern(Type::Optional(inner))
                    }
                    _ => self.types.intern(Type::Error),
                }
            }
            Expr::BinaryOperator(e) => self.type_binary_operator(e),
            Expr::UnaryOperator(e) => self.type_expr(e.operand),
            Expr::ConditionalOperator(e) => {
                self.type_expr(e.condition);
                self.check_condition_is_bool(e.condition);
                let then_ty = self.type_expr(e.then_expr);
                let else_ty = self.type_expr(e.else_expr);
                if self.types.get(then_ty) == self.types.get(else_ty) {
                    then_ty
                } else {
                    self.types.intern(Type::Error)
                }
            }
            Expr::CompileConstant(c) => {
                use aspenc_ast::expr::CompileConstant;
                match c {
                    CompileConstant::Line | CompileConstant::Column => self.types.intern(Type::Int),
                    CompileConstant::File | CompileConstant::Function => self.types.intern(Type::String),
                }
            }
        };

        self.node_types.insert(node, ty);
        ty
    }

    fn type_member_access(&mut self, node: NodeId, e: aspenc_ast::expr::MemberAccess) -> TypeId {
        let base_ty = self.type_expr(e.base);
        if let Type::Tuple(elems) = self.types.get(base_ty).clone() {
            if let Ok(index) = e.member.as_str().parse::<usize>() {
                if let Some(elem) = elems.get(index) {
                    return self.types.intern(elem.clone());
                }
            }
        }
        match self.member_symbol_of(base_ty, e.member) {
            Some(sym) => {
                self.node_symbols.insert(node, sym);
                self.substituted_member_type(base_ty, sym, node)
            }
            None => self.types.intern(Type::Error),
        }
    }

    /// Look up `name` among the members recorded for the nominal `ty`
    /// resolves to, if any. Works for both an unapplied template
    /// (`Type::Adt`) and a fully-applied generic instantiation
    /// (`Type::Specialized`) — member identity is the same either way,
    /// only the member's own type differs once substitution is involved.
    fn member_symbol_of(&self, ty: TypeId, name: Symbol) -> Option<SymbolId> {
        let def_id = match self.types.get(ty) {
            Type::Adt(def_id) => *def_id,
            Type::Specialized(def_id, _) => *def_id,
            _ => return None,
        };
        self.type_members.get(&def_id).and_then(|members| members.get(&name)).copied()
    }

    /// `sym`'s resolved type, substituted against `base_ty`'s generic
    /// arguments when `base_ty` is a specialized instance rather than a
    /// bare template. A member declared as `var value: T` on `Box<T>`
    /// looked up through `Box<Int>` must type as `Int`, not the
    /// unsubstituted `GenericParam(0)` the declaration itself carries.
    fn substituted_member_type(&mut self, base_ty: TypeId, sym: SymbolId, node: NodeId) -> TypeId {
        let raw = self.resolved_or_lazy(sym, node);
        let Type::Specialized(_, args) = self.types.get(base_ty).clone() else { return raw };
        let raw_ty = self.types.get(raw).clone();
        let substituted = self.types.substitute_generic_params(&raw_ty, &args);
        self.types.intern(substituted)
    }

    /// A symbol's resolved type, triggering on-demand analysis of its
    /// declaration if pass 2 hasn't reached it yet (a forward reference).
    fn resolved_or_lazy(&mut self, sym: SymbolId, node: NodeId) -> TypeId {
        match self.symbols.get(sym).resolution {
            Resolution::Resolved(ty) => ty,
            Resolution::Lazy => self.resolve_lazy_symbol(sym, node),
        }
    }

    /// Force a still-`Lazy` symbol to resolve by analyzing its declaration
    /// node immediately, out of the normal pass-2 source order. Guards
    /// against a declaration that forward-references itself (directly or
    /// through a chain) by tracking symbols currently mid-resolution and
    /// emitting `E_CYCLIC_DECLARATION` instead of recursing forever.
    fn resolve_lazy_symbol(&mut self, sym: SymbolId, node: NodeId) -> TypeId {
        if self.resolving.contains(&sym) {
            self.emit_error(E_CYCLIC_DECLARATION, node);
            return self.types.intern(Type::Error);
        }
        self.resolving.push(sym);
        let decl_node = self.symbols.get(sym).node;
        let _ = self.analyze_decl(decl_node, None);
        self.resolving.pop();
        match self.symbols.get(sym).resolution {
            Resolution::Resolved(ty) => ty,
            Resolution::Lazy => self.types.intern(Type::Error),
        }
    }

    /// Count of a callable declaration's own parameters, used to pick
    /// among overload candidates by call-site arity. `None` for anything
    /// that isn't a `Function`/`Init`/`Subscript` declaration.
    fn arity_of(&self, decl_node: NodeId) -> Option<usize> {
        let params_node = match self.decl_of(decl_node)? {
            Decl::Function(d) => d.parameters,
            Decl::Init(d) => d.parameters,
            Decl::Subscript(d) => d.parameters,
            _ => return None,
        };
        match &self.program.get(params_node).kind {
            NodeKind::Decl(Decl::Parameters(p)) => Some(p.params.len()),
            _ => None,
        }
    }

    /// §4.6: type a call by resolving its callee to a symbol (directly for
    /// a bare identifier, through member lookup for `a.b(...)`), then
    /// picking the overload candidate whose own parameter count matches
    /// the call's argument count. An ambiguous or unresolved callee
    /// degrades to `Type::Error` rather than guessing.
    fn type_function_call(&mut self, node: NodeId, e: aspenc_ast::expr::FunctionCall) -> TypeId {
        for arg in &e.arguments {
            self.type_expr(*arg);
        }
        if let Some(trailing) = e.trailing_closure {
            self.type_expr(trailing);
        }
        let arity = e.arguments.len() + if e.trailing_closure.is_some() { 1 } else { 0 };

        let mut callee_base_ty = None;
        let callee_symbol = match self.program.get(e.callee).kind.clone() {
            NodeKind::Expr(Expr::Identifier(id)) => {
                let sym = self.scopes.resolve(id.name);
                if let Some(sym) = sym {
                    self.node_symbols.insert(e.callee, sym);
                }
                sym
            }
            NodeKind::Expr(Expr::MemberAccess(m)) => {
                let base_ty = self.type_expr(m.base);
                callee_base_ty = Some(base_ty);
                self.member_symbol_of(base_ty, m.member)
            }
            _ => {
                self.type_expr(e.callee);
                None
            }
        };

        let Some(sym) = callee_symbol else { return self.types.intern(Type::Error) };
        let overload_members = self.symbols.overload_members(sym).to_vec();
        let candidates: Vec<SymbolId> = if overload_members.is_empty() { vec![sym] } else { overload_members };

        let matching: Vec<SymbolId> = candidates
            .into_iter()
            .filter(|&c| self.arity_of(self.symbols.get(c).node) == Some(arity))
            .collect();

        match matching.as_slice() {
            [only] => match callee_base_ty {
                Some(base_ty) => self.substituted_member_type(base_ty, *only, node),
                None => self.resolved_or_lazy(*only, node),
            },
            _ => self.types.intern(Type::Error),
        }
    }

    fn type_binary_operator(&mut self, e: BinaryOperator) -> TypeId {
        let lhs_ty = self.type_expr(e.lhs);
        let rhs_ty = self.type_expr(e.rhs);

        let comparison_and_logical: &[&str] =
            &["==", "!=", "<", "<=", ">", ">=", "&&", "||", "is"];
        if comparison_and_logical.contains(&e.op.as_str()) {
            return self.types.intern(Type::Bool);
        }

        if e.op.as_str() == "??" {
            return match self.types.get(lhs_ty).clone() {
                Type::Optional(inner) | Type::ImplicitlyUnwrappedOptional(inner) => self.types.intern(*inner),
                other => self.types.intern(other),
            };
        }

        if self.types.get(lhs_ty) == self.types.get(rhs_ty) {
            lhs_ty
        } else if matches!(self.types.get(lhs_ty), Type::Error) {
            rhs_ty
        } else if matches!(self.types.get(rhs_ty), Type::Error) {
            lhs_ty
        } else {
            self.types.intern(Type::Error)
        }
    }

    fn analyze_binding_leaf(&mut self, node: NodeId, is_let: bool) -> SemaResult<()> {
        let NodeKind::Decl(Decl::ValueBinding(leaf)) = self.program.get(node).kind.clone() else {
            return Ok(());
        };

        let is_member = self
            .node_symbol(node)
            .map(|id| self.symbols.get(id).flags.contains(SymbolFlags::MEMBER))
            .unwrap_or(false);

        if leaf.modifiers.contains(DeclModifiers::CLASS) && !is_member {
            self.emit_error(E_CLASS_PROPERTIES_MAY_ONLY_BE_DECLARED_ON_A_TYPE, node);
        }
        if (leaf.modifiers.contains(DeclModifiers::LAZY) || leaf.modifiers.contains(DeclModifiers::STATIC))
            && !is_member
        {
            self.emit_error(E_A_MAY_ONLY_BE_USED_ON_B_DECLARATION_2, node);
        }

        if is_let && leaf.initializer.is_none() {
            self.emit_error(E_LET_REQUIRES_INITIALIZER, node);
        } else if leaf.declared_type.is_none() && leaf.initializer.is_none() {
            self.emit_error(E_TYPE_ANNOTATION_MISSING_IN_PATTERN, node);
        }

        let declared_ty = leaf.declared_type.map(|t| self.resolve_type_expr(t));
        let init_ty = leaf.initializer.map(|init| self.type_expr(init));

        if let (Some(d), Some(i)) = (declared_ty, init_ty) {
            let declared = self.types.get(d).clone();
            let inferred = self.types.get(i).clone();
            if declared != inferred && !declared.is_error() && !inferred.is_error() {
                self.emit_error(E_CANNOT_CONVERT_EXPRESSION_TYPE_2, node);
            }
        }

        let ty = declared_ty.or(init_ty).unwrap_or_else(|| self.types.intern(Type::Error));

        if let Some(id) = self.node_symbol(node) {
            self.symbols.resolve_type(id, ty);
        }
        Ok(())
    }

    /// Explode a tuple-pattern group (§4.6): a synthesized temporary binds
    /// the shared initializer once, and each leaf gets a synthesized
    /// positional `MemberAccess` into that temporary rather than re-typing
    /// the initializer expression once per leaf. The group's arity is
    /// checked against the initializer's tuple type.
    fn explode_tuple_group(&mut self, node: NodeId, leaves: &[NodeId]) -> SemaResult<()> {
        let Some(&first) = leaves.first() else { return Ok(()) };
        let NodeKind::Decl(Decl::ValueBinding(first_leaf)) = self.program.get(first).kind.clone() else {
            return Ok(());
        };
        let Some(initializer) = first_leaf.initializer else {
            self.emit_error(E_LET_REQUIRES_INITIALIZER, node);
            return Ok(());
        };

        let init_ty = self.type_expr(initializer);
        let elem_types = match self.types.get(init_ty).clone() {
            Type::Tuple(elems) if elems.len() == leaves.len() => elems,
            Type::Error => vec![Type::Error; leaves.len()],
            _ => {
                self.emit_error(E_TUPLE_PATTERN_MUST_MATCH_TUPLE_TYPE_1, node);
                vec![Type::Error; leaves.len()]
            }
        };

        let info = self.program.get(initializer).info.clone();
        let temporary = self.program.alloc(
            NodeKind::Expr(Expr::Identifier(aspenc_ast::expr::Identifier {
                name: Symbol::intern("$tuple_temp"),
            })),
            info.clone(),
        );
        self.node_types.insert(temporary, init_ty);

        if let NodeKind::Decl(Decl::ValueBindings(group)) = &mut self.program.get_mut(node).kind {
            group.temporary = Some(temporary);
        }

        for (i, (leaf, elem_ty)) in leaves.iter().zip(elem_types.into_iter()).enumerate() {
            let ty = self.types.intern(elem_ty);
            let access = self.program.alloc(
                NodeKind::Expr(Expr::MemberAccess(aspenc_ast::expr::MemberAccess {
                    base: temporary,
                    member: Symbol::intern(&i.to_string()),
                })),
                info.clone(),
            );
            self.node_types.insert(access, ty);
            if let Some(id) = self.node_symbol(*leaf) {
                self.symbols.resolve_type(id, ty);
            }
            self.node_types.insert(*leaf, ty);
        }
        Ok(())
    }

    fn block_always_returns_node(&self, block: NodeId) -> bool {
        let NodeKind::CodeBlock(cb) = &self.program.get(block).kind else { return false };
        cb.statements.last().map(|&s| self.stmt_always_returns(s)).unwrap_or(false)
    }

    fn stmt_always_returns(&self, stmt: NodeId) -> bool {
        let NodeKind::Stmt(s) = &self.program.get(stmt).kind else { return false };
        match s {
            Stmt::Return(_) => true,
            Stmt::If(s) => match s.else_branch {
                Some(else_branch) => {
                    self.block_or_stmt_always_returns(s.then_branch)
                        && self.block_or_stmt_always_returns(else_branch)
                }
                None => false,
            },
            Stmt::LabeledStatement(s) => self.stmt_always_returns(s.statement),
            _ => false,
        }
    }

    fn block_or_stmt_always_returns(&self, node: NodeId) -> bool {
        match &self.program.get(node).kind {
            NodeKind::CodeBlock(_) => self.block_always_returns_node(node),
            NodeKind::Stmt(_) => self.stmt_always_returns(node),
            _ => false,
        }
    }
}

fn is_terminal_stmt(program: &Program, stmt: NodeId) -> bool {
    matches!(
        &program.get(stmt).kind,
        NodeKind::Stmt(Stmt::Return(_))
            | NodeKind::Stmt(Stmt::Break(_))
            | NodeKind::Stmt(Stmt::Continue(_))
            | NodeKind::Stmt(Stmt::Fallthrough)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspenc_ast::items::{
        ClassDecl, FunctionDecl, GenericDefinition, StructDecl, ValueBindingDecl,
    };
    use aspenc_ast::pattern::ValueBindingPattern;
    use aspenc_ast::stmt::{AssignmentStmt, CodeBlock, IfStmt, ReturnStmt};
    use aspenc_ast::types::{TypeExpr, TypeIdentifier};
    use aspenc_ast::SourceInfo;
    use aspenc_util::Idx;

    fn alloc_ident_pattern(program: &mut Program, name: &str) -> NodeId {
        let inner = program.alloc(NodeKind::Expr(Expr::Identifier(aspenc_ast::expr::Identifier {
            name: Symbol::intern(name),
        })), SourceInfo::DUMMY);
        program.alloc(
            NodeKind::Pattern(Pattern::ValueBindingPattern(ValueBindingPattern {
                name: Symbol::intern(name),
                pattern: inner,
            })),
            SourceInfo::DUMMY,
        )
    }

    fn alloc_type_ident(program: &mut Program, name: &str) -> NodeId {
        program.alloc(
            NodeKind::TypeExpr(TypeExpr::TypeIdentifier(TypeIdentifier {
                name: Symbol::intern(name),
                generic_arguments: vec![],
            })),
            SourceInfo::DUMMY,
        )
    }

    fn alloc_self_expr(program: &mut Program) -> NodeId {
        program.alloc(NodeKind::Expr(Expr::SelfExpr), SourceInfo::DUMMY)
    }

    fn alloc_member(program: &mut Program, base: NodeId, member: &str) -> NodeId {
        program.alloc(
            NodeKind::Expr(Expr::MemberAccess(aspenc_ast::expr::MemberAccess {
                base,
                member: Symbol::intern(member),
            })),
            SourceInfo::DUMMY,
        )
    }

    fn alloc_int(program: &mut Program, v: i64) -> NodeId {
        program.alloc(NodeKind::Expr(Expr::Integer(v)), SourceInfo::DUMMY)
    }

    fn alloc_code_block(program: &mut Program, statements: Vec<NodeId>) -> NodeId {
        program.alloc(NodeKind::CodeBlock(CodeBlock { statements }), SourceInfo::DUMMY)
    }

    fn method(
        program: &mut Program,
        name: &str,
        mutating: bool,
        return_type: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let mut modifiers = DeclModifiers::NONE;
        if mutating {
            modifiers.insert(DeclModifiers::MUTATING);
        }
        program.alloc(
            NodeKind::Decl(Decl::Function(FunctionDecl {
                name: Symbol::intern(name),
                generics: GenericDefinition::default(),
                parameters: NodeId::from_usize(0),
                return_type,
                body: Some(body),
                modifiers,
            })),
            SourceInfo::DUMMY,
        )
    }

    fn struct_with_members(program: &mut Program, name: &str, members: Vec<NodeId>) -> NodeId {
        program.alloc(
            NodeKind::Decl(Decl::Struct(StructDecl {
                name: Symbol::intern(name),
                generics: GenericDefinition::default(),
                conformances: vec![],
                members,
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        )
    }

    fn class_with_members(program: &mut Program, name: &str, members: Vec<NodeId>) -> NodeId {
        program.alloc(
            NodeKind::Decl(Decl::Class(ClassDecl {
                name: Symbol::intern(name),
                generics: GenericDefinition::default(),
                superclass: None,
                conformances: vec![],
                members,
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        )
    }

    fn run(program: &mut Program, top_level: Vec<NodeId>) -> SemanticAnalyzer<'_> {
        program.set_root(top_level.clone(), SourceInfo::DUMMY);
        let mut analyzer = SemanticAnalyzer::new(program, AnalyzerConfig::default());
        analyzer.analyze_program().expect("analysis should not hit an internal error");
        analyzer
    }

    /// SEED 1: assigning `self.member` inside a non-mutating struct method
    /// is an error.
    #[test]
    fn test_non_mutating_method_cannot_assign_self_member() {
        let mut program = Program::new();
        let self_expr = alloc_self_expr(&mut program);
        let member = alloc_member(&mut program, self_expr, "x");
        let value = alloc_int(&mut program, 1);
        let assign = program.alloc(
            NodeKind::Stmt(Stmt::Assignment(AssignmentStmt { target: member, value })),
            SourceInfo::DUMMY,
        );
        let body = alloc_code_block(&mut program, vec![assign]);
        let m = method(&mut program, "touch", false, None, body);
        let s = struct_with_members(&mut program, "Point", vec![m]);

        let analyzer = run(&mut program, vec![s]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 2: the same assignment inside a `mutating` struct method is
    /// fine.
    #[test]
    fn test_mutating_method_can_assign_self_member() {
        let mut program = Program::new();
        let self_expr = alloc_self_expr(&mut program);
        let member = alloc_member(&mut program, self_expr, "x");
        let value = alloc_int(&mut program, 1);
        let assign = program.alloc(
            NodeKind::Stmt(Stmt::Assignment(AssignmentStmt { target: member, value })),
            SourceInfo::DUMMY,
        );
        let body = alloc_code_block(&mut program, vec![assign]);
        let m = method(&mut program, "touch", true, None, body);
        let s = struct_with_members(&mut program, "Point", vec![m]);

        let analyzer = run(&mut program, vec![s]);
        assert!(!analyzer.handler().has_errors());
    }

    /// SEED 3: `mutating` on a class method is always an error, regardless
    /// of what the body does.
    #[test]
    fn test_mutating_on_class_method_is_an_error() {
        let mut program = Program::new();
        let body = alloc_code_block(&mut program, vec![]);
        let m = method(&mut program, "touch", true, None, body);
        let c = class_with_members(&mut program, "Widget", vec![m]);

        let analyzer = run(&mut program, vec![c]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 4: a function declared to return `Int` whose body returns only
    /// on one branch of an `if` (no `else`) is missing a return.
    #[test]
    fn test_missing_return_on_conditional_only_path() {
        let mut program = Program::new();
        let cond = alloc_int(&mut program, 1);
        let ret_val = alloc_int(&mut program, 2);
        let ret = program.alloc(
            NodeKind::Stmt(Stmt::Return(ReturnStmt { value: Some(ret_val) })),
            SourceInfo::DUMMY,
        );
        let then_branch = alloc_code_block(&mut program, vec![ret]);
        let if_stmt = program.alloc(
            NodeKind::Stmt(Stmt::If(IfStmt { condition: cond, then_branch, else_branch: None })),
            SourceInfo::DUMMY,
        );
        let body = alloc_code_block(&mut program, vec![if_stmt]);
        let ret_ty = alloc_type_ident(&mut program, "Int");
        let f = program.alloc(
            NodeKind::Decl(Decl::Function(FunctionDecl {
                name: Symbol::intern("f"),
                generics: GenericDefinition::default(),
                parameters: NodeId::from_usize(0),
                return_type: Some(ret_ty),
                body: Some(body),
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![f]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 5: a top-level `let` without an initializer is an error.
    #[test]
    fn test_top_level_let_without_initializer_is_an_error() {
        let mut program = Program::new();
        let pattern = alloc_ident_pattern(&mut program, "x");
        let leaf = program.alloc(
            NodeKind::Decl(Decl::ValueBinding(ValueBindingLeaf {
                pattern,
                declared_type: None,
                initializer: None,
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );
        let decl = program.alloc(
            NodeKind::Decl(Decl::Constant(ValueBindingDecl { bindings: vec![leaf], modifiers: DeclModifiers::NONE })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![decl]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 6: a tuple pattern whose initializer is not a matching-arity
    /// tuple is an error.
    #[test]
    fn test_tuple_pattern_arity_mismatch_is_an_error() {
        let mut program = Program::new();
        let pattern_x = alloc_ident_pattern(&mut program, "x");
        let pattern_y = alloc_ident_pattern(&mut program, "y");
        let init = alloc_int(&mut program, 1);
        let leaf_x = program.alloc(
            NodeKind::Decl(Decl::ValueBinding(ValueBindingLeaf {
                pattern: pattern_x,
                declared_type: None,
                initializer: Some(init),
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );
        let leaf_y = program.alloc(
            NodeKind::Decl(Decl::ValueBinding(ValueBindingLeaf {
                pattern: pattern_y,
                declared_type: None,
                initializer: None,
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );
        let group = program.alloc(
            NodeKind::Decl(Decl::ValueBindings(aspenc_ast::items::ValueBindingsGroup {
                temporary: None,
                leaves: vec![leaf_x, leaf_y],
            })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![group]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 7: reassigning the whole of `self` inside a non-mutating enum
    /// method is an error distinct from assigning one of its members.
    #[test]
    fn test_self_reassignment_in_non_mutating_enum_method_is_an_error() {
        let mut program = Program::new();
        let self_expr = alloc_self_expr(&mut program);
        let other_self = alloc_self_expr(&mut program);
        let assign = program.alloc(
            NodeKind::Stmt(Stmt::Assignment(AssignmentStmt { target: self_expr, value: other_self })),
            SourceInfo::DUMMY,
        );
        let body = alloc_code_block(&mut program, vec![assign]);
        let m = method(&mut program, "reset", false, None, body);
        let e = program.alloc(
            NodeKind::Decl(Decl::Enum(aspenc_ast::items::EnumDecl {
                name: Symbol::intern("State"),
                generics: GenericDefinition::default(),
                conformances: vec![],
                cases: vec![],
                members: vec![m],
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![e]);
        assert!(analyzer.handler().has_errors());
    }

    /// SEED 8: a statement following a `return` in the same block is
    /// unreachable and produces a warning, not an error.
    #[test]
    fn test_code_after_return_is_unreachable() {
        let mut program = Program::new();
        let ret_val = alloc_int(&mut program, 1);
        let ret = program.alloc(
            NodeKind::Stmt(Stmt::Return(ReturnStmt { value: Some(ret_val) })),
            SourceInfo::DUMMY,
        );
        let dead = alloc_int(&mut program, 2);
        let dead_stmt = program.alloc(
            NodeKind::Stmt(Stmt::Assignment(AssignmentStmt { target: dead, value: dead })),
            SourceInfo::DUMMY,
        );
        let body = alloc_code_block(&mut program, vec![ret, dead_stmt]);
        let ret_ty = alloc_type_ident(&mut program, "Int");
        let f = program.alloc(
            NodeKind::Decl(Decl::Function(FunctionDecl {
                name: Symbol::intern("f"),
                generics: GenericDefinition::default(),
                parameters: NodeId::from_usize(0),
                return_type: Some(ret_ty),
                body: Some(body),
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![f]);
        assert!(!analyzer.handler().has_errors());
        assert_eq!(analyzer.handler().warning_count(), 1);
    }

    /// EDGE CASE: two overloaded functions with the same name register
    /// without a definition-conflict error.
    #[test]
    fn test_edge_overloaded_functions_do_not_conflict() {
        let mut program = Program::new();
        let body_a = alloc_code_block(&mut program, vec![]);
        let body_b = alloc_code_block(&mut program, vec![]);
        let a = method(&mut program, "f", false, None, body_a);
        let b = method(&mut program, "f", false, None, body_b);

        let analyzer = run(&mut program, vec![a, b]);
        assert!(!analyzer.handler().has_errors());
    }

    /// EDGE CASE: a function with an unresolved return-type annotation
    /// degrades to `Type::Error` rather than panicking.
    #[test]
    fn test_edge_unresolved_return_type_degrades_to_error() {
        let mut program = Program::new();
        let body = alloc_code_block(&mut program, vec![]);
        let bogus_ty = alloc_type_ident(&mut program, "NotARealType");
        let f = program.alloc(
            NodeKind::Decl(Decl::Function(FunctionDecl {
                name: Symbol::intern("f"),
                generics: GenericDefinition::default(),
                parameters: NodeId::from_usize(0),
                return_type: Some(bogus_ty),
                body: Some(body),
                modifiers: DeclModifiers::NONE,
            })),
            SourceInfo::DUMMY,
        );

        let analyzer = run(&mut program, vec![f]);
        assert!(analyzer.handler().has_errors());
    }
}

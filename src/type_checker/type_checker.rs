use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, instrument};

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    config::config::FrontOptions,
    diagnostics::diagnostics::{Diagnostic, Diagnostics},
    symbol_table::symbol_table::{ScopeId, ScopeKind, ScopeTree},
    types::{
        type_set::TypeSet,
        types::{ElementaryKind, Type, TypeId},
    },
    Position, Span,
};

use super::{
    arrays::{check_bracket_list, check_for, check_index},
    expr::{check_assignment, check_binary, check_identifier, check_if, check_literal, check_member, check_unary},
    functions::{check_call, check_fn, check_return},
    matchexpr::check_match,
    scopes::declare_module,
    typeclass::{check_instance, check_typeclass, register_instances},
    typedesc::{ensure_type_decl, resolve_type_desc, Generics},
};

/// A typeclass as seen by its instances.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    /// Stand-in for the generic parameter inside the method signatures
    pub placeholder: Option<TypeId>,
    pub methods: Vec<(String, TypeId)>,
}

#[derive(Debug, Clone)]
pub struct InstanceMethod {
    pub name: String,
    pub node: NodeId,
    pub ty: Option<TypeId>,
}

/// One `instance CLASS TYPE` declaration.
#[derive(Debug, Clone)]
pub struct InstanceInfo {
    pub class: String,
    pub type_name: String,
    pub alias: Option<String>,
    pub is_default: bool,
    pub module: String,
    pub location: Position,
    pub methods: Vec<InstanceMethod>,
}

/// The instance method a `x.method()` call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodTarget {
    pub module: String,
    pub class: String,
    pub type_name: String,
    pub alias: Option<String>,
    /// The method's `FnDecl` inside `module`
    pub method: NodeId,
}

/// Names a module makes available to the modules importing it.
#[derive(Debug, Clone, Default)]
pub struct Exports {
    pub defined_types: FxHashMap<String, TypeId>,
    pub functions: FxHashMap<String, TypeId>,
    pub typeclasses: FxHashMap<String, ClassInfo>,
    pub instances: Vec<InstanceInfo>,
}

/// Everything the pass learned about one module.
#[derive(Debug)]
pub struct ModuleAnalysis {
    pub name: String,
    pub types: TypeSet,
    pub scopes: ScopeTree,
    pub root_scope: ScopeId,
    pub node_scopes: FxHashMap<NodeId, ScopeId>,
    pub node_types: FxHashMap<NodeId, TypeId>,
    pub matched_types: FxHashMap<NodeId, TypeId>,
    pub method_targets: FxHashMap<NodeId, MethodTarget>,
    pub exports: Exports,
}

impl ModuleAnalysis {
    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    /// Rendered type of a node, handy for assertions and dumps.
    pub fn node_type_string(&self, node: NodeId) -> Option<String> {
        self.node_type(node).map(|ty| self.types.to_string(ty))
    }

    pub fn matched_type(&self, case: NodeId) -> Option<TypeId> {
        self.matched_types.get(&case).copied()
    }

    pub fn method_target(&self, call: NodeId) -> Option<&MethodTarget> {
        self.method_targets.get(&call)
    }

    /// The scope a block, function, loop, case or declaration owns.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }
}

pub struct TypeChecker<'a> {
    pub ast: &'a Ast,
    pub options: &'a FrontOptions,
    pub module: String,
    /// Imported modules, plus the standard library
    pub visible: Vec<&'a ModuleAnalysis>,
    pub types: TypeSet,
    pub scopes: ScopeTree,
    pub root_scope: ScopeId,
    /// Scope owned by a node
    pub node_scopes: FxHashMap<NodeId, ScopeId>,
    /// Scope a declaring node was added to
    pub decl_scopes: FxHashMap<NodeId, ScopeId>,
    pub node_types: FxHashMap<NodeId, TypeId>,
    pub matched_types: FxHashMap<NodeId, TypeId>,
    pub method_targets: FxHashMap<NodeId, MethodTarget>,
    pub classes: FxHashMap<String, ClassInfo>,
    pub instances: Vec<InstanceInfo>,
    pub diagnostics: Diagnostics,
    /// Type declarations currently being resolved
    pub resolving: FxHashSet<NodeId>,
    /// Declarations, type or variable, that failed to resolve and were already reported
    pub failed: FxHashSet<NodeId>,
    /// Expected return type of each enclosing function
    pub function_stack: Vec<Option<TypeId>>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        ast: &'a Ast,
        owner: NodeId,
        module: &str,
        options: &'a FrontOptions,
        visible: Vec<&'a ModuleAnalysis>,
    ) -> Self {
        let mut scopes = ScopeTree::new();
        let root_scope = scopes.init(owner, ScopeKind::Module, None);

        TypeChecker {
            ast,
            options,
            module: module.to_string(),
            visible,
            types: TypeSet::new(),
            scopes,
            root_scope,
            node_scopes: FxHashMap::default(),
            decl_scopes: FxHashMap::default(),
            node_types: FxHashMap::default(),
            matched_types: FxHashMap::default(),
            method_targets: FxHashMap::default(),
            classes: FxHashMap::default(),
            instances: vec![],
            diagnostics: Diagnostics::new(),
            resolving: FxHashSet::default(),
            failed: FxHashSet::default(),
            function_stack: vec![],
        }
    }

    pub fn span(&self, node: NodeId) -> &'a Span {
        let ast: &'a Ast = self.ast;
        ast.span(node)
    }

    pub fn error(&mut self, message: impl Into<String>, node: NodeId) {
        let span = self.ast.span(node);
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    pub fn warning(&mut self, message: impl Into<String>, node: NodeId) {
        let span = self.ast.span(node);
        self.diagnostics.push(Diagnostic::warning(message, span));
    }

    pub fn type_string(&self, ty: TypeId) -> String {
        self.types.to_string(ty)
    }

    pub fn nil(&mut self) -> TypeId {
        self.types.elementary(ElementaryKind::Nil)
    }

    pub fn scope_of(&self, node: NodeId, fallback: ScopeId) -> ScopeId {
        self.node_scopes.get(&node).copied().unwrap_or(fallback)
    }

    /// A defined type exported by one of the visible modules.
    pub fn imported_type(&mut self, name: &str) -> Option<TypeId> {
        for module in &self.visible {
            if let Some(ty) = module.exports.defined_types.get(name) {
                return Some(self.types.import(&module.types, *ty));
            }
        }
        None
    }

    /// The signature of a function exported by one of the visible modules.
    pub fn imported_function(&mut self, name: &str) -> Option<TypeId> {
        for module in &self.visible {
            if let Some(ty) = module.exports.functions.get(name) {
                return Some(self.types.import(&module.types, *ty));
            }
        }
        None
    }

    fn exports(&self, body: &[NodeId]) -> Exports {
        let mut exports = Exports {
            typeclasses: self.classes.clone(),
            instances: self.instances.clone(),
            ..Exports::default()
        };

        for statement in body {
            let Some(ty) = self.node_types.get(statement).copied() else {
                continue;
            };
            match self.ast.kind(*statement) {
                NodeKind::TypeDecl { name, .. } => {
                    exports.defined_types.insert(name.clone(), ty);
                }
                NodeKind::FnDecl { name, .. } => {
                    exports.functions.insert(name.clone(), ty);
                }
                _ => {}
            }
        }

        exports
    }

    fn into_analysis(self, body: &[NodeId]) -> (ModuleAnalysis, Diagnostics) {
        let exports = self.exports(body);

        let analysis = ModuleAnalysis {
            name: self.module,
            types: self.types,
            scopes: self.scopes,
            root_scope: self.root_scope,
            node_scopes: self.node_scopes,
            node_types: self.node_types,
            matched_types: self.matched_types,
            method_targets: self.method_targets,
            exports,
        };

        (analysis, self.diagnostics)
    }
}

/// Runs both phases of the pass over the top-level statements of one module.
#[instrument(skip_all, fields(module = name))]
pub fn check_module<'a>(
    ast: &'a Ast,
    owner: NodeId,
    body: &[NodeId],
    name: &str,
    options: &'a FrontOptions,
    visible: Vec<&'a ModuleAnalysis>,
) -> (ModuleAnalysis, Diagnostics) {
    let mut checker = TypeChecker::new(ast, owner, name, options, visible);

    declare_module(&mut checker, body);
    debug!(scopes = checker.scopes.len(), "Declared names");

    register_instances(&mut checker, body);

    let root = checker.root_scope;
    for statement in body {
        check(&mut checker, *statement, root);
    }
    checker.scopes.seal(root);

    info!(
        types = checker.types.len(),
        errors = checker.diagnostics.error_count(),
        "Module checked"
    );
    checker.into_analysis(body)
}

/// Type-checks `node` inside `scope`. `None` means the type could not be
/// determined, and the reason has already been reported.
pub fn check(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) -> Option<TypeId> {
    let ast = checker.ast;

    let ty = match ast.kind(node) {
        NodeKind::Root { children } | NodeKind::Module { body: children, .. } => {
            for child in children {
                check(checker, *child, scope);
            }
            Some(checker.nil())
        }
        NodeKind::Import { .. } => Some(checker.nil()),
        NodeKind::Block { .. } => check_block(checker, node, scope),
        // Declarations keep their own type in node_types
        NodeKind::TypeDecl { .. } => {
            ensure_type_decl(checker, node);
            return Some(checker.nil());
        }
        NodeKind::Typeclass { .. } => return check_typeclass(checker, node, scope),
        NodeKind::TypeInstance { .. } => return check_instance(checker, node, scope),
        NodeKind::FnDecl { .. } => return check_fn(checker, node, scope),
        NodeKind::Return { value } => check_return(checker, node, *value, scope),
        NodeKind::VarDecl { name, ty } => check_var_decl(checker, node, name, *ty, scope),
        NodeKind::Identifier { name } => check_identifier(checker, node, name, scope),
        NodeKind::Integer { .. } | NodeKind::Float { .. } | NodeKind::String { .. } | NodeKind::Bool { .. } => {
            check_literal(checker, node)
        }
        NodeKind::Binary { op, left, right } => check_binary(checker, node, *op, *left, *right, scope),
        NodeKind::Unary { op, operand } => check_unary(checker, node, *op, *operand, scope),
        NodeKind::Assignment { target, value } => check_assignment(checker, node, *target, *value, scope),
        NodeKind::Call { callee, args } => check_call(checker, node, *callee, args, scope),
        NodeKind::Member { object, member } => check_member(checker, node, *object, *member, scope),
        NodeKind::Index { object, index } => check_index(checker, *object, *index, scope),
        NodeKind::BracketList { members } => check_bracket_list(checker, members, scope),
        NodeKind::If { branches, otherwise } => check_if(checker, branches, *otherwise, scope),
        NodeKind::For {
            variable,
            iterable,
            body,
        } => check_for(checker, node, *variable, *iterable, *body, scope),
        NodeKind::Match { subject, cases } => check_match(checker, node, *subject, cases, scope),
        // Cases are only reachable through their match expression
        NodeKind::MatchCase { .. } => None,
        NodeKind::TypeOperator { .. }
        | NodeKind::TypeLeaf { .. }
        | NodeKind::TypeName { .. }
        | NodeKind::TypeWildcard
        | NodeKind::TypeArray { .. } => resolve_type_desc(checker, node, scope, &Generics::default()),
    }?;

    checker.node_types.insert(node, ty);
    Some(ty)
}

/// A block has the type of its last statement, or `nil` when empty.
fn check_block(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) -> Option<TypeId> {
    let ast = checker.ast;
    let NodeKind::Block { statements } = ast.kind(node) else {
        return None;
    };
    let inner = checker.scope_of(node, scope);

    let mut last = Some(checker.nil());
    for statement in statements {
        last = check(checker, *statement, inner);
    }

    checker.scopes.seal(inner);
    last
}

fn check_var_decl(
    checker: &mut TypeChecker,
    node: NodeId,
    name: &str,
    description: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let Some(ty) = resolve_type_desc(checker, description, scope, &Generics::default()) else {
        checker.failed.insert(node);
        return None;
    };

    let declared_in = checker.decl_scopes.get(&node).copied().unwrap_or(scope);
    checker.scopes.set_type(declared_in, name, ty);
    debug!(name, ty = %checker.type_string(ty), "Variable declared");

    Some(ty)
}

/// Whether `ty` is an array, looking through names.
pub fn as_array(types: &TypeSet, ty: TypeId) -> Option<(TypeId, Vec<Option<u64>>)> {
    match types.get(types.strip(ty)) {
        Type::Array { member, dimensions } => Some((*member, dimensions.clone())),
        _ => None,
    }
}

//! First phase: build the scope tree and register every declared name.

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        types::{collect_leaves, leaf_name},
    },
    symbol_table::symbol_table::{ScopeId, ScopeKind},
};

use super::type_checker::TypeChecker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameKind {
    Type,
    Identifier,
    Function,
}

pub fn declare_module(checker: &mut TypeChecker, body: &[NodeId]) {
    let root = checker.root_scope;
    for statement in body {
        declare(checker, *statement, root);
    }
}

fn open_scope(checker: &mut TypeChecker, owner: NodeId, kind: ScopeKind, parent: ScopeId) -> ScopeId {
    let scope = checker.scopes.init(owner, kind, Some(parent));
    checker.node_scopes.insert(owner, scope);
    scope
}

/// Adds `name` to `scope`, reporting a redefinition inside the same scope.
fn add_name(checker: &mut TypeChecker, scope: ScopeId, name: &str, node: NodeId, kind: NameKind) {
    if checker.scopes.add(scope, name, node) {
        checker.decl_scopes.insert(node, scope);
        return;
    }

    let previous = match checker.scopes.lookup(scope, name) {
        (Some(record), true) => record.node,
        _ => return,
    };
    let location = &checker.span(previous).start;

    let message = match kind {
        NameKind::Type => format!("Type \"{}\" was already declared in scope at {}", name, location),
        NameKind::Identifier => format!("Identifier \"{}\" was already used in scope at {}", name, location),
        NameKind::Function => format!("Function \"{}\" was already declared at {}", name, location),
    };
    checker.error(message, node);
}

fn declare_leaves(checker: &mut TypeChecker, description: NodeId, scope: ScopeId) {
    let ast = checker.ast;
    for leaf in collect_leaves(ast, description) {
        if let Some(name) = leaf_name(ast, leaf) {
            add_name(checker, scope, name, leaf, NameKind::Identifier);
        }
    }
}

fn declare_function(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) {
    let ast = checker.ast;
    let NodeKind::FnDecl { name, args, body, .. } = ast.kind(node) else {
        return;
    };

    add_name(checker, scope, name, node, NameKind::Function);

    let inner = open_scope(checker, node, ScopeKind::Function, scope);
    if let Some(args) = args {
        declare_leaves(checker, *args, inner);
    }
    if let Some(body) = body {
        declare(checker, *body, inner);
    }
}

fn declare(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) {
    let ast = checker.ast;

    match ast.kind(node) {
        NodeKind::TypeDecl { name, description } => {
            add_name(checker, scope, name, node, NameKind::Type);
            let inner = open_scope(checker, node, ScopeKind::TypeDescription, scope);
            declare_leaves(checker, *description, inner);
        }
        NodeKind::Typeclass {
            name,
            generics,
            methods,
        } => {
            add_name(checker, scope, name, node, NameKind::Type);
            let inner = open_scope(checker, node, ScopeKind::Typeclass, scope);
            for generic in generics {
                add_name(checker, inner, &generic.name, node, NameKind::Type);
            }
            for method in methods {
                declare_function(checker, *method, inner);
            }
        }
        NodeKind::TypeInstance { methods, .. } => {
            let inner = open_scope(checker, node, ScopeKind::TypeInstance, scope);
            for method in methods {
                declare_function(checker, *method, inner);
            }
        }
        NodeKind::FnDecl { .. } => declare_function(checker, node, scope),
        NodeKind::VarDecl { name, .. } => add_name(checker, scope, name, node, NameKind::Identifier),
        NodeKind::Block { statements } => {
            let inner = open_scope(checker, node, ScopeKind::Block, scope);
            for statement in statements {
                declare(checker, *statement, inner);
            }
        }
        NodeKind::For {
            variable,
            iterable,
            body,
        } => {
            declare(checker, *iterable, scope);
            let inner = open_scope(checker, node, ScopeKind::For, scope);
            if let Some(name) = ast.identifier_name(*variable) {
                add_name(checker, inner, name, *variable, NameKind::Identifier);
            }
            declare(checker, *body, inner);
        }
        NodeKind::MatchCase { pattern, body } => {
            let inner = open_scope(checker, node, ScopeKind::MatchCase, scope);
            declare_leaves(checker, *pattern, inner);
            declare(checker, *body, inner);
        }
        _ => {
            for child in ast.children(node) {
                declare(checker, child, scope);
            }
        }
    }
}

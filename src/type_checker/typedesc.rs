use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    ast::ast::{NodeId, NodeKind},
    symbol_table::symbol_table::ScopeId,
    types::types::{ElementaryKind, Type, TypeId},
};

use super::type_checker::TypeChecker;

/// Generic parameters in scope, mapped to their placeholder types.
pub type Generics = FxHashMap<String, TypeId>;

/// Outcome of looking up a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(TypeId),
    /// The declaration exists but could not be resolved. Already reported.
    Failed,
    Missing,
}

/// Turns a type description into a type, recording the type of every
/// description node along the way.
pub fn resolve_type_desc(
    checker: &mut TypeChecker,
    node: NodeId,
    scope: ScopeId,
    generics: &Generics,
) -> Option<TypeId> {
    let ast = checker.ast;

    let ty = match ast.kind(node) {
        NodeKind::TypeName { name } => resolve_type_name(checker, node, name, scope, generics)?,
        NodeKind::TypeWildcard => checker.types.intern(Type::Wildcard),
        NodeKind::TypeOperator { op, left, right } => {
            let left = resolve_type_desc(checker, *left, scope, generics);
            let right = resolve_type_desc(checker, *right, scope, generics);
            checker.types.operator(*op, vec![left?, right?])
        }
        NodeKind::TypeLeaf { name, ty } => {
            let inner = resolve_type_desc(checker, *ty, scope, generics)?;
            if let Some(declared_in) = checker.decl_scopes.get(&node).copied() {
                checker.scopes.set_type(declared_in, name, inner);
            }
            checker.types.intern(Type::Leaf {
                name: name.clone(),
                ty: inner,
            })
        }
        NodeKind::TypeArray { member, dimensions } => {
            let member = resolve_type_desc(checker, *member, scope, generics)?;
            checker.types.array(member, dimensions.clone())
        }
        _ => return None,
    };

    checker.node_types.insert(node, ty);
    Some(ty)
}

/// Resolves a type by name: a generic, an elementary type, or a defined type
/// visible from `scope` or exported by a visible module.
pub fn resolve_type_name(
    checker: &mut TypeChecker,
    node: NodeId,
    name: &str,
    scope: ScopeId,
    generics: &Generics,
) -> Option<TypeId> {
    if let Some(ty) = generics.get(name) {
        return Some(*ty);
    }
    if let Some(kind) = ElementaryKind::from_name(name) {
        return Some(checker.types.elementary(kind));
    }

    if let Some(declaration) = checker.scopes.lookup(scope, name).0.map(|record| record.node) {
        if checker.resolving.contains(&declaration) {
            checker.error(format!("Recursive type definition of \"{}\" detected.", name), node);
            checker.failed.insert(declaration);
            return None;
        }
    }

    match lookup_type(checker, scope, name) {
        Lookup::Found(ty) => Some(ty),
        Lookup::Failed => None,
        Lookup::Missing => {
            checker.error(format!("Type \"{}\" is not defined", name), node);
            None
        }
    }
}

pub fn lookup_type(checker: &mut TypeChecker, scope: ScopeId, name: &str) -> Lookup {
    let ast = checker.ast;
    let declaration = checker.scopes.lookup(scope, name).0.map(|record| record.node);

    if let Some(declaration) = declaration {
        if matches!(ast.kind(declaration), NodeKind::TypeDecl { .. }) {
            return match ensure_type_decl(checker, declaration) {
                Some(ty) => Lookup::Found(ty),
                None => Lookup::Failed,
            };
        }
    }

    match checker.imported_type(name) {
        Some(ty) => Lookup::Found(ty),
        None => Lookup::Missing,
    }
}

/// Resolves a type declaration the first time it is needed.
pub fn ensure_type_decl(checker: &mut TypeChecker, node: NodeId) -> Option<TypeId> {
    if let Some(ty) = checker.node_types.get(&node) {
        return Some(*ty);
    }
    if checker.failed.contains(&node) {
        return None;
    }

    let ast = checker.ast;
    let NodeKind::TypeDecl { name, description } = ast.kind(node) else {
        return None;
    };

    if !checker.resolving.insert(node) {
        debug!(name = %name, "Recursive type declaration left undetermined");
        return None;
    }

    let inner_scope = checker.scope_of(node, checker.root_scope);
    let description = resolve_type_desc(checker, *description, inner_scope, &Generics::default());
    checker.resolving.remove(&node);

    let Some(description) = description else {
        checker.failed.insert(node);
        return None;
    };

    let ty = checker.types.intern(Type::Defined {
        name: name.clone(),
        ty: description,
    });
    checker.node_types.insert(node, ty);
    if let Some(declared_in) = checker.decl_scopes.get(&node).copied() {
        checker.scopes.set_type(declared_in, name, ty);
    }
    checker.scopes.seal(inner_scope);

    debug!(name = %name, ty = %checker.types.to_string_with_contents(ty), "Type declared");
    Some(ty)
}

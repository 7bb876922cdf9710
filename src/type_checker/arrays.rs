//! Bracket lists, index access and for expressions.

use crate::{
    ast::ast::{NodeId, NodeKind},
    symbol_table::symbol_table::ScopeId,
    types::{
        compare::{compare, ordinal, ComparisonFlags, ComparisonMode, Mismatch},
        types::{Type, TypeId},
    },
};

use super::{
    expr::resolve_name,
    type_checker::{as_array, check, TypeChecker},
    typedesc::Lookup,
};

pub fn check_bracket_list(
    checker: &mut TypeChecker,
    members: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    if members.is_empty() {
        let wildcard = checker.types.intern(Type::Wildcard);
        return Some(checker.types.array(wildcard, vec![Some(0)]));
    }

    let member_types: Vec<Option<TypeId>> = members
        .iter()
        .map(|member| check(checker, *member, scope))
        .collect();
    let member_types: Vec<TypeId> = member_types.into_iter().collect::<Option<_>>()?;

    let integer_constants = member_types.iter().all(|ty| {
        checker.types.is_constant(*ty)
            && checker
                .types
                .elementary_kind(*ty)
                .is_some_and(|kind| kind.is_integer())
    });

    let first = member_types[0];
    let member = if integer_constants {
        member_types
            .iter()
            .copied()
            .max_by_key(|ty| checker.types.elementary_kind(*ty))
            .unwrap_or(first)
    } else {
        for (index, ty) in member_types.iter().enumerate().skip(1) {
            let result = compare(
                &checker.types,
                *ty,
                first,
                ComparisonMode::ImplicitConversion,
                ComparisonFlags::default(),
            );
            if !result.success {
                let message = format!(
                    "Type of the {} item in a bracket list is \"{}\" which does not match the type of the first time \"{}\"",
                    ordinal(index + 1),
                    checker.type_string(*ty),
                    checker.type_string(first)
                );
                checker.error(message, members[index]);
                return None;
            }
        }
        first
    };

    Some(checker.types.array(member, vec![Some(members.len() as u64)]))
}

pub fn check_index(
    checker: &mut TypeChecker,
    object: NodeId,
    index: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;
    let object_type = check(checker, object, scope);
    let index_type = check(checker, index, scope);
    let (object_type, index_type) = (object_type?, index_type?);

    let Some((member, dimensions)) = as_array(&checker.types, object_type) else {
        let message = format!(
            "Applying index access operator at non-array type \"{}\".",
            checker.type_string(object_type)
        );
        checker.error(message, object);
        return None;
    };

    let is_integer = checker
        .types
        .elementary_kind(index_type)
        .is_some_and(|kind| kind.is_integer());
    if !is_integer {
        let message = format!(
            "Expected an integer type for the index but got \"{}\".",
            checker.type_string(index_type)
        );
        checker.error(message, index);
        return None;
    }

    if let (NodeKind::Integer { value }, Some(Some(size))) = (ast.kind(index), dimensions.first()) {
        if value >= size {
            let message = format!(
                "Accessing array out of bounds. Array size is '{}' and you are attempting to access index '{}'.",
                size, value
            );
            checker.error(message, index);
            return None;
        }
    }

    if dimensions.len() > 1 {
        Some(checker.types.array(member, dimensions[1..].to_vec()))
    } else {
        Some(member)
    }
}

/// A for expression yields an array of its body's type, shaped like the
/// iterated array.
pub fn check_for(
    checker: &mut TypeChecker,
    node: NodeId,
    variable: NodeId,
    iterable: NodeId,
    body: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;

    let iterable_type = match ast.kind(iterable) {
        NodeKind::Identifier { name } => match resolve_name(checker, scope, name) {
            Lookup::Found(ty) => {
                checker.node_types.insert(iterable, ty);
                ty
            }
            Lookup::Failed => return None,
            Lookup::Missing => {
                let message = format!("Undeclared identifier \"{}\" as the iterable of a for expression", name);
                checker.error(message, iterable);
                return None;
            }
        },
        _ => check(checker, iterable, scope)?,
    };

    let Some((member, dimensions)) = as_array(&checker.types, iterable_type) else {
        let message = format!(
            "Trying to iterate over non-iterable type \"{}\".",
            checker.type_string(iterable_type)
        );
        checker.error(message, iterable);
        return None;
    };

    let loop_scope = checker.scope_of(node, scope);
    if let Some(name) = ast.identifier_name(variable) {
        checker.scopes.set_type(loop_scope, name, member);
        checker.node_types.insert(variable, member);
    }

    let body_type = check(checker, body, loop_scope);
    checker.scopes.seal(loop_scope);

    Some(checker.types.array(body_type?, dimensions))
}

/// The array-specific reason for a failed assignment of a for expression.
pub fn for_mismatch_reason(checker: &TypeChecker, from: TypeId, to: TypeId) -> Option<Mismatch> {
    let (from_member, from_dimensions) = as_array(&checker.types, from)?;
    let (to_member, to_dimensions) = as_array(&checker.types, to)?;

    let members = compare(
        &checker.types,
        from_member,
        to_member,
        ComparisonMode::ImplicitConversion,
        ComparisonFlags::default(),
    );
    if !members.success {
        return Some(Mismatch::ArrayMemberMismatch {
            from: checker.type_string(from_member),
            to: checker.type_string(to_member),
        });
    }

    from_dimensions
        .iter()
        .zip(&to_dimensions)
        .enumerate()
        .find_map(|(index, (from, to))| match (from, to) {
            (Some(from), Some(to)) if from != to => Some(Mismatch::ArrayDimensionMismatch {
                ordinal: ordinal(index + 1),
                from: *from,
                to: *to,
            }),
            _ => None,
        })
}

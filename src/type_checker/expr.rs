use tracing::debug;

use crate::{
    ast::{
        ast::{IfBranch, NodeId, NodeKind},
        expressions::{BinaryOperator, UnaryOperator},
    },
    symbol_table::symbol_table::ScopeId,
    types::{
        compare::{compare, ComparisonFlags, ComparisonMode, Mismatch},
        type_set::TypeSet,
        types::{ElementaryKind, Type, TypeId},
    },
};

use super::{
    arrays::for_mismatch_reason,
    functions::ensure_fn_signature,
    type_checker::{as_array, check, TypeChecker},
    typedesc::{ensure_type_decl, Lookup},
};

/// Resolves a value name: a variable, a function or a defined type.
///
/// A variable whose type is still pending counts as missing, unless its
/// declaration already failed.
pub fn resolve_name(checker: &mut TypeChecker, scope: ScopeId, name: &str) -> Lookup {
    let ast = checker.ast;
    let found = checker
        .scopes
        .lookup(scope, name)
        .0
        .map(|record| (record.node, record.ty));

    if let Some((declaration, ty)) = found {
        let resolved = match ast.kind(declaration) {
            NodeKind::TypeDecl { .. } => ensure_type_decl(checker, declaration),
            NodeKind::FnDecl { .. } => ensure_fn_signature(checker, declaration),
            NodeKind::Typeclass { .. } | NodeKind::TypeInstance { .. } => return Lookup::Missing,
            _ if ty.is_none() && checker.failed.contains(&declaration) => return Lookup::Failed,
            _ => return ty.map(Lookup::Found).unwrap_or(Lookup::Missing),
        };
        return resolved.map(Lookup::Found).unwrap_or(Lookup::Failed);
    }

    if let Some(ty) = checker.imported_function(name) {
        return Lookup::Found(ty);
    }
    match checker.imported_type(name) {
        Some(ty) => Lookup::Found(ty),
        None => Lookup::Missing,
    }
}

pub fn check_identifier(checker: &mut TypeChecker, node: NodeId, name: &str, scope: ScopeId) -> Option<TypeId> {
    match resolve_name(checker, scope, name) {
        Lookup::Found(ty) => Some(ty),
        Lookup::Failed => None,
        Lookup::Missing => {
            checker.error(format!("Undeclared identifier \"{}\"", name), node);
            None
        }
    }
}

pub fn check_literal(checker: &mut TypeChecker, node: NodeId) -> Option<TypeId> {
    let kind = match checker.ast.kind(node) {
        NodeKind::Integer { value } => ElementaryKind::for_literal(*value),
        NodeKind::Float { .. } => ElementaryKind::F64,
        NodeKind::String { .. } => ElementaryKind::String,
        NodeKind::Bool { .. } => ElementaryKind::Bool,
        _ => return None,
    };
    Some(checker.types.constant(kind))
}

fn operator_accepts(op: BinaryOperator, kind: ElementaryKind) -> bool {
    match op {
        BinaryOperator::Add | BinaryOperator::Sub => kind.is_numeric() || kind == ElementaryKind::String,
        BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => kind.is_numeric(),
        BinaryOperator::And | BinaryOperator::Or => kind.is_integer() || kind == ElementaryKind::Bool,
        _ => kind.is_numeric() || kind == ElementaryKind::String || kind == ElementaryKind::Bool,
    }
}

fn operands_compatible(op: BinaryOperator, left: ElementaryKind, right: ElementaryKind) -> bool {
    left == right || (left.is_numeric() && right.is_numeric()) || op.is_logical()
}

/// Result kind of arithmetic between two numeric kinds.
pub fn numeric_result(left: ElementaryKind, right: ElementaryKind) -> ElementaryKind {
    if left.is_float() || right.is_float() {
        if left == ElementaryKind::F64 || right == ElementaryKind::F64 {
            ElementaryKind::F64
        } else {
            ElementaryKind::F32
        }
    } else {
        left.max(right)
    }
}

fn with_constness(types: &mut TypeSet, kind: ElementaryKind, is_constant: bool) -> TypeId {
    if is_constant {
        types.constant(kind)
    } else {
        types.elementary(kind)
    }
}

pub fn check_binary(
    checker: &mut TypeChecker,
    node: NodeId,
    op: BinaryOperator,
    left: NodeId,
    right: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let left_type = check(checker, left, scope);
    let right_type = check(checker, right, scope);

    if left_type.is_none() {
        checker.error(format!("Type of left side of \"{}\" can not be determined", op), left);
    }
    if right_type.is_none() {
        checker.error(format!("Type of right side of \"{}\" can not be determined", op), right);
    }
    let (left_type, right_type) = (left_type?, right_type?);

    let left_kind = checker.types.elementary_kind(left_type);
    let right_kind = checker.types.elementary_kind(right_type);

    for (ty, kind) in [(left_type, left_kind), (right_type, right_kind)] {
        if !kind.is_some_and(|kind| operator_accepts(op, kind)) {
            let message = format!("Can't apply \"{}\" to \"{}\"", op, checker.type_string(ty));
            checker.error(message, node);
            return None;
        }
    }
    let (left_kind, right_kind) = (left_kind?, right_kind?);

    if !operands_compatible(op, left_kind, right_kind) {
        let message = format!(
            "Can't apply \"{}\" to \"{}\" and \"{}\"",
            op,
            checker.type_string(left_type),
            checker.type_string(right_type)
        );
        checker.error(message, node);
        return None;
    }

    if op.is_comparison() || op.is_logical() {
        return Some(checker.types.elementary(ElementaryKind::Bool));
    }

    let is_constant = checker.types.is_constant(left_type) && checker.types.is_constant(right_type);
    let kind = if left_kind == ElementaryKind::String {
        ElementaryKind::String
    } else {
        numeric_result(left_kind, right_kind)
    };

    Some(with_constness(&mut checker.types, kind, is_constant))
}

pub fn check_unary(
    checker: &mut TypeChecker,
    node: NodeId,
    op: UnaryOperator,
    operand: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let ty = check(checker, operand, scope)?;
    let kind = checker.types.elementary_kind(ty);

    let accepted = kind.is_some_and(|kind| match op {
        UnaryOperator::Not => kind.is_integer() || kind == ElementaryKind::Bool,
        _ => kind.is_numeric(),
    });
    let Some(kind) = kind.filter(|_| accepted) else {
        let message = format!("Can't apply \"{}\" to \"{}\"", op, checker.type_string(ty));
        checker.error(message, node);
        return None;
    };

    let is_constant = checker.types.is_constant(ty);
    Some(match op {
        UnaryOperator::Not => checker.types.elementary(ElementaryKind::Bool),
        UnaryOperator::Negate => with_constness(&mut checker.types, kind.to_signed(), is_constant),
        _ => ty,
    })
}

/// `u64[] = [1, 2, 3]` makes the declaration a `u64[3]`.
fn adopt_dimensions(types: &mut TypeSet, target: TypeId, value: TypeId) -> Option<TypeId> {
    let Type::Array { member, dimensions } = types.get(target).clone() else {
        return None;
    };
    if !dimensions.iter().any(Option::is_none) {
        return None;
    }

    let (_, value_dimensions) = as_array(types, value)?;
    if value_dimensions.len() != dimensions.len() {
        return None;
    }

    let adopted = dimensions
        .iter()
        .zip(&value_dimensions)
        .map(|(declared, assigned)| declared.or(*assigned))
        .collect();
    Some(types.array(member, adopted))
}

pub fn check_assignment(
    checker: &mut TypeChecker,
    node: NodeId,
    target: NodeId,
    value: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;

    let value_type = check(checker, value, scope);
    let target_type = check(checker, target, scope);

    if target_type.is_none() {
        checker.error("Type of left side of \"=\" can not be determined", target);
    }
    if value_type.is_none() {
        checker.error("Type of right side of \"=\" can not be determined", value);
    }
    let (mut target_type, value_type) = (target_type?, value_type?);

    if let Some(adopted) = adopt_dimensions(&mut checker.types, target_type, value_type) {
        target_type = adopted;
        checker.node_types.insert(target, adopted);
        if let NodeKind::VarDecl { name, .. } = ast.kind(target) {
            let declared_in = checker.decl_scopes.get(&target).copied().unwrap_or(scope);
            checker.scopes.set_type(declared_in, name, adopted);
        }
    }

    let result = compare(
        &checker.types,
        value_type,
        target_type,
        ComparisonMode::ImplicitConversion,
        ComparisonFlags::default(),
    );

    if !result.success {
        let reason = match ast.kind(value) {
            NodeKind::For { .. } => for_mismatch_reason(checker, value_type, target_type)
                .map(|mismatch| format!(" {}", mismatch))
                .unwrap_or_else(|| result.reason_suffix()),
            _ => result.reason_suffix(),
        };
        let message = format!(
            "Assignment between incompatible types. Can't assign \"{}\" to \"{}\".{}",
            checker.type_string(value_type),
            checker.type_string(target_type),
            reason
        );
        checker.error(message, node);
        return None;
    }

    // Literal kinds are unsigned, so a same-width signed target needs the value
    let signed_max = checker
        .types
        .elementary_kind(target_type)
        .and_then(|kind| kind.signed_max());
    if let (NodeKind::Integer { value: literal }, Some(max)) = (ast.kind(value), signed_max) {
        if *literal > max {
            let (from, to) = (checker.type_string(value_type), checker.type_string(target_type));
            let message = format!(
                "Assignment between incompatible types. Can't assign \"{}\" to \"{}\". {}",
                from,
                to,
                Mismatch::LargerConstant {
                    from: from.clone(),
                    to: to.clone()
                }
            );
            checker.error(message, node);
            return None;
        }
    }

    if checker.options.warn_on_implicit_conversions {
        for warning in &result.warnings {
            checker.warning(warning.to_string(), node);
        }
    }

    // A bracket list takes the member type of the array it is assigned to
    if let (NodeKind::BracketList { .. }, Some((member, _)), Some((_, dimensions))) = (
        ast.kind(value),
        as_array(&checker.types, target_type),
        as_array(&checker.types, value_type),
    ) {
        let list_type = checker.types.array(member, dimensions);
        checker.node_types.insert(value, list_type);
    }

    debug!(ty = %checker.type_string(target_type), "Assignment checked");
    Some(target_type)
}

pub fn check_if(
    checker: &mut TypeChecker,
    branches: &[IfBranch],
    otherwise: Option<NodeId>,
    scope: ScopeId,
) -> Option<TypeId> {
    let boolean = checker.types.elementary(ElementaryKind::Bool);

    for branch in branches {
        if let Some(condition) = check(checker, branch.condition, scope) {
            let result = compare(
                &checker.types,
                condition,
                boolean,
                ComparisonMode::ImplicitConversion,
                ComparisonFlags::default(),
            );
            if !result.success {
                let message = format!(
                    "If condition of type \"{}\" can not be used as a boolean value",
                    checker.type_string(condition)
                );
                checker.error(message, branch.condition);
            }
        }
        check(checker, branch.body, scope);
    }

    if let Some(otherwise) = otherwise {
        check(checker, otherwise, scope);
    }

    Some(checker.nil())
}

/// Finds the field `name` of a composite type. Fields nested inside another
/// field's type are not searched.
pub fn find_member(types: &TypeSet, ty: TypeId, name: &str) -> Option<TypeId> {
    match types.get(ty) {
        Type::Defined { ty, .. } => find_member(types, *ty, name),
        Type::Operator { operands, .. } => operands
            .iter()
            .find_map(|operand| find_member(types, *operand, name)),
        Type::Leaf { name: field, ty } => (field == name).then_some(*ty),
        _ => None,
    }
}

pub fn check_member(
    checker: &mut TypeChecker,
    node: NodeId,
    object: NodeId,
    member: NodeId,
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;
    let member_name = ast.identifier_name(member)?;

    let object_type = match ast.kind(object) {
        NodeKind::Identifier { name } => match resolve_name(checker, scope, name) {
            Lookup::Found(ty) => {
                checker.node_types.insert(object, ty);
                ty
            }
            Lookup::Failed => return None,
            Lookup::Missing => {
                let message = format!("Undeclared identifier \"{}\" as left part of member access operator", name);
                checker.error(message, object);
                return None;
            }
        },
        _ => check(checker, object, scope)?,
    };

    match find_member(&checker.types, object_type, member_name) {
        Some(ty) => {
            checker.node_types.insert(member, ty);
            Some(ty)
        }
        None => {
            let message = format!(
                "Could not find member \"{}\" in type \"{}\"",
                member_name,
                checker.type_string(object_type)
            );
            checker.error(message, node);
            None
        }
    }
}

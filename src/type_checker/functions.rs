use tracing::debug;

use crate::{
    ast::ast::{NodeId, NodeKind},
    symbol_table::symbol_table::ScopeId,
    types::{
        compare::{compare, ComparisonFlags, ComparisonMode},
        types::{ElementaryKind, Type, TypeId, TypeOperator},
    },
};

use super::{
    matchexpr::check_cases,
    type_checker::{check, TypeChecker},
    typeclass::check_method_call,
    typedesc::{ensure_type_decl, resolve_type_desc, Generics, Lookup},
};

/// Resolves `fn NAME(ARGS) -> RET` to `Function(ARGS, RET)`. A missing
/// argument list or return type is `nil`.
pub fn resolve_signature(checker: &mut TypeChecker, node: NodeId, generics: &Generics) -> Option<TypeId> {
    let ast = checker.ast;
    let NodeKind::FnDecl { args, ret, .. } = ast.kind(node) else {
        return None;
    };
    let inner = checker.scope_of(node, checker.root_scope);

    let arg = match args {
        Some(args) => resolve_type_desc(checker, *args, inner, generics),
        None => Some(checker.nil()),
    };
    let ret = match ret {
        Some(ret) => resolve_type_desc(checker, *ret, inner, generics),
        None => Some(checker.nil()),
    };

    let (Some(arg), Some(ret)) = (arg, ret) else {
        checker.failed.insert(node);
        return None;
    };

    let signature = checker.types.function(arg, ret);
    checker.node_types.insert(node, signature);
    Some(signature)
}

/// The signature of a plain function, resolved on first use.
pub fn ensure_fn_signature(checker: &mut TypeChecker, node: NodeId) -> Option<TypeId> {
    if let Some(ty) = checker.node_types.get(&node) {
        return Some(*ty);
    }
    if checker.failed.contains(&node) {
        return None;
    }

    resolve_signature(checker, node, &Generics::default())
}

pub fn check_fn(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) -> Option<TypeId> {
    let ast = checker.ast;
    let NodeKind::FnDecl { name, body, .. } = ast.kind(node) else {
        return None;
    };
    let inner = checker.scope_of(node, scope);

    let signature = ensure_fn_signature(checker, node).and_then(|signature| callable(checker, signature));
    let ret = signature.map(|(_, ret)| ret);

    if let Some(body) = body {
        checker.function_stack.push(ret);
        match (ast.kind(*body), signature) {
            (NodeKind::Match { subject: None, cases }, Some((arg, ret))) => {
                let scrutinee = checker.types.strip_leaf(arg);
                if let Some(ty) = check_cases(checker, *body, scrutinee, name, cases, inner) {
                    checker.node_types.insert(*body, ty);
                    check_returned(checker, *body, ty, ret);
                }
            }
            (NodeKind::Match { subject: None, .. }, None) => {}
            _ => {
                check(checker, *body, inner);
            }
        }
        checker.function_stack.pop();
    }

    checker.scopes.seal(inner);
    debug!(name = %name, "Function checked");
    Some(checker.nil())
}

fn check_returned(checker: &mut TypeChecker, node: NodeId, actual: TypeId, expected: TypeId) {
    let result = compare(
        &checker.types,
        actual,
        expected,
        ComparisonMode::ImplicitConversion,
        ComparisonFlags::default(),
    );
    if !result.success {
        let message = format!(
            "Return statement type \"{}\" does not match the expected return type of \"{}\"",
            checker.type_string(actual),
            checker.type_string(expected)
        );
        checker.error(message, node);
    }
}

pub fn check_return(checker: &mut TypeChecker, node: NodeId, value: Option<NodeId>, scope: ScopeId) -> Option<TypeId> {
    let Some(expected) = checker.function_stack.last().copied() else {
        if let Some(value) = value {
            check(checker, value, scope);
        }
        checker.error("Return statement outside of a function", node);
        return None;
    };

    let actual = match value {
        Some(value) => check(checker, value, scope)?,
        None => checker.nil(),
    };

    if let Some(expected) = expected {
        check_returned(checker, node, actual, expected);
    }
    Some(actual)
}

/// `u64(x)`: an explicit conversion to an elementary type. The result keeps
/// the constness of the converted value.
fn check_explicit_conversion(
    checker: &mut TypeChecker,
    node: NodeId,
    target: ElementaryKind,
    args: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    let target_type = checker.types.elementary(target);

    let [arg] = args else {
        for arg in args {
            check(checker, *arg, scope);
        }
        checker.error(
            format!("Invalid arguments for explicit conversion to \"{}\".", target.name()),
            node,
        );
        return Some(target_type);
    };

    let Some(from) = check(checker, *arg, scope) else {
        return Some(target_type);
    };

    let result = compare(
        &checker.types,
        from,
        target_type,
        ComparisonMode::ExplicitConversion,
        ComparisonFlags::default(),
    );
    if !result.success {
        checker.error(format!("Invalid explicit conversion.{}", result.reason_suffix()), node);
        return Some(target_type);
    }

    if checker.types.is_constant(from) {
        Some(checker.types.constant(target))
    } else {
        Some(target_type)
    }
}

/// What calling `name` means: a function signature, or a constructor taking
/// the defined type's shape.
fn resolve_callee(checker: &mut TypeChecker, scope: ScopeId, name: &str) -> Lookup {
    let ast = checker.ast;
    let found = checker
        .scopes
        .lookup(scope, name)
        .0
        .map(|record| (record.node, record.ty));

    let ty = match found {
        Some((declaration, ty)) => match ast.kind(declaration) {
            NodeKind::FnDecl { .. } => ensure_fn_signature(checker, declaration).ok_or(Lookup::Failed),
            NodeKind::TypeDecl { .. } => ensure_type_decl(checker, declaration).ok_or(Lookup::Failed),
            _ => ty.ok_or(Lookup::Missing),
        },
        None => checker
            .imported_function(name)
            .or_else(|| checker.imported_type(name))
            .ok_or(Lookup::Missing),
    };

    match ty {
        Ok(ty) => Lookup::Found(ty),
        Err(lookup) => lookup,
    }
}

/// Splits a function signature, or a defined type used as its own
/// constructor, into parameter and result types.
fn callable(checker: &TypeChecker, ty: TypeId) -> Option<(TypeId, TypeId)> {
    match checker.types.get(ty) {
        Type::Function { arg, ret } => Some((*arg, *ret)),
        Type::Defined { ty: shape, .. } => Some((*shape, ty)),
        _ => None,
    }
}

pub fn check_call(
    checker: &mut TypeChecker,
    node: NodeId,
    callee: NodeId,
    args: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;

    if let NodeKind::Member { object, member } = ast.kind(callee) {
        return check_method_call(checker, node, *object, *member, args, scope);
    }

    let Some(name) = ast.identifier_name(callee) else {
        for arg in args {
            check(checker, *arg, scope);
        }
        let callee_type = check(checker, callee, scope)?;
        let message = format!("Undefined function call \"{}\" detected", checker.type_string(callee_type));
        checker.error(message, node);
        return None;
    };

    if let Some(kind) = ElementaryKind::from_name(name) {
        return check_explicit_conversion(checker, node, kind, args, scope);
    }

    let arg_types: Vec<Option<TypeId>> = args.iter().map(|arg| check(checker, *arg, scope)).collect();

    let callee_type = match resolve_callee(checker, scope, name) {
        Lookup::Found(ty) => callable(checker, ty),
        Lookup::Failed => return None,
        Lookup::Missing => None,
    };
    let Some((param, ret)) = callee_type else {
        checker.error(format!("Undefined function call \"{}\" detected", name), node);
        return None;
    };
    let signature = checker.types.function(param, ret);
    checker.node_types.insert(callee, signature);

    // An undetermined argument was already reported
    let Some(arg_types) = arg_types.into_iter().collect::<Option<Vec<_>>>() else {
        return Some(ret);
    };
    let actual = if arg_types.is_empty() {
        checker.nil()
    } else {
        checker.types.product(arg_types)
    };

    if !check_arguments(checker, node, name, actual, param) {
        return None;
    }
    Some(ret)
}

/// Compares the actual argument product against the declared parameter type
/// and reports a mismatch at `node`.
pub fn check_arguments(checker: &mut TypeChecker, node: NodeId, name: &str, actual: TypeId, param: TypeId) -> bool {
    let is_sum = matches!(
        checker.types.get(checker.types.strip_leaf(param)),
        Type::Operator {
            op: TypeOperator::Sum,
            ..
        }
    );
    let (mode, flags) = if is_sum {
        (ComparisonMode::PatternMatching, ComparisonFlags::function_call())
    } else {
        (ComparisonMode::ImplicitConversion, ComparisonFlags::default())
    };

    let result = compare(&checker.types, actual, param, mode, flags);
    if !result.success {
        let message = format!(
            "function {}() is called with argument type of \"{}\" which does not match the expected type of \"{}\".{}",
            name,
            checker.type_string(actual),
            checker.type_string(param),
            result.reason_suffix()
        );
        checker.error(message, node);
        return false;
    }

    debug!(name, "Call checked");
    true
}

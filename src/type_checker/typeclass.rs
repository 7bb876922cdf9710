//! Typeclasses, their instances, and `value.method()` calls.
//!
//! A class method signature is resolved with the class generic bound to a
//! placeholder type. An instance method matches the class method when its
//! signature equals the class one with the placeholder replaced by the
//! instance type, field names aside.

use tracing::debug;

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        types::{first_element, leaf_name},
    },
    symbol_table::symbol_table::ScopeId,
    types::{
        compare::identical,
        types::{ElementaryKind, Type, TypeId},
    },
};

use super::{
    functions::{check_arguments, check_fn, ensure_fn_signature, resolve_signature},
    type_checker::{check, ClassInfo, InstanceInfo, InstanceMethod, MethodTarget, ModuleAnalysis, TypeChecker},
    typedesc::{lookup_type, Generics, Lookup},
};

/// Records every instance of the module up front, so method calls placed
/// before an instance still find it.
pub fn register_instances(checker: &mut TypeChecker, body: &[NodeId]) {
    let ast = checker.ast;

    for statement in body {
        let NodeKind::TypeInstance {
            class,
            type_name,
            alias,
            is_default,
            methods,
        } = ast.kind(*statement)
        else {
            continue;
        };

        let previous = checker
            .instances
            .iter()
            .find(|instance| &instance.class == class && &instance.type_name == type_name && &instance.alias == alias)
            .map(|instance| instance.location.clone());
        if let Some(location) = previous {
            let message = format!(
                "Typeclass instantiation of \"{}\" for type \"{}\" was already declared at {}",
                class, type_name, location
            );
            checker.error(message, *statement);
            continue;
        }

        let second_default = *is_default
            && checker
                .instances
                .iter()
                .any(|instance| &instance.class == class && &instance.type_name == type_name && instance.is_default);
        if second_default {
            let message = format!(
                "Multiple default typeclass instantiations of \"{}\" for type \"{}\" detected.",
                class, type_name
            );
            checker.error(message, *statement);
        }

        let methods = methods
            .iter()
            .filter_map(|method| match ast.kind(*method) {
                NodeKind::FnDecl { name, .. } => Some(InstanceMethod {
                    name: name.clone(),
                    node: *method,
                    ty: None,
                }),
                _ => None,
            })
            .collect();

        checker.instances.push(InstanceInfo {
            class: class.clone(),
            type_name: type_name.clone(),
            alias: alias.clone(),
            is_default: *is_default,
            module: checker.module.clone(),
            location: checker.span(*statement).start.clone(),
            methods,
        });
    }

    debug!(instances = checker.instances.len(), "Instances registered");
}

/// Resolves a local typeclass declaration once.
pub fn ensure_class(checker: &mut TypeChecker, node: NodeId) -> Option<ClassInfo> {
    let ast = checker.ast;
    let NodeKind::Typeclass {
        name,
        generics,
        methods,
    } = ast.kind(node)
    else {
        return None;
    };

    if let Some(class) = checker.classes.get(name) {
        return Some(class.clone());
    }

    let mut bound = Generics::default();
    let placeholder = generics.first().map(|generic| {
        let wildcard = checker.types.intern(Type::Wildcard);
        checker.types.intern(Type::Defined {
            name: generic.name.clone(),
            ty: wildcard,
        })
    });
    if let (Some(generic), Some(placeholder)) = (generics.first(), placeholder) {
        bound.insert(generic.name.clone(), placeholder);
    }

    let mut signatures = vec![];
    for method in methods {
        let NodeKind::FnDecl { name, .. } = ast.kind(*method) else {
            continue;
        };
        if let Some(signature) = resolve_signature(checker, *method, &bound) {
            signatures.push((name.clone(), signature));
        }
    }

    let class = ClassInfo {
        name: name.clone(),
        placeholder,
        methods: signatures,
    };
    checker.classes.insert(name.clone(), class.clone());

    let inner = checker.scope_of(node, checker.root_scope);
    for method in methods {
        let method_scope = checker.scope_of(*method, inner);
        checker.scopes.seal(method_scope);
    }
    checker.scopes.seal(inner);

    debug!(name = %name, methods = class.methods.len(), "Typeclass declared");
    Some(class)
}

/// Finds a typeclass declared locally or exported by a visible module. An
/// imported class is re-interned into this module's types.
pub fn lookup_class(checker: &mut TypeChecker, scope: ScopeId, name: &str) -> Option<ClassInfo> {
    let ast = checker.ast;
    let declaration = checker.scopes.lookup(scope, name).0.map(|record| record.node);
    if let Some(declaration) = declaration {
        if matches!(ast.kind(declaration), NodeKind::Typeclass { .. }) {
            return ensure_class(checker, declaration);
        }
    }

    let visible = checker.visible.clone();
    let (module, class) = visible
        .iter()
        .find_map(|module| module.exports.typeclasses.get(name).map(|class| (*module, class)))?;

    Some(ClassInfo {
        name: class.name.clone(),
        placeholder: class
            .placeholder
            .map(|placeholder| checker.types.import(&module.types, placeholder)),
        methods: class
            .methods
            .iter()
            .map(|(method, ty)| (method.clone(), checker.types.import(&module.types, *ty)))
            .collect(),
    })
}

pub fn check_typeclass(checker: &mut TypeChecker, node: NodeId, _scope: ScopeId) -> Option<TypeId> {
    ensure_class(checker, node);
    Some(checker.nil())
}

fn instance_type(checker: &mut TypeChecker, node: NodeId, name: &str, scope: ScopeId) -> Option<TypeId> {
    if let Some(kind) = ElementaryKind::from_name(name) {
        return Some(checker.types.elementary(kind));
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

fn has_self_first(checker: &TypeChecker, method: NodeId) -> bool {
    let ast = checker.ast;
    match ast.kind(method) {
        NodeKind::FnDecl { args: Some(args), .. } => {
            leaf_name(ast, first_element(ast, *args)) == Some("self")
        }
        _ => false,
    }
}

pub fn check_instance(checker: &mut TypeChecker, node: NodeId, scope: ScopeId) -> Option<TypeId> {
    let ast = checker.ast;
    let NodeKind::TypeInstance {
        class,
        type_name,
        methods,
        ..
    } = ast.kind(node)
    else {
        return None;
    };
    let inner = checker.scope_of(node, scope);

    let target = instance_type(checker, node, type_name, scope);
    let class_info = lookup_class(checker, scope, class);
    if class_info.is_none() {
        checker.error(format!("Typeclass \"{}\" is not defined", class), node);
    }

    let mut implemented = vec![];
    for method in methods {
        let NodeKind::FnDecl { name, .. } = ast.kind(*method) else {
            continue;
        };
        implemented.push(name.as_str());

        if !has_self_first(checker, *method) {
            let message = format!(
                "Typeclass instantiation for function call \"{}\" does not have 'self' as the first argument.",
                name
            );
            checker.error(message, *method);
        }

        let signature = ensure_fn_signature(checker, *method);
        if let Some(instance_method) = checker
            .instances
            .iter_mut()
            .flat_map(|instance| instance.methods.iter_mut())
            .find(|instance_method| instance_method.node == *method)
        {
            instance_method.ty = signature;
        }

        if let (Some(class_info), Some(target), Some(signature)) = (&class_info, target, signature) {
            check_method_signature(checker, *method, name, class_info, type_name, target, signature);
        }

        check_fn(checker, *method, inner);
    }

    if let (Some(class_info), Some(_)) = (&class_info, target) {
        for (method, _) in &class_info.methods {
            if !implemented.contains(&method.as_str()) {
                let message = format!(
                    "Typeclass instantiation of \"{}\" for type \"{}\" does not implement function \"{}\".",
                    class, type_name, method
                );
                checker.error(message, node);
            }
        }
    }

    checker.scopes.seal(inner);
    Some(checker.nil())
}

fn check_method_signature(
    checker: &mut TypeChecker,
    method: NodeId,
    name: &str,
    class: &ClassInfo,
    type_name: &str,
    target: TypeId,
    signature: TypeId,
) {
    let Some((_, declared)) = class.methods.iter().find(|(method, _)| method == name) else {
        let message = format!("Function \"{}\" is not part of typeclass \"{}\".", name, class.name);
        checker.error(message, method);
        return;
    };

    let expected = match class.placeholder {
        Some(placeholder) => checker.types.substitute(*declared, placeholder, target),
        None => *declared,
    };
    let expected = checker.types.erase_leaves(expected);
    let actual = checker.types.erase_leaves(signature);

    if !identical(&checker.types, actual, expected) {
        let message = format!(
            "Function \"{}\" of typeclass \"{}\" instantiation for type \"{}\" has signature \"{}\" which does not match the expected \"{}\".",
            name,
            class.name,
            type_name,
            checker.type_string(actual),
            checker.type_string(expected)
        );
        checker.error(message, method);
    }
}

/// Picks the instance for `type_name` that should serve `method`: one that
/// implements it if any does, the default one first.
fn find_instance<'i>(instances: &'i [InstanceInfo], type_name: &str, method: &str) -> Option<&'i InstanceInfo> {
    let candidates: Vec<&InstanceInfo> = instances
        .iter()
        .filter(|instance| instance.type_name == type_name)
        .collect();
    let implementing: Vec<&InstanceInfo> = candidates
        .iter()
        .copied()
        .filter(|instance| instance.methods.iter().any(|candidate| candidate.name == method))
        .collect();

    let pool = if implementing.is_empty() {
        candidates
    } else {
        implementing
    };
    pool.iter()
        .find(|instance| instance.is_default)
        .or_else(|| pool.first())
        .copied()
}

/// `object.method(args)`: a call to the instance method for the object's
/// type, with the object passed as `self`.
pub fn check_method_call(
    checker: &mut TypeChecker,
    node: NodeId,
    object: NodeId,
    member: NodeId,
    args: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;
    let method_name = ast.identifier_name(member)?;

    let object_type = check(checker, object, scope);
    let arg_types: Vec<Option<TypeId>> = args.iter().map(|arg| check(checker, *arg, scope)).collect();
    let object_type = object_type?;
    let type_name = checker.type_string(checker.types.strip_leaf(object_type));

    let local = find_instance(&checker.instances, &type_name, method_name).cloned();
    let visible: Vec<&ModuleAnalysis> = checker.visible.clone();
    let found = match local {
        Some(instance) => Some((instance, None)),
        None => visible.iter().find_map(|module| {
            find_instance(&module.exports.instances, &type_name, method_name)
                .map(|instance| (instance.clone(), Some(*module)))
        }),
    };

    let Some((instance, source)) = found else {
        let message = format!(
            "No typeclass instantiation for left type \"{}\" found for function \"{}()\".",
            type_name, method_name
        );
        checker.error(message, node);
        return None;
    };

    let Some(method) = instance.methods.iter().find(|method| method.name == method_name) else {
        let message = format!(
            "Function \"{}()\" was not defined in typeclass \"{}\" instantiation for type \"{}\".",
            method_name, instance.class, type_name
        );
        checker.error(message, node);
        return None;
    };

    let signature = match source {
        Some(module) => method.ty.map(|ty| checker.types.import(&module.types, ty)),
        None => ensure_fn_signature(checker, method.node),
    }?;
    let Type::Function { arg: param, ret } = checker.types.get(signature).clone() else {
        return None;
    };

    checker.method_targets.insert(
        node,
        MethodTarget {
            module: instance.module.clone(),
            class: instance.class.clone(),
            type_name: instance.type_name.clone(),
            alias: instance.alias.clone(),
            method: method.node,
        },
    );

    let mut actual = vec![object_type];
    for arg in arg_types {
        actual.push(arg?);
    }
    let actual = checker.types.product(actual);

    if !check_arguments(checker, node, method_name, actual, param) {
        return None;
    }
    debug!(method = method_name, class = %instance.class, "Method call resolved");
    Some(ret)
}

//! Match expressions and their exhaustiveness.
//!
//! The scrutinee's operands are the operands of its top-level sum, or the
//! scrutinee itself. Every case consumes the operands its pattern matches that
//! no earlier case consumed. A case consuming nothing is useless, and any
//! operand left over once all cases are seen is reported as not covered.

use tracing::debug;

use crate::{
    ast::ast::{NodeId, NodeKind},
    symbol_table::symbol_table::ScopeId,
    types::{
        compare::{compare, identical, ComparisonFlags, ComparisonMode},
        types::{TypeId, TypeOperator},
    },
};

use super::{
    type_checker::{check, TypeChecker},
    typedesc::{resolve_type_desc, Generics},
};

pub fn check_match(
    checker: &mut TypeChecker,
    node: NodeId,
    subject: Option<NodeId>,
    cases: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;
    let subject = subject?;

    let scrutinee = check(checker, subject, scope)?;
    let name = match ast.identifier_name(subject) {
        Some(name) => name.to_string(),
        None => checker.type_string(scrutinee),
    };

    check_cases(checker, node, scrutinee, &name, cases, scope)
}

/// Checks `cases` against the type `scrutinee`, named `name` in messages.
/// `node` is the whole match, where uncovered operands are reported.
pub fn check_cases(
    checker: &mut TypeChecker,
    node: NodeId,
    scrutinee: TypeId,
    name: &str,
    cases: &[NodeId],
    scope: ScopeId,
) -> Option<TypeId> {
    let ast = checker.ast;
    let operands = checker
        .types
        .operands(checker.types.strip(scrutinee), TypeOperator::Sum);
    let mut consumed = vec![false; operands.len()];
    let mut determined = true;
    let mut body_types: Vec<TypeId> = vec![];

    for case in cases {
        let NodeKind::MatchCase { pattern, body } = ast.kind(*case) else {
            continue;
        };
        let case_scope = checker.scope_of(*case, scope);

        match resolve_type_desc(checker, *pattern, case_scope, &Generics::default()) {
            Some(pattern_type) => {
                match_case(checker, *case, pattern_type, scrutinee, name, &operands, &mut consumed);
            }
            None => determined = false,
        }

        match check(checker, *body, case_scope) {
            Some(ty) => {
                if !body_types.iter().any(|seen| identical(&checker.types, *seen, ty)) {
                    body_types.push(ty);
                }
            }
            None => determined = false,
        }
        checker.scopes.seal(case_scope);
    }

    for (operand, _) in operands.iter().zip(&consumed).filter(|(_, consumed)| !**consumed) {
        let message = format!(
            "Match expression does not match all cases for \"{}\". Sum type operand of \"{}\" is not covered.",
            name,
            checker.type_string(checker.types.strip_leaf(*operand))
        );
        checker.error(message, node);
    }

    if !determined {
        return None;
    }
    match body_types.as_slice() {
        [] => Some(checker.nil()),
        [single] => Some(*single),
        _ => Some(checker.types.sum(body_types)),
    }
}

fn match_case(
    checker: &mut TypeChecker,
    case: NodeId,
    pattern: TypeId,
    scrutinee: TypeId,
    name: &str,
    operands: &[TypeId],
    consumed: &mut [bool],
) {
    // A lone operand also answers to the defined type that wraps it
    let whole = checker.types.strip_leaf(scrutinee);
    let names_whole = operands.len() == 1 && identical(&checker.types, pattern, whole);

    let matches: Vec<usize> = operands
        .iter()
        .enumerate()
        .filter(|(_, operand)| {
            names_whole
                || compare(
                    &checker.types,
                    pattern,
                    **operand,
                    ComparisonMode::PatternMatching,
                    ComparisonFlags::default(),
                )
                .success
        })
        .map(|(index, _)| index)
        .collect();

    if matches.is_empty() {
        let message = format!(
            "Match case \"{}\" can not be matched to the type of \"{}\" which is of type \"{}\".",
            checker.type_string(pattern),
            name,
            checker.types.to_string_with_contents(scrutinee)
        );
        checker.error(message, case);
        return;
    }

    let fresh: Vec<usize> = matches.into_iter().filter(|index| !consumed[*index]).collect();
    if fresh.is_empty() {
        let message = format!(
            "Match case \"{}\" is useless since all parts of \"{}\" have already been matched.",
            checker.type_string(pattern),
            name
        );
        checker.error(message, case);
        return;
    }

    let mut matched: Vec<TypeId> = vec![];
    for index in fresh {
        consumed[index] = true;
        matched.push(checker.types.strip_leaf(operands[index]));
    }
    let matched_type = match matched.as_slice() {
        [single] => *single,
        _ => checker.types.sum(matched),
    };

    debug!(
        case = case.index(),
        matched = %checker.type_string(matched_type),
        "Match case resolved"
    );
    checker.matched_types.insert(case, matched_type);
}

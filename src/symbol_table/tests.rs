//! Unit tests for the scope tree.

use std::rc::Rc;

use super::symbol_table::{ScopeKind, ScopeTree};
use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    types::{type_set::TypeSet, types::ElementaryKind},
    Position, Span,
};

fn node(ast: &mut Ast, name: &str) -> NodeId {
    let position = Position::new(0, 0, Rc::new("test.rf".to_string()));
    ast.add(
        NodeKind::Identifier {
            name: name.to_string(),
        },
        Span::new(position.clone(), position),
    )
}

#[test]
fn test_add_then_lookup_in_same_scope() {
    let mut ast = Ast::new();
    let owner = node(&mut ast, "root");
    let declaration = node(&mut ast, "a");

    let mut tree = ScopeTree::new();
    let root = tree.init(owner, ScopeKind::Module, None);

    assert!(tree.add(root, "a", declaration));
    let (record, at_first) = tree.lookup(root, "a");
    assert_eq!(record.map(|record| record.node), Some(declaration));
    assert!(at_first);
}

#[test]
fn test_lookup_from_child_scope() {
    let mut ast = Ast::new();
    let owner = node(&mut ast, "root");
    let block = node(&mut ast, "block");
    let declaration = node(&mut ast, "a");

    let mut tree = ScopeTree::new();
    let root = tree.init(owner, ScopeKind::Module, None);
    let child = tree.init(block, ScopeKind::Block, Some(root));
    tree.add(root, "a", declaration);

    let (record, at_first) = tree.lookup(child, "a");
    assert!(record.is_some());
    assert!(!at_first);

    let (record, _) = tree.lookup(root, "missing");
    assert!(record.is_none());
}

#[test]
fn test_redefinition_in_same_scope_fails_but_shadowing_is_allowed() {
    let mut ast = Ast::new();
    let owner = node(&mut ast, "root");
    let block = node(&mut ast, "block");
    let first = node(&mut ast, "a");
    let second = node(&mut ast, "a");

    let mut tree = ScopeTree::new();
    let root = tree.init(owner, ScopeKind::Module, None);
    let child = tree.init(block, ScopeKind::Block, Some(root));

    assert!(tree.add(root, "a", first));
    assert!(!tree.add(root, "a", second));
    assert!(tree.add(child, "a", second));

    let (record, at_first) = tree.lookup(child, "a");
    assert_eq!(record.map(|record| record.node), Some(second));
    assert!(at_first);
}

#[test]
fn test_set_type_and_records() {
    let mut ast = Ast::new();
    let owner = node(&mut ast, "root");
    let a = node(&mut ast, "a");
    let b = node(&mut ast, "b");
    let mut types = TypeSet::new();
    let u64_t = types.elementary(ElementaryKind::U64);

    let mut tree = ScopeTree::new();
    let root = tree.init(owner, ScopeKind::Module, None);
    tree.add(root, "a", a);
    tree.add(root, "b", b);

    assert!(tree.set_type(root, "a", u64_t));
    assert!(!tree.set_type(root, "missing", u64_t));
    assert_eq!(tree.lookup(root, "a").0.and_then(|record| record.ty), Some(u64_t));
    assert_eq!(tree.lookup(root, "b").0.and_then(|record| record.ty), None);

    let mut names: Vec<&str> = tree.table(root).records().map(|record| record.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_sealed_table_refuses_changes() {
    let mut ast = Ast::new();
    let owner = node(&mut ast, "root");
    let a = node(&mut ast, "a");
    let mut types = TypeSet::new();
    let u8_t = types.elementary(ElementaryKind::U8);

    let mut tree = ScopeTree::new();
    let root = tree.init(owner, ScopeKind::Module, None);
    tree.seal(root);

    assert!(tree.table(root).is_sealed());
    assert!(!tree.add(root, "a", a));
    assert!(!tree.set_type(root, "a", u8_t));
}

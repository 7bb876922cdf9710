use std::rc::Rc;

use crate::{lexer::lexer::tokenize, parser::parser::parse, types::types::TypeOperator, Position, Span};

use super::{
    ast::{Ast, NodeKind},
    expressions::BinaryOperator,
    types::{collect_leaves, first_element, leaf_name},
};

fn span() -> Span {
    let file = Rc::new(String::from("test.rf"));
    Span::new(Position::new(0, 0, Rc::clone(&file)), Position::new(0, 0, file))
}

#[test]
fn test_arena_ids_are_sequential() {
    let mut ast = Ast::new();
    assert!(ast.is_empty());

    let a = ast.add(NodeKind::Identifier { name: String::from("a") }, span());
    let b = ast.add(NodeKind::Integer { value: 3 }, span());
    let sum = ast.add(
        NodeKind::Binary {
            op: BinaryOperator::Add,
            left: a,
            right: b,
        },
        span(),
    );

    assert_eq!(ast.len(), 3);
    assert_eq!(a.index(), 0);
    assert_eq!(sum.index(), 2);
    assert_eq!(ast.children(sum), vec![a, b]);
    assert_eq!(ast.identifier_name(a), Some("a"));
    assert_eq!(ast.identifier_name(b), None);
}

#[test]
fn test_children_of_function() {
    let mut ast = Ast::new();
    let ret = ast.add(NodeKind::TypeName { name: String::from("u32") }, span());
    let body = ast.add(NodeKind::Block { statements: vec![] }, span());
    let function = ast.add(
        NodeKind::FnDecl {
            name: String::from("f"),
            args: None,
            ret: Some(ret),
            body: Some(body),
        },
        span(),
    );

    assert_eq!(ast.children(function), vec![ret, body]);
}

#[test]
fn test_collect_leaves_skips_nested_leaf_types() {
    let tokens = tokenize(String::from("type foo {a:(b:i32, c:u8), d:bool | s:string}"), None).unwrap();
    let ast = parse(tokens, Rc::new(String::from("shell"))).unwrap();
    let decl = ast.children(ast.root().unwrap())[0];
    let NodeKind::TypeDecl { description, .. } = ast.kind(decl) else {
        panic!("expected a type declaration");
    };

    let names: Vec<&str> = collect_leaves(&ast, *description)
        .into_iter()
        .filter_map(|leaf| leaf_name(&ast, leaf))
        .collect();
    assert_eq!(names, vec!["a", "d", "s"]);

    let first = first_element(&ast, *description);
    assert_eq!(leaf_name(&ast, first), Some("a"));
    assert!(matches!(
        ast.kind(*description),
        NodeKind::TypeOperator {
            op: TypeOperator::Sum,
            ..
        }
    ));
}

use std::rc::Rc;

use crate::{
    ast::ast::Ast,
    diagnostics::diagnostics::Diagnostic,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    error::ModuleError,
    module::{collect_modules, Module, MAIN_MODULE},
    resolver::resolve_order,
};

fn parse_source(source: &str) -> Ast {
    let tokens = tokenize(source.to_string(), Some("test.rf".to_string())).unwrap();
    parse(tokens, Rc::new("test.rf".to_string())).unwrap()
}

fn ordered_names(modules: &[Module]) -> Vec<String> {
    resolve_order(modules)
        .unwrap()
        .into_iter()
        .map(|index| modules[index].name.clone())
        .collect()
}

#[test]
fn test_collect_named_modules() {
    let ast = parse_source("module a {\n    import b\n    fn main() {}\n}\nmodule b {}");
    let modules = collect_modules(&ast, 0);

    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].name, "a");
    assert_eq!(modules[0].imports.len(), 1);
    assert_eq!(modules[0].imports[0].name, "b");
    assert_eq!(modules[0].imports[0].span.start.line, 1);
    assert!(modules[0].is_main);
    assert!(modules[0].imports_module("b"));
    assert_eq!(modules[1].name, "b");
    assert!(!modules[1].is_main);
}

#[test]
fn test_collect_implicit_main_module() {
    let ast = parse_source("a:u64 = 1\nb:u64 = a");
    let modules = collect_modules(&ast, 3);

    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].name, MAIN_MODULE);
    assert_eq!(modules[0].source, 3);
    assert_eq!(modules[0].body.len(), 2);
    assert!(modules[0].is_main);
}

#[test]
fn test_order_single_import() {
    let ast = parse_source("module a {\n    import b\n}\nmodule b {}");
    let modules = collect_modules(&ast, 0);

    assert_eq!(ordered_names(&modules), vec!["b", "a"]);
}

#[test]
fn test_order_shared_import() {
    let ast = parse_source("module a {\n    import b\n    import c\n}\nmodule b {}\nmodule c {\n    import b\n}");
    let modules = collect_modules(&ast, 0);
    let order = ordered_names(&modules);
    let position = |name: &str| order.iter().position(|module| module == name).unwrap();

    assert_eq!(order.len(), 3);
    assert!(position("b") < position("a"));
    assert!(position("b") < position("c"));
    assert!(position("c") < position("a"));
}

#[test]
fn test_order_independent_modules_reversed() {
    let ast = parse_source("module a {}\nmodule b {}");
    let modules = collect_modules(&ast, 0);

    assert_eq!(ordered_names(&modules), vec!["b", "a"]);
}

#[test]
fn test_cyclic_dependency() {
    let ast = parse_source("module a {\n    import b\n}\nmodule b {\n    import a\n}");
    let modules = collect_modules(&ast, 0);
    let error = resolve_order(&modules).unwrap_err();

    assert!(matches!(error, ModuleError::Cyclic { ref name, .. } if name == "b"));
    assert_eq!(error.to_string(), "Cyclic dependency around module \"b\" detected.");
    assert_eq!(error.span().start.line, 1);
    assert_eq!(error.span().start.column, 4);
}

#[test]
fn test_self_import_is_cyclic() {
    let ast = parse_source("module a {\n    import a\n}");
    let modules = collect_modules(&ast, 0);
    let error = resolve_order(&modules).unwrap_err();

    assert_eq!(error.to_string(), "Cyclic dependency around module \"a\" detected.");
}

#[test]
fn test_unknown_import() {
    let ast = parse_source("module a {\n    import z\n}");
    let modules = collect_modules(&ast, 0);
    let error = resolve_order(&modules).unwrap_err();

    assert_eq!(error.to_string(), "Requested module \"z\" not found for importing.");
}

#[test]
fn test_duplicate_module() {
    let ast = parse_source("module a {}\nmodule a {}");
    let modules = collect_modules(&ast, 0);
    let error = resolve_order(&modules).unwrap_err();

    assert_eq!(error.to_string(), "Module \"a\" already declared");
    assert_eq!(error.span().start.line, 1);
}

#[test]
fn test_module_error_into_diagnostic() {
    let ast = parse_source("module a {\n    import z\n}");
    let modules = collect_modules(&ast, 0);
    let diagnostic: Diagnostic = resolve_order(&modules).unwrap_err().into();

    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.start_location(), (1, 4));
    assert_eq!(
        diagnostic.to_string(),
        "test.rf:1:4: error: Requested module \"z\" not found for importing."
    );
}

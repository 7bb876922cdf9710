use std::rc::Rc;

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    config::config::FrontOptions,
    diagnostics::diagnostics::Diagnostics,
    lexer::lexer::tokenize,
    modules::module::collect_modules,
    parser::parser::parse,
};

use super::type_checker::{check_module, ModuleAnalysis};

fn parse_source(source: &str) -> Ast {
    let tokens = tokenize(source.to_string(), Some("test.rf".to_string())).unwrap();
    parse(tokens, Rc::new("test.rf".to_string())).unwrap()
}

fn analyze_with(source: &str, options: FrontOptions) -> (Ast, ModuleAnalysis, Diagnostics) {
    let ast = parse_source(source);
    let modules = collect_modules(&ast, 0);
    let module = &modules[0];
    let (analysis, diagnostics) = check_module(&ast, module.node, &module.body, &module.name, &options, vec![]);
    (ast, analysis, diagnostics)
}

fn analyze(source: &str) -> (Ast, ModuleAnalysis, Diagnostics) {
    analyze_with(source, FrontOptions::default().without_stdlib())
}

fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|diagnostic| diagnostic.message.clone()).collect()
}

/// Every node matching `predicate`, in source order.
fn find_all(ast: &Ast, predicate: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    let mut found = vec![];
    let mut stack: Vec<NodeId> = ast.root().into_iter().collect();
    while let Some(node) = stack.pop() {
        if predicate(ast.kind(node)) {
            found.push(node);
        }
        stack.extend(ast.children(node).into_iter().rev());
    }
    found
}

#[test]
fn test_literal_types() {
    let (ast, analysis, diagnostics) = analyze("a:u64 = 5\nb:string = \"x\"\nc:f64 = 1.5");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let integers = find_all(&ast, |kind| matches!(kind, NodeKind::Integer { .. }));
    let ty = analysis.node_type(integers[0]).unwrap();
    assert_eq!(analysis.types.to_string(ty), "u8");
    assert!(analysis.types.is_constant(ty));

    let floats = find_all(&ast, |kind| matches!(kind, NodeKind::Float { .. }));
    assert_eq!(analysis.node_type_string(floats[0]).as_deref(), Some("f64"));
}

#[test]
fn test_undeclared_identifier_cascades_to_assignment() {
    let (_, _, diagnostics) = analyze("a:u64 = b");
    assert_eq!(
        messages(&diagnostics),
        vec![
            "Undeclared identifier \"b\"".to_string(),
            "Type of right side of \"=\" can not be determined".to_string(),
        ]
    );
}

#[test]
fn test_duplicate_identifier_in_scope() {
    let (_, _, diagnostics) = analyze("a:u64\na:u8");
    assert_eq!(
        messages(&diagnostics),
        vec!["Identifier \"a\" was already used in scope at test.rf:0:0".to_string()]
    );
    assert_eq!(diagnostics.as_slice()[0].start_location(), (1, 0));
}

#[test]
fn test_shadowing_in_inner_block_is_allowed() {
    let (_, _, diagnostics) = analyze("a:u64\n{\n    a:string = \"inner\"\n}");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_forward_references_resolve() {
    let source = "fn main() {\n    v:vec2 = make()\n}\nfn make() -> vec2 {\n    r:vec2\n    return r\n}\ntype vec2 {x:i32, y:i32}";
    let (_, analysis, diagnostics) = analyze(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let make = analysis.exports.functions.get("make").copied().unwrap();
    assert_eq!(analysis.types.to_string(make), "nil->vec2");
    assert!(analysis.exports.defined_types.contains_key("vec2"));
}

#[test]
fn test_narrowing_warning() {
    let source = "{\na:u64 = 9999; b:u8\nb = a\n}";
    let (_, _, diagnostics) = analyze(source);
    assert_eq!(diagnostics.warnings().len(), 1);
    assert!(!diagnostics.has_errors());
    assert_eq!(
        diagnostics.warnings()[0].message,
        "Implicit conversion from \"u64\" to \"u8\" during assignment."
    );

    let (_, _, diagnostics) = analyze_with(source, FrontOptions::default().without_stdlib().without_warnings());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_signed_to_unsigned_warning() {
    let (_, _, diagnostics) = analyze("{\na:i16 = 9999; b:u16\nb = a\n}");
    assert_eq!(
        messages(&diagnostics),
        vec!["Implicit signed to unsigned conversion from \"i16\" to \"u16\" during assignment.".to_string()]
    );
}

#[test]
fn test_larger_constant_is_rejected() {
    let (_, _, diagnostics) = analyze("b:u8 = 999999999");
    assert_eq!(
        messages(&diagnostics),
        vec!["Assignment between incompatible types. Can't assign \"u32\" to \"u8\". Unable to convert from \"u32\" to \"u8\". Attempting to assign larger constant to smaller variable.".to_string()]
    );
}

#[test]
fn test_operator_capability() {
    let (_, _, diagnostics) = analyze("a:string = \"x\"\nb:u64 = a * 2");
    assert_eq!(
        messages(&diagnostics),
        vec![
            "Can't apply \"*\" to \"string\"".to_string(),
            "Type of right side of \"=\" can not be determined".to_string(),
        ]
    );
}

#[test]
fn test_match_records_matched_types() {
    let source = "type foo {a:i32 | s:string}\nx:foo\nmatch x {\n    i32 => \"number\"\n    _ => \"other\"\n}";
    let (ast, analysis, diagnostics) = analyze(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let cases = find_all(&ast, |kind| matches!(kind, NodeKind::MatchCase { .. }));
    assert_eq!(cases.len(), 2);
    let first = analysis.matched_type(cases[0]).unwrap();
    let second = analysis.matched_type(cases[1]).unwrap();
    assert_eq!(analysis.types.to_string(first), "i32");
    assert_eq!(analysis.types.to_string(second), "string");

    let matches = find_all(&ast, |kind| matches!(kind, NodeKind::Match { .. }));
    assert_eq!(analysis.node_type_string(matches[0]).as_deref(), Some("string"));
}

#[test]
fn test_match_reports_uncovered_operand() {
    let source = "type foo {a:i32 | b:u32 | c:f32}\nx:foo\nmatch x {\n    i32 => 1\n    u32 => 2\n}";
    let (_, _, diagnostics) = analyze(source);
    assert_eq!(
        messages(&diagnostics),
        vec!["Match expression does not match all cases for \"x\". Sum type operand of \"f32\" is not covered.".to_string()]
    );
}

#[test]
fn test_match_reports_useless_case() {
    let source = "type foo {a:i32 | s:string}\nx:foo\nmatch x {\n    i32 => 1\n    _ => 2\n    string => 3\n}";
    let (_, _, diagnostics) = analyze(source);
    assert_eq!(
        messages(&diagnostics),
        vec!["Match case \"string\" is useless since all parts of \"x\" have already been matched.".to_string()]
    );
}

#[test]
fn test_case_list_function() {
    let source = "fn action(a:i32 | b:string) -> i32 | string\na:i32    => a\nb:string => b\n";
    let (_, analysis, diagnostics) = analyze(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
    assert!(analysis.exports.functions.contains_key("action"));
}

#[test]
fn test_bracket_list_takes_widest_member_and_destination_type() {
    let (ast, analysis, diagnostics) = analyze("a:u64[] = [1, 300, 2]");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let lists = find_all(&ast, |kind| matches!(kind, NodeKind::BracketList { .. }));
    assert_eq!(analysis.node_type_string(lists[0]).as_deref(), Some("u64[3]"));

    let declarations = find_all(&ast, |kind| matches!(kind, NodeKind::VarDecl { .. }));
    assert_eq!(analysis.node_type_string(declarations[0]).as_deref(), Some("u64[3]"));
}

#[test]
fn test_for_expression_type() {
    let source = "arr:u64[3] = [1, 2, 3]\nout:u64[3] = for a in arr {\n    a + 1\n}";
    let (ast, analysis, diagnostics) = analyze(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let loops = find_all(&ast, |kind| matches!(kind, NodeKind::For { .. }));
    assert_eq!(analysis.node_type_string(loops[0]).as_deref(), Some("u64[3]"));
}

#[test]
fn test_index_out_of_bounds() {
    let (_, _, diagnostics) = analyze("a:u64[3] = [1, 2, 3]\nb:u64 = a[3]");
    assert_eq!(
        messages(&diagnostics),
        vec![
            "Accessing array out of bounds. Array size is '3' and you are attempting to access index '3'.".to_string(),
            "Type of right side of \"=\" can not be determined".to_string(),
        ]
    );
}

#[test]
fn test_explicit_conversions() {
    let (_, _, diagnostics) = analyze("a:u64 = 5\nb:u8 = u8(a)\nc:string = string(a)");
    assert_eq!(
        messages(&diagnostics),
        vec!["Invalid explicit conversion. Unable to convert from \"u64\" to \"string\".".to_string()]
    );
}

#[test]
fn test_return_outside_function() {
    let (_, _, diagnostics) = analyze("return 5");
    assert_eq!(
        messages(&diagnostics),
        vec!["Return statement outside of a function".to_string()]
    );
}

const VECTOR_SOURCE: &str = "type vector {x:int, y:int, z:int}
class addition <Type T> {
    fn add(self:T, other:T) -> T
}
instance addition vector {
    fn add(self:vector, other:vector) -> vector {
        ret:vector
        ret.x = self.x + other.x
        ret.y = self.y + other.y
        ret.z = self.z + other.z
        return ret
    }
}
fn some_function() {
    a:vector = vector(1, 2, 3)
    b:vector = vector(3, 2, 1)
    c:vector = a.add(b)
}";

#[test]
fn test_typeclass_method_call() {
    let (ast, analysis, diagnostics) = analyze(VECTOR_SOURCE);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let method_calls: Vec<NodeId> = find_all(&ast, |kind| matches!(kind, NodeKind::Call { .. }))
        .into_iter()
        .filter(|call| analysis.method_target(*call).is_some())
        .collect();
    assert_eq!(method_calls.len(), 1);

    let target = analysis.method_target(method_calls[0]).unwrap();
    assert_eq!(target.class, "addition");
    assert_eq!(target.type_name, "vector");
    assert_eq!(target.module, "main");
    assert_eq!(analysis.node_type_string(method_calls[0]).as_deref(), Some("vector"));
}

#[test]
fn test_instance_method_without_self() {
    let source = VECTOR_SOURCE.replace("fn add(self:vector, other:vector)", "fn add(this:vector, other:vector)");
    let (_, _, diagnostics) = analyze(&source);
    let messages = messages(&diagnostics);
    assert!(messages.contains(
        &"Typeclass instantiation for function call \"add\" does not have 'self' as the first argument.".to_string()
    ));
}

#[test]
fn test_instance_signature_mismatch() {
    let source = VECTOR_SOURCE
        .replace("fn add(self:vector, other:vector)", "fn add(self:vector, other:i32)")
        .replace("other.x", "self.x")
        .replace("other.y", "self.y")
        .replace("other.z", "self.z")
        .replace("a.add(b)", "a.add(1)");
    let (_, _, diagnostics) = analyze(&source);
    assert_eq!(
        messages(&diagnostics),
        vec!["Function \"add\" of typeclass \"addition\" instantiation for type \"vector\" has signature \"vector,i32->vector\" which does not match the expected \"vector,vector->vector\".".to_string()]
    );
}

#[test]
fn test_method_call_without_instance() {
    let (_, _, diagnostics) = analyze("a:u64 = 5\nb:u64 = a.add(1)");
    assert_eq!(
        messages(&diagnostics),
        vec![
            "No typeclass instantiation for left type \"u64\" found for function \"add()\".".to_string(),
            "Type of right side of \"=\" can not be determined".to_string(),
        ]
    );
}

fn located(diagnostics: &Diagnostics) -> Vec<(String, (u32, u32), Option<(u32, u32)>)> {
    diagnostics
        .iter()
        .map(|diagnostic| {
            (
                diagnostic.message.clone(),
                diagnostic.start_location(),
                diagnostic.end_location(),
            )
        })
        .collect()
}

const SECOND_INSTANCE: &str = "
instance addition vector {
    fn add(self:vector, other:vector) -> vector {
        return self
    }
}";

#[test]
fn test_method_missing_from_instance() {
    let source = VECTOR_SOURCE.replace("c:vector = a.add(b)", "a.sub(b)");
    let (_, _, diagnostics) = analyze(&source);
    assert_eq!(
        located(&diagnostics),
        vec![(
            "Function \"sub()\" was not defined in typeclass \"addition\" instantiation for type \"vector\".".to_string(),
            (16, 4),
            Some((16, 11)),
        )]
    );
}

#[test]
fn test_duplicate_unnamed_instance() {
    let source = format!("{}{}", VECTOR_SOURCE, SECOND_INSTANCE);
    let (_, _, diagnostics) = analyze(&source);
    assert_eq!(
        located(&diagnostics),
        vec![(
            "Typeclass instantiation of \"addition\" for type \"vector\" was already declared at test.rf:4:0".to_string(),
            (18, 0),
            Some((22, 0)),
        )]
    );
}

#[test]
fn test_duplicate_named_instance() {
    let source = format!("{}{}", VECTOR_SOURCE, SECOND_INSTANCE)
        .replace("instance addition vector {", "instance addition vector as vadd {");
    let (_, _, diagnostics) = analyze(&source);
    assert_eq!(
        located(&diagnostics),
        vec![(
            "Typeclass instantiation of \"addition\" for type \"vector\" was already declared at test.rf:4:0".to_string(),
            (18, 0),
            Some((22, 0)),
        )]
    );
}

#[test]
fn test_instances_with_different_names_coexist() {
    let source = format!("{}{}", VECTOR_SOURCE, SECOND_INSTANCE.replace("addition vector {", "addition vector as other {"));
    let (_, _, diagnostics) = analyze(&source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_multiple_default_instances() {
    let source = format!("{}{}", VECTOR_SOURCE, SECOND_INSTANCE)
        .replacen("instance addition vector {", "instance addition vector as first default {", 1)
        .replacen("instance addition vector {", "instance addition vector as second default {", 1);
    let (_, _, diagnostics) = analyze(&source);
    assert_eq!(
        located(&diagnostics),
        vec![(
            "Multiple default typeclass instantiations of \"addition\" for type \"vector\" detected.".to_string(),
            (18, 0),
            Some((22, 0)),
        )]
    );
}

#[test]
fn test_match_on_defined_operand_by_name() {
    let source = "type bar {x:i32}\ntype foo {a:i32 | b:bar}\nv:foo\nmatch v {\n    i32 => 1\n    bar => 2\n}";
    let (ast, analysis, diagnostics) = analyze(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));

    let cases = find_all(&ast, |kind| matches!(kind, NodeKind::MatchCase { .. }));
    let first = analysis.matched_type(cases[0]).unwrap();
    let second = analysis.matched_type(cases[1]).unwrap();
    assert_eq!(analysis.types.to_string(first), "i32");
    assert_eq!(analysis.types.to_string(second), "bar");
}

#[test]
fn test_defined_type_is_its_own_single_operand() {
    let (_, _, diagnostics) = analyze("type bar {x:i32}\nv:bar\nmatch v {\n    bar => 1\n}");
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_recursive_type_declaration() {
    let (_, _, diagnostics) = analyze("type rec {a:i32 | b:rec}\nr:rec\nx:i32 = r");
    assert_eq!(
        located(&diagnostics),
        vec![
            ("Recursive type definition of \"rec\" detected.".to_string(), (0, 20), Some((0, 22))),
            ("Type of right side of \"=\" can not be determined".to_string(), (2, 8), Some((2, 8))),
        ]
    );
}

use crate::{config::config::FrontOptions, diagnostics::diagnostics::DiagnosticKind};

use super::driver::{Front, STDLIB_FILE};

fn messages(front: &Front) -> Vec<String> {
    front
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

#[test]
fn test_stdlib_is_checked_first_and_visible() {
    let mut front = Front::new(FrontOptions::default());
    assert!(front.add_source("fn main() {\n    print(\"hello\")\n}", "main.rf"));

    assert!(front.analyze(), "{:?}", messages(&front));
    assert_eq!(front.order(), vec!["stdlib", "main"]);
    assert!(front.source_text(STDLIB_FILE).is_some());
}

#[test]
fn test_print_is_undefined_without_stdlib() {
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    front.add_source("fn main() {\n    print(\"hello\")\n}", "main.rf");

    assert!(!front.analyze());
    assert_eq!(messages(&front), vec!["Undefined function call \"print\" detected".to_string()]);
    assert_eq!(front.errors()[0].start_location(), (1, 4));
}

#[test]
fn test_syntax_error_skips_source() {
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    assert!(!front.add_source("a = )", "bad.rf"));
    assert!(front.add_source("a:u64 = 1", "good.rf"));

    assert!(!front.analyze());
    assert_eq!(front.diagnostics().len(), 1);
    assert_eq!(front.diagnostics().as_slice()[0].kind, DiagnosticKind::SyntaxError);
    assert!(front.module("main").and_then(|module| module.analysis.as_ref()).is_some());
}

#[test]
fn test_imported_type_and_function() {
    let source = "module a {
    import b
    fn main() {
        v:point = make()
        v.x = 1
    }
}
module b {
    type point {x:i32, y:i32}
    fn make() -> point {
        p:point
        return p
    }
}";
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    front.add_source(source, "main.rf");

    assert!(front.analyze(), "{:?}", messages(&front));
    assert_eq!(front.order(), vec!["b", "a"]);

    let b = front.module("b").unwrap();
    assert!(b.analysis.as_ref().unwrap().exports.functions.contains_key("make"));
    assert!(front.module("a").unwrap().is_main);
}

#[test]
fn test_unimported_module_is_not_visible() {
    let source = "module a {\n    fn main() {\n        v:point\n    }\n}\nmodule b {\n    type point {x:i32}\n}";
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    front.add_source(source, "main.rf");

    assert!(!front.analyze());
    assert_eq!(messages(&front), vec!["Type \"point\" is not defined".to_string()]);
}

#[test]
fn test_cyclic_modules_are_fatal() {
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    front.add_source("module a {\n    import b\n}\nmodule b {\n    import a\n}", "main.rf");

    assert!(!front.analyze());
    assert_eq!(
        messages(&front),
        vec!["Cyclic dependency around module \"b\" detected.".to_string()]
    );
    assert!(front.order().is_empty());
    assert!(front.modules().iter().all(|module| module.analysis.is_none()));
}

#[test]
fn test_multiple_main_definitions() {
    let mut front = Front::new(FrontOptions::default().without_stdlib());
    front.add_source("module a {\n    fn main() {}\n}", "a.rf");
    front.add_source("module b {\n    fn main() {}\n}", "b.rf");

    assert!(!front.analyze());
    assert_eq!(
        messages(&front),
        vec!["Multiple definition of main() detected in \"b.rf\". Previous definition was in \"a.rf\".".to_string()]
    );
}

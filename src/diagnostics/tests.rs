use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span,
};

use super::diagnostics::{render, Diagnostic, DiagnosticKind, Diagnostics};

fn span(line: u32, start: u32, end: u32) -> Span {
    let file = Rc::new(String::from("main.rf"));
    Span::new(
        Position::new(line, start, Rc::clone(&file)),
        Position::new(line, end, file),
    )
}

#[test]
fn test_diagnostic_display() {
    let error = Diagnostic::error("Undeclared identifier \"b\"", &span(2, 10, 10));
    let warning = Diagnostic::warning("Implicit conversion from \"u64\" to \"u8\" during assignment.", &span(2, 0, 4));

    assert_eq!(error.to_string(), "main.rf:2:10: error: Undeclared identifier \"b\"");
    assert_eq!(
        warning.to_string(),
        "main.rf:2:0: warning: Implicit conversion from \"u64\" to \"u8\" during assignment."
    );
    assert_eq!(warning.end_location(), Some((2, 4)));
}

#[test]
fn test_syntax_error_conversion() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: String::from("#"),
        },
        Position::new(0, 4, Rc::new(String::from("main.rf"))),
    );
    let diagnostic = Diagnostic::from(error);

    assert_eq!(diagnostic.kind, DiagnosticKind::SyntaxError);
    assert_eq!(diagnostic.message, "unrecognised token: \"#\"");
    assert_eq!(diagnostic.start_location(), (0, 4));
    assert!(diagnostic.end.is_none());
    assert!(diagnostic.is_error());
}

#[test]
fn test_collection_filters() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.warning("first", &span(0, 0, 1));
    diagnostics.error("second", &span(1, 0, 1));
    diagnostics.warning("third", &span(2, 0, 1));

    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics.error_count(), 1);
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.errors()[0].message, "second");
    assert_eq!(diagnostics.warnings().len(), 2);
}

#[test]
fn test_render_underlines_span() {
    let source = "{\n    a:string = \"a\"\n    print(b)\n}";
    let diagnostic = Diagnostic::error("Undeclared identifier \"b\"", &span(2, 10, 10));

    let rendered = render(&diagnostic, source);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "error: Undeclared identifier \"b\"");
    assert_eq!(lines[1], "-> main.rf:2:10");
    assert_eq!(lines[2], "  |");
    assert_eq!(lines[3], "3 | print(b)");
    assert_eq!(lines[4], "  | ------^");
}

#[test]
fn test_render_without_source_line() {
    let diagnostic = Diagnostic::error("lost", &span(40, 0, 0));

    assert_eq!(render(&diagnostic, "short"), "error: lost\n-> main.rf:40:0\n");
}

use std::fmt::Display;

use crate::{
    errors::errors::{Error, ErrorTip},
    get_line_at_position, Position, Span,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    SyntaxError,
    SemanticError,
    SemanticWarning,
}

impl DiagnosticKind {
    pub fn is_error(&self) -> bool {
        !matches!(self, DiagnosticKind::SemanticWarning)
    }

    pub fn label(&self) -> &'static str {
        if self.is_error() {
            "error"
        } else {
            "warning"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub start: Position,
    pub end: Option<Position>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: &Span) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            start: span.start.clone(),
            end: Some(span.end.clone()),
        }
    }

    pub fn error(message: impl Into<String>, span: &Span) -> Self {
        Diagnostic::new(DiagnosticKind::SemanticError, message, span)
    }

    pub fn warning(message: impl Into<String>, span: &Span) -> Self {
        Diagnostic::new(DiagnosticKind::SemanticWarning, message, span)
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    /// `(line, column)` of the start, handy for assertions.
    pub fn start_location(&self) -> (u32, u32) {
        (self.start.line, self.start.column)
    }

    pub fn end_location(&self) -> Option<(u32, u32)> {
        self.end.as_ref().map(|end| (end.line, end.column))
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.start, self.kind.label(), self.message)
    }
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        let message = match error.get_tip() {
            ErrorTip::None => error.to_string(),
            ErrorTip::Suggestion(tip) => format!("{} ({})", error, tip),
        };

        Diagnostic {
            kind: DiagnosticKind::SyntaxError,
            message,
            start: error.get_position().clone(),
            end: None,
        }
    }
}

/// Ordered collection of the diagnostics emitted so far.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, span: &Span) {
        self.push(Diagnostic::error(message, span));
    }

    pub fn warning(&mut self, message: impl Into<String>, span: &Span) {
        self.push(Diagnostic::warning(message, span));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|diagnostic| diagnostic.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.items.iter().filter(|diagnostic| diagnostic.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.items.iter().filter(|diagnostic| !diagnostic.is_error()).collect()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

/// Renders a diagnostic with the source line it points at.
///
/// ```text
/// error: Undeclared identifier "b"
/// -> main.rf:3:10
///   |
/// 3 | print(b)
///   | ------^
/// ```
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    let mut output = format!("{}: {}\n-> {}\n", diagnostic.kind.label(), diagnostic.message, diagnostic.start);

    let Some(line_text) = get_line_at_position(source, diagnostic.start.line) else {
        return output;
    };

    let line_string = (diagnostic.start.line + 1).to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    let column = diagnostic.start.column as usize;
    let arrows = column.saturating_sub(removed_whitespace) + 1;

    // Underline the whole span when it stays on one line
    let width = match &diagnostic.end {
        Some(end) if end.line == diagnostic.start.line && end.column >= diagnostic.start.column => {
            (end.column - diagnostic.start.column) as usize
        }
        _ => 0,
    };

    output.push_str(&format!("{:>padding$}\n", "|"));
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));
    output.push_str(&format!("{:>padding$} {:->arrows$}{}\n", "|", "^", "^".repeat(width)));

    output
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let trimmed = string.trim_start_matches([' ', '\t']);
    (trimmed, string.len() - trimmed.len())
}

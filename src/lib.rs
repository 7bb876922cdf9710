#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod modules;
pub mod parser;
pub mod symbol_table;
pub mod type_checker;
pub mod types;

extern crate regex;

/// A location inside a source file. Lines and columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Rc<String>) -> Self {
        Position { line, column, file }
    }

    pub fn null() -> Self {
        Position::new(0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Start and end are both inclusive: `end` points at the last character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// A span covering `self` up to and including `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

/// Returns the text of the 0-based `line` in `source`, without its line terminator.
pub fn get_line_at_position(source: &str, line: u32) -> Option<&str> {
    source
        .split('\n')
        .nth(line as usize)
        .map(|text| text.trim_end_matches('\r'))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{get_line_at_position, Position, Span};

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond\r\n\nTesting { }\n";

        assert_eq!(get_line_at_position(source, 0), Some("Hello, world!"));
        assert_eq!(get_line_at_position(source, 1), Some("second"));
        assert_eq!(get_line_at_position(source, 2), Some(""));
        assert_eq!(get_line_at_position(source, 3), Some("Testing { }"));
        assert_eq!(get_line_at_position(source, 9), None);
    }

    #[test]
    fn test_span_to() {
        let file = Rc::new(String::from("test.rf"));
        let first = Span::new(Position::new(1, 4, Rc::clone(&file)), Position::new(1, 6, Rc::clone(&file)));
        let second = Span::new(Position::new(2, 0, Rc::clone(&file)), Position::new(2, 9, Rc::clone(&file)));

        let joined = first.to(&second);
        assert_eq!(joined.start, Position::new(1, 4, Rc::clone(&file)));
        assert_eq!(joined.end, Position::new(2, 9, file));
    }

    #[test]
    fn test_position_display() {
        let position = Position::new(3, 12, Rc::new(String::from("main.rf")));
        assert_eq!(position.to_string(), "main.rf:3:12");
    }
}

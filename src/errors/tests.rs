//! Unit tests for syntax error reporting.

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;

fn position(line: u32, column: u32) -> Position {
    Position::new(line, column, Rc::new("test.rf".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(0, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(4, 2),
    );

    assert_eq!(error.get_position().line, 4);
    assert_eq!(error.get_position().column, 2);
}

#[test]
fn test_unexpected_token_detailed_tip() {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: "}".to_string(),
            message: "expected '=>' after match case pattern".to_string(),
        },
        position(0, 0),
    );

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(
        error.get_tip().to_string(),
        "Unexpected token: `}`, expected '=>' after match case pattern"
    );
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::NumberParseError {
            token: "99999999999999999999999".to_string(),
        },
        position(1, 1),
    );

    assert_eq!(error.to_string(), "error parsing number: \"99999999999999999999999\"");
}

#[test]
fn test_error_tip_display_none() {
    assert_eq!(ErrorTip::None.to_string(), "");
}

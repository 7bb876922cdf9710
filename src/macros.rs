//! Utility macros for the front-end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for fixed tokens

/// Creates a Token instance.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for patterns that always match the same text.
///
/// The generated handler consumes `$value.len()` bytes and pushes one token of
/// kind `$kind` spanning them.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^=>").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::FatArrow, "=>"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let span = lexer.consume($value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
        }
    };
}

//! Lexical analysis for refront sources.
//!
//! The lexer walks the source with a table of anchored regex patterns. Each
//! pattern owns a handler that pushes zero or more tokens and advances the
//! cursor. Every token carries a [`Span`](crate::Span) whose end is the last
//! character of the token, so diagnostics can point at exact columns.

pub mod lexer;
pub mod tokens;

//! Syntax errors raised while lexing and parsing.
//!
//! Errors here abort the analysis of the source they belong to. Semantic
//! problems are never raised as `Error`; they are collected as
//! [`Diagnostic`](crate::diagnostics::diagnostics::Diagnostic)s instead.

pub mod errors;

#[cfg(test)]
mod tests;

//! Diagnostics reported by the front-end.
//!
//! Syntax errors, module resolution errors and the messages of the
//! type-checking pass all end up as a [`diagnostics::Diagnostic`]. The
//! [`diagnostics::render`] function prints one with the offending source line.

pub mod diagnostics;

#[cfg(test)]
mod tests;

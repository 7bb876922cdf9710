//! Compilation units and their dependency order.
//!
//! Every `module NAME { ... }` block of a source becomes a [`module::Module`].
//! Statements outside any module form the implicit module `main`.
//! [`resolver::resolve_order`] sorts modules so that each one comes after
//! everything it imports.

pub mod error;
pub mod module;
pub mod resolver;

#[cfg(test)]
mod tests;

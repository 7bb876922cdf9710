//! Scoped name resolution.
//!
//! Every scope of a module is a [`symbol_table::SymbolTable`] stored in one
//! [`symbol_table::ScopeTree`] arena. Lookups walk from a scope to its parents
//! and stop at the module root; imported modules are consulted explicitly by
//! the type checker, never by the tree.

pub mod symbol_table;

#[cfg(test)]
mod tests;

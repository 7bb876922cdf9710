//! Type checking and semantic analysis.
//!
//! The pass runs once per module, in two phases:
//!
//! - `scopes` builds the scope tree and registers every declared name, so
//!   siblings can refer to each other regardless of their order
//! - `type_checker` walks every statement and expression and records the
//!   resolved type of each node
//!
//! Declarations met before their own position are resolved on demand
//! (`typedesc::ensure_type_decl`, `functions::ensure_fn_signature`). Errors
//! are recorded as diagnostics and leave the offending subtree undetermined,
//! while the rest of the module is still analyzed.

pub mod arrays;
pub mod expr;
pub mod functions;
pub mod matchexpr;
pub mod scopes;
pub mod type_checker;
pub mod typeclass;
pub mod typedesc;

#[cfg(test)]
mod tests;

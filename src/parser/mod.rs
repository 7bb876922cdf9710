//! Parser module building the arena syntax tree.
//!
//! This module contains the parser that transforms a stream of tokens into
//! an [`Ast`](crate::ast::ast::Ast). It uses a Pratt parser for expressions
//! and a second set of Pratt tables for type descriptions:
//!
//! - Statement parsing (modules, imports, type/class/instance declarations, functions)
//! - Expression parsing (operators, calls, member/index access, if/for/match)
//! - Type description parsing (`a:i32, b:bool | s:string`, arrays, implications)
//!
//! Statements are separated by newlines or optional semicolons.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

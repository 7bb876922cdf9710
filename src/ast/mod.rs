/// AST (Abstract Syntax Tree) module
///
/// The tree is stored in an arena ([`ast::Ast`]) and nodes refer to each other
/// through [`ast::NodeId`] handles.
///
/// Submodules:
/// - ast: The arena, node handles and the closed set of node kinds
/// - expressions: Operators used by expression nodes
/// - types: Helpers over type description nodes
pub mod ast;
pub mod expressions;
pub mod types;

#[cfg(test)]
mod tests;

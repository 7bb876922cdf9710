use super::ast::{Ast, NodeId, NodeKind};

/// Collects every `name:type` leaf of a type description, left to right.
///
/// Leaves nested inside another leaf's type are not collected: in
/// `a:(b:i32, c:u8)` only `a` is a binding.
pub fn collect_leaves(ast: &Ast, description: NodeId) -> Vec<NodeId> {
    let mut leaves = vec![];
    collect_leaves_into(ast, description, &mut leaves);
    leaves
}

fn collect_leaves_into(ast: &Ast, description: NodeId, leaves: &mut Vec<NodeId>) {
    match ast.kind(description) {
        NodeKind::TypeLeaf { .. } => leaves.push(description),
        NodeKind::TypeOperator { left, right, .. } => {
            collect_leaves_into(ast, *left, leaves);
            collect_leaves_into(ast, *right, leaves);
        }
        _ => {}
    }
}

/// The leftmost element of a type description.
pub fn first_element(ast: &Ast, description: NodeId) -> NodeId {
    match ast.kind(description) {
        NodeKind::TypeOperator { left, .. } => first_element(ast, *left),
        _ => description,
    }
}

/// Name of a leaf node.
pub fn leaf_name(ast: &Ast, leaf: NodeId) -> Option<&str> {
    match ast.kind(leaf) {
        NodeKind::TypeLeaf { name, .. } => Some(name),
        _ => None,
    }
}

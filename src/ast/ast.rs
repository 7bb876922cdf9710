use std::fmt::Display;

use crate::{types::types::TypeOperator, Span};

use super::expressions::{BinaryOperator, UnaryOperator};

/// Handle of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `<Type T>` in a typeclass declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root {
        children: Vec<NodeId>,
    },
    Module {
        name: String,
        body: Vec<NodeId>,
    },
    Import {
        module: String,
    },
    Block {
        statements: Vec<NodeId>,
    },

    // Type descriptions
    TypeDecl {
        name: String,
        description: NodeId,
    },
    TypeOperator {
        op: TypeOperator,
        left: NodeId,
        right: NodeId,
    },
    TypeLeaf {
        name: String,
        ty: NodeId,
    },
    TypeName {
        name: String,
    },
    TypeWildcard,
    TypeArray {
        member: NodeId,
        dimensions: Vec<Option<u64>>,
    },
    Typeclass {
        name: String,
        generics: Vec<GenericParam>,
        methods: Vec<NodeId>,
    },
    TypeInstance {
        class: String,
        type_name: String,
        alias: Option<String>,
        is_default: bool,
        methods: Vec<NodeId>,
    },

    // Declarations and statements
    FnDecl {
        name: String,
        args: Option<NodeId>,
        ret: Option<NodeId>,
        body: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    VarDecl {
        name: String,
        ty: NodeId,
    },

    // Expressions
    Identifier {
        name: String,
    },
    Integer {
        value: u64,
    },
    Float {
        value: f64,
    },
    String {
        value: String,
    },
    Bool {
        value: bool,
    },
    Binary {
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOperator,
        operand: NodeId,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Member {
        object: NodeId,
        member: NodeId,
    },
    Index {
        object: NodeId,
        index: NodeId,
    },
    BracketList {
        members: Vec<NodeId>,
    },
    If {
        branches: Vec<IfBranch>,
        otherwise: Option<NodeId>,
    },
    For {
        variable: NodeId,
        iterable: NodeId,
        body: NodeId,
    },
    Match {
        subject: Option<NodeId>,
        cases: Vec<NodeId>,
    },
    MatchCase {
        pattern: NodeId,
        body: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena holding every node parsed from one source.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.nodes.push(Node { kind, span });
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> &Span {
        &self.nodes[id.index()].span
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name of an identifier node, if `id` is one.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Root { children } => children.clone(),
            NodeKind::Module { body, .. } => body.clone(),
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::TypeDecl { description, .. } => vec![*description],
            NodeKind::TypeOperator { left, right, .. } => vec![*left, *right],
            NodeKind::TypeLeaf { ty, .. } => vec![*ty],
            NodeKind::TypeArray { member, .. } => vec![*member],
            NodeKind::Typeclass { methods, .. } | NodeKind::TypeInstance { methods, .. } => {
                methods.clone()
            }
            NodeKind::FnDecl {
                args, ret, body, ..
            } => args.iter().chain(ret.iter()).chain(body.iter()).copied().collect(),
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::VarDecl { ty, .. } => vec![*ty],
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Assignment { target, value } => vec![*target, *value],
            NodeKind::Call { callee, args } => {
                std::iter::once(*callee).chain(args.iter().copied()).collect()
            }
            NodeKind::Member { object, member } => vec![*object, *member],
            NodeKind::Index { object, index } => vec![*object, *index],
            NodeKind::BracketList { members } => members.clone(),
            NodeKind::If { branches, otherwise } => branches
                .iter()
                .flat_map(|branch| [branch.condition, branch.body])
                .chain(otherwise.iter().copied())
                .collect(),
            NodeKind::For {
                variable,
                iterable,
                body,
            } => vec![*variable, *iterable, *body],
            NodeKind::Match { subject, cases } => {
                subject.iter().chain(cases.iter()).copied().collect()
            }
            NodeKind::MatchCase { pattern, body } => vec![*pattern, *body],
            NodeKind::Import { .. }
            | NodeKind::TypeName { .. }
            | NodeKind::TypeWildcard
            | NodeKind::Identifier { .. }
            | NodeKind::Integer { .. }
            | NodeKind::Float { .. }
            | NodeKind::String { .. }
            | NodeKind::Bool { .. } => vec![],
        }
    }
}
